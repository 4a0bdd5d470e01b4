//! Yahoo Finance API client

use crate::api::{HistoryRange, PriceSource};
use crate::error::{Result, SageError};
use crate::series::{PricePoint, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get daily closes for a symbol between two instants
    ///
    /// Uses the adjusted close, which accounts for splits and dividends.
    pub async fn get_historical_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let source_error = |reason: String| SageError::DataSource {
            symbol: symbol.to_string(),
            reason,
        };

        let provider = yahoo::YahooConnector::new().map_err(|e| source_error(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| source_error(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| source_error(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| source_error(e.to_string()))?;

        let quotes = response.quotes().map_err(|e| source_error(e.to_string()))?;
        debug!(symbol, quotes = quotes.len(), "Fetched quote history");

        let points = quotes
            .iter()
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0).map(|date| PricePoint {
                    date,
                    close: q.adjclose,
                })
            })
            .collect();

        PriceSeries::new(symbol, points)
    }
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    async fn daily_history(&self, symbol: &str, range: HistoryRange) -> Result<PriceSeries> {
        let end = Utc::now();
        self.get_historical_closes(symbol, range.start_from(end), end)
            .await
    }
}
