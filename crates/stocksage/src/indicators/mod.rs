//! Indicator library
//!
//! Each operation fetches a fresh [`PriceSeries`] for the ticker and evaluates
//! one formula at the most recent point. Nothing is cached between calls.

pub mod formulas;

use crate::api::{HistoryRange, PriceSource};
use crate::catalog::IndicatorCall;
use crate::chart::{self, ChartConfig};
use crate::config::SageConfig;
use crate::error::Result;
use crate::series::PriceSeries;
use formulas::{MacdValue, RSI_PERIOD};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Render a number the way results are handed back to the agent
///
/// Shortest round-trip form, always with a fractional part (`"100.0"`),
/// `"NaN"` and `"inf"` for non-finite values.
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// Outcome of invoking an indicator
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// String result to narrate
    Text(String),
    /// Chart written to this path
    Chart(PathBuf),
}

impl Invocation {
    /// Content of the function-result message
    pub fn content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Chart(path) => path.display().to_string(),
        }
    }
}

/// Technical indicators over a price source
pub struct Indicators {
    source: Arc<dyn PriceSource>,
    range: HistoryRange,
    chart_path: PathBuf,
    chart: ChartConfig,
}

impl Indicators {
    /// Create an indicator library reading `config`'s range and chart path
    pub fn new(source: Arc<dyn PriceSource>, config: &SageConfig) -> Self {
        Self {
            source,
            range: config.range,
            chart_path: config.chart_path.clone(),
            chart: ChartConfig::default(),
        }
    }

    async fn history(&self, ticker: &str) -> Result<PriceSeries> {
        let symbol = ticker.trim().to_uppercase();
        let series = self.source.daily_history(&symbol, self.range).await?;
        debug!(symbol, points = series.len(), range = %self.range, "Loaded price history");
        Ok(series)
    }

    /// Most recent close
    pub async fn price(&self, ticker: &str) -> Result<f64> {
        Ok(self.history(ticker).await?.latest().close)
    }

    /// Simple moving average over the trailing `window` closes
    pub async fn sma(&self, ticker: &str, window: usize) -> Result<f64> {
        let series = self.history(ticker).await?;
        Ok(formulas::sma(&series.closes(), window))
    }

    /// Exponential moving average with span `window`
    pub async fn ema(&self, ticker: &str, window: usize) -> Result<f64> {
        let series = self.history(ticker).await?;
        Ok(formulas::ema(&series.closes(), window))
    }

    /// 14-period RSI
    pub async fn rsi(&self, ticker: &str) -> Result<f64> {
        let series = self.history(ticker).await?;
        Ok(formulas::rsi(&series.closes(), RSI_PERIOD).rsi)
    }

    /// MACD(12, 26, 9)
    pub async fn macd(&self, ticker: &str) -> Result<MacdValue> {
        let series = self.history(ticker).await?;
        Ok(formulas::macd(&series.closes()))
    }

    /// Plot the closing prices and return the chart's path
    pub async fn plot(&self, ticker: &str) -> Result<PathBuf> {
        let series = self.history(ticker).await?;
        chart::save(&series, &self.chart_path, &self.chart)
    }

    /// Run a decoded function call
    pub async fn invoke(&self, call: &IndicatorCall) -> Result<Invocation> {
        info!(function = %call.kind(), ticker = call.ticker(), "Invoking indicator");

        let invocation = match call {
            IndicatorCall::Price { ticker } => Invocation::Text(format_value(self.price(ticker).await?)),
            IndicatorCall::Sma { ticker, window } => {
                Invocation::Text(format_value(self.sma(ticker, *window).await?))
            }
            IndicatorCall::Ema { ticker, window } => {
                Invocation::Text(format_value(self.ema(ticker, *window).await?))
            }
            IndicatorCall::Rsi { ticker } => Invocation::Text(format_value(self.rsi(ticker).await?)),
            IndicatorCall::Macd { ticker } => Invocation::Text(self.macd(ticker).await?.to_string()),
            IndicatorCall::Plot { ticker } => Invocation::Chart(self.plot(ticker).await?),
        };

        debug!(function = %call.kind(), result = %invocation.content(), "Indicator finished");
        Ok(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPriceSource;
    use crate::error::SageError;
    use crate::series::fixtures;

    fn indicators(source: MockPriceSource) -> Indicators {
        Indicators::new(Arc::new(source), &SageConfig::default())
    }

    fn serving(closes: &'static [f64]) -> MockPriceSource {
        let mut source = MockPriceSource::new();
        source
            .expect_daily_history()
            .returning(move |symbol, _| Ok(fixtures::series(symbol, closes)));
        source
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(189.84), "189.84");
        assert_eq!(format_value(100.0), "100.0");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[tokio::test]
    async fn test_price_uses_latest_close() {
        let mut source = MockPriceSource::new();
        source
            .expect_daily_history()
            .withf(|symbol, range| symbol == "AAPL" && *range == HistoryRange::OneYear)
            .times(1)
            .returning(|symbol, _| Ok(fixtures::series(symbol, &[101.0, 99.5, 102.25])));

        let price = indicators(source).price(" aapl ").await.unwrap();
        assert_eq!(price, 102.25);
    }

    #[tokio::test]
    async fn test_each_call_fetches_fresh_data() {
        let mut source = MockPriceSource::new();
        source
            .expect_daily_history()
            .times(3)
            .returning(|symbol, _| Ok(fixtures::series(symbol, &[10.0, 20.0, 30.0])));
        let lib = indicators(source);

        assert_eq!(lib.sma("MSFT", 2).await.unwrap(), 25.0);
        assert!(lib.sma("MSFT", 4).await.unwrap().is_nan());
        assert_eq!(lib.ema("MSFT", 3).await.unwrap(), 22.5);
    }

    #[tokio::test]
    async fn test_invoke_renders_strings() {
        let lib = indicators(serving(&[1.0, 2.0, 3.0, 4.0, 5.0]));

        let rsi = lib
            .invoke(&IndicatorCall::Rsi {
                ticker: "NVDA".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(rsi, Invocation::Text("100.0".to_string()));

        let macd = lib
            .invoke(&IndicatorCall::Macd {
                ticker: "NVDA".to_string(),
            })
            .await
            .unwrap();
        let Invocation::Text(text) = &macd else {
            panic!("expected text, got {macd:?}");
        };
        assert_eq!(text.split(", ").count(), 3);
    }

    #[tokio::test]
    async fn test_plot_writes_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.png");
        let config = SageConfig::builder().chart_path(&path).build().unwrap();
        let lib = Indicators::new(Arc::new(serving(&[3.0, 1.0, 2.0])), &config);

        let result = lib
            .invoke(&IndicatorCall::Plot {
                ticker: "TSLA".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result, Invocation::Chart(path.clone()));
        assert_eq!(result.content(), path.display().to_string());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut source = MockPriceSource::new();
        source.expect_daily_history().returning(|symbol, _| {
            Err(SageError::DataSource {
                symbol: symbol.to_string(),
                reason: "No data found, symbol may be delisted".to_string(),
            })
        });

        let err = indicators(source).rsi("ZZZZ").await.unwrap_err();
        assert!(matches!(err, SageError::DataSource { ref symbol, .. } if symbol == "ZZZZ"));
    }
}
