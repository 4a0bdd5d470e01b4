//! Daily closing-price series

use crate::error::{Result, SageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub close: f64,
}

/// Ordered daily closes for one ticker
///
/// Never empty: construction fails when the source returned no points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting points by date
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(SageError::DataUnavailable {
                symbol,
                reason: "No historical data available".to_string(),
            });
        }
        points.sort_by_key(|p| p.date);
        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Most recent point
    pub fn latest(&self) -> PricePoint {
        // non-empty by construction
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Series with one point per day starting 2024-01-02
    pub fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new(symbol, points).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_rejected() {
        let err = PriceSeries::new("ZZZZ", Vec::new()).unwrap_err();
        assert!(matches!(err, SageError::DataUnavailable { ref symbol, .. } if symbol == "ZZZZ"));
    }

    #[test]
    fn test_points_sorted_and_latest() {
        let a = fixtures::series("AAPL", &[1.0, 2.0, 3.0]);
        let mut shuffled = a.points().to_vec();
        shuffled.reverse();

        let series = PriceSeries::new("AAPL", shuffled).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.latest().close, 3.0);
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert_eq!(series.symbol(), "AAPL");
    }
}
