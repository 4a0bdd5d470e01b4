//! Market-data sources

pub mod yahoo;

use crate::error::{Result, SageError};
use crate::series::PriceSeries;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use yahoo::YahooFinanceClient;

/// How far back a daily history reaches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    YearToDate,
}

impl HistoryRange {
    /// Start of the window ending at `end`
    pub fn start_from(self, end: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::OneMonth => end - chrono::Duration::days(30),
            Self::ThreeMonths => end - chrono::Duration::days(90),
            Self::SixMonths => end - chrono::Duration::days(180),
            Self::OneYear => end - chrono::Duration::days(365),
            Self::TwoYears => end - chrono::Duration::days(730),
            Self::FiveYears => end - chrono::Duration::days(1825),
            Self::YearToDate => chrono::NaiveDate::from_ymd_opt(end.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map_or(end, |d| d.and_utc()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::YearToDate => "ytd",
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = SageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            "5y" => Ok(Self::FiveYears),
            "ytd" => Ok(Self::YearToDate),
            other => Err(SageError::Config(format!(
                "Invalid range: {other}. Supported: 1mo, 3mo, 6mo, 1y, 2y, 5y, ytd"
            ))),
        }
    }
}

/// Source of daily closing prices
///
/// Every call fetches fresh data; implementations must not cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the daily closes of `symbol` over `range`, ending now
    async fn daily_history(&self, symbol: &str, range: HistoryRange) -> Result<PriceSeries>;
}
