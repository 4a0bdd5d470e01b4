//! StockSage: a conversational stock-analysis assistant
//!
//! User questions go to a function-calling language model together with a
//! small catalog of technical indicators. When the model asks for one, the
//! indicator is computed locally over fresh Yahoo Finance data and the result
//! is handed back to the model to narrate. It includes:
//!
//! - A price source trait with a Yahoo Finance implementation
//! - Indicator formulas: latest price, SMA, EMA, RSI (Wilder), MACD(12, 26, 9)
//! - A PNG line chart of the closing prices
//! - The function catalog and typed decoding of function calls
//! - The turn dispatcher and the append-only conversation it extends
//!
//! # Example
//!
//! ```rust,ignore
//! use sage_llm::providers::OpenAIProvider;
//! use stocksage::{Conversation, Dispatcher, Indicators, SageConfig, YahooFinanceClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SageConfig::from_env()?;
//!     let provider = Arc::new(OpenAIProvider::from_env()?);
//!     let indicators = Indicators::new(Arc::new(YahooFinanceClient::new()), &config);
//!     let sage = Dispatcher::new(provider, indicators, config);
//!
//!     let mut conversation = Conversation::new();
//!     let rendered = sage.handle_turn(&mut conversation, "What is AAPL's RSI?").await;
//!     println!("{rendered:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod indicators;
pub mod series;

// Re-export main types for convenience
pub use api::{HistoryRange, PriceSource, YahooFinanceClient};
pub use catalog::{IndicatorCall, IndicatorKind, catalog};
pub use config::SageConfig;
pub use conversation::Conversation;
pub use dispatch::{Dispatcher, Rendered};
pub use error::{Result, SageError};
pub use indicators::{Indicators, Invocation};
pub use series::{PricePoint, PriceSeries};
