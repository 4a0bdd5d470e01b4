//! Shared utilities for StockSage
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and typed access to environment-variable configuration.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_or, env_parse, env_var};
pub use logging::{env_filter, init_tracing};
