//! Environment-variable configuration helpers

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable holds an unusable value
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct EnvError {
    /// Variable name
    pub key: String,
    /// Raw value found in the environment
    pub value: String,
    /// Parser message
    pub reason: String,
}

/// Read a variable, treating unset and blank values the same way
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a variable or fall back to `default`
pub fn env_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}

/// Read and parse a variable; `Ok(None)` when it is unset
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    env_var(key)
        .map(|value| {
            value.parse::<T>().map_err(|e| EnvError {
                key: key.to_string(),
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
