//! Error types for StockSage operations

use sage_llm::LLMError;
use thiserror::Error;

/// Errors raised while handling a conversation turn
#[derive(Debug, Error)]
pub enum SageError {
    /// Market-data source failed (unknown ticker, network error)
    #[error("Market data error for {symbol}: {reason}")]
    DataSource {
        symbol: String,
        reason: String,
    },

    /// The source answered but returned no price points
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// The model asked for a function that is not in the catalog
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The model's arguments do not match the function's schema
    #[error("Invalid arguments for {function}: {reason}")]
    InvalidArguments {
        function: String,
        reason: String,
    },

    /// Language-model call failed
    #[error("Agent error: {0}")]
    Agent(#[from] LLMError),

    /// The model returned neither text nor a function call
    #[error("Empty reply from agent")]
    EmptyReply,

    /// Chart encoding failed
    #[error("Chart error: {0}")]
    Chart(#[from] image::ImageError),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SageError {
    pub(crate) fn invalid_arguments(function: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<sage_utils::EnvError> for SageError {
    fn from(err: sage_utils::EnvError) -> Self {
        SageError::Config(err.to_string())
    }
}

/// Result type alias for StockSage operations
pub type Result<T> = std::result::Result<T, SageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SageError::UnknownFunction("deleteEverything".to_string());
        assert_eq!(err.to_string(), "Unknown function: deleteEverything");

        let err = SageError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "No data found".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");

        let err = SageError::invalid_arguments("calculateSMA", "missing field `window`");
        assert_eq!(
            err.to_string(),
            "Invalid arguments for calculateSMA: missing field `window`"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: SageError = LLMError::AuthenticationFailed.into();
        assert!(matches!(err, SageError::Agent(LLMError::AuthenticationFailed)));
        assert!(err.to_string().starts_with("Agent error"));
    }
}
