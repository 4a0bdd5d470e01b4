//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter from `RUST_LOG`, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the global tracing subscriber
///
/// Output goes to stderr so it never interleaves with REPL answers on stdout.
pub fn init_tracing(default_directive: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_is_used() {
        // RUST_LOG is normally unset under `cargo test`
        if std::env::var("RUST_LOG").is_err() {
            let filter = env_filter("warn,stocksage=debug");
            assert_eq!(
                filter.max_level_hint(),
                Some(tracing::level_filters::LevelFilter::DEBUG)
            );
        }
    }
}
