//! Configuration for the assistant

use crate::api::HistoryRange;
use crate::error::{Result, SageError};
use sage_utils::{env_or, env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default chat model; the first release with function calling
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";

/// Default chart location, relative to the working directory
pub const DEFAULT_CHART_PATH: &str = "stock.png";

/// Configuration for a StockSage session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageConfig {
    /// Model identifier sent with every agent call
    pub model: String,

    /// History window fetched for each indicator call
    pub range: HistoryRange,

    /// Where `plotStockPrice` writes its PNG
    pub chart_path: PathBuf,

    /// Maximum tokens per agent call
    pub max_tokens: usize,

    /// Sampling temperature (0.0-2.0)
    pub temperature: Option<f32>,

    /// Optional system prompt sent with both agent calls
    pub system_prompt: Option<String>,
}

impl Default for SageConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            range: HistoryRange::OneYear,
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            max_tokens: 1024,
            temperature: None,
            system_prompt: None,
        }
    }
}

impl SageConfig {
    /// Create a new configuration builder
    pub fn builder() -> SageConfigBuilder {
        SageConfigBuilder::default()
    }

    /// Builder preloaded from environment variables
    ///
    /// Reads `OPENAI_MODEL`, `STOCKSAGE_RANGE`, `STOCKSAGE_CHART_PATH`,
    /// `STOCKSAGE_MAX_TOKENS`, `STOCKSAGE_TEMPERATURE` and
    /// `STOCKSAGE_SYSTEM_PROMPT`. Unset variables keep their defaults. Nothing
    /// is validated until [`SageConfigBuilder::build`], so later setters can
    /// replace a bad value.
    pub fn env_builder() -> Result<SageConfigBuilder> {
        let mut builder = Self::builder()
            .model(env_or("OPENAI_MODEL", DEFAULT_MODEL))
            .chart_path(env_or("STOCKSAGE_CHART_PATH", DEFAULT_CHART_PATH));

        if let Some(range) = env_var("STOCKSAGE_RANGE") {
            builder = builder.range(range.parse()?);
        }
        if let Some(max_tokens) = env_parse::<usize>("STOCKSAGE_MAX_TOKENS")? {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = env_parse::<f32>("STOCKSAGE_TEMPERATURE")? {
            builder = builder.temperature(temperature);
        }
        if let Some(prompt) = env_var("STOCKSAGE_SYSTEM_PROMPT") {
            builder = builder.system_prompt(prompt);
        }

        Ok(builder)
    }

    /// Load and validate configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::env_builder()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(SageError::Config("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(SageError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(temperature) = self
            .temperature
            .filter(|t| !(0.0..=2.0).contains(t))
        {
            return Err(SageError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }

        if !has_png_extension(&self.chart_path) {
            return Err(SageError::Config(format!(
                "chart path must end in .png: {}",
                self.chart_path.display()
            )));
        }

        Ok(())
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Builder for SageConfig
#[derive(Debug, Default)]
pub struct SageConfigBuilder {
    model: Option<String>,
    range: Option<HistoryRange>,
    chart_path: Option<PathBuf>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
}

impl SageConfigBuilder {
    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the history range
    pub fn range(mut self, range: HistoryRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the chart output path
    pub fn chart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(path.into());
        self
    }

    /// Set the per-call token limit
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SageConfig> {
        let defaults = SageConfig::default();

        let config = SageConfig {
            model: self.model.unwrap_or(defaults.model),
            range: self.range.unwrap_or(defaults.range),
            chart_path: self.chart_path.unwrap_or(defaults.chart_path),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            system_prompt: self.system_prompt.or(defaults.system_prompt),
        };

        config.validate()?;
        Ok(config)
    }
}
