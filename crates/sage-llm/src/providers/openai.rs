//! OpenAI provider implementation
//!
//! This module implements the LLMProvider trait against the OpenAI
//! chat-completions endpoint using its function-calling wire format
//! (`functions` / `function_call` on the request, `message.function_call` on
//! the response, `role: "function"` for results).
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Example
//!
//! ```no_run
//! use sage_llm::{CompletionRequest, Message, LLMProvider};
//! use sage_llm::providers::OpenAIProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create provider from OPENAI_API_KEY environment variable
//!     let provider = OpenAIProvider::from_env()?;
//!
//!     let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Using with OpenAI-compatible APIs
//!
//! ```no_run
//! use sage_llm::providers::{OpenAIProvider, OpenAIConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // For local deployments that speak the same protocol
//! let local_config = OpenAIConfig::new("not-needed")
//!     .with_api_base("http://localhost:8000/v1");
//!
//! let provider = OpenAIProvider::with_config(local_config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, FunctionCall, FunctionCallMode, FunctionSpec,
    LLMError, LLMProvider, Message, Result, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    /// Can be customized for OpenAI-compatible APIs.
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Optional list of supported models
    /// If None, any model string is accepted
    pub supported_models: Option<Vec<String>>,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variable
    ///
    /// Reads the API key from `OPENAI_API_KEY` environment variable.
    /// Optionally reads base URL from `OPENAI_API_BASE` if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            ..Self::default()
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set supported models list
    ///
    /// When set, the provider will validate model names against this list.
    /// When None (default), any model string is accepted.
    pub fn with_supported_models(mut self, models: Vec<String>) -> Self {
        self.supported_models = Some(models);
        self
    }

    /// Add a single supported model
    pub fn add_supported_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        match &mut self.supported_models {
            Some(models) => models.push(model),
            None => self.supported_models = Some(vec![model]),
        }
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            supported_models: None,
        }
    }
}

/// OpenAI provider
///
/// Works with any model that supports function calling through the
/// chat-completions endpoint, and with OpenAI-compatible servers.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new OpenAI provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig::from_env()?;
        Self::with_config(config)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Validate model name against supported models list (if configured)
    fn validate_model(&self, model: &str) -> Result<()> {
        if let Some(supported) = &self.config.supported_models {
            if !supported.iter().any(|m| m == model) {
                return Err(LLMError::InvalidRequest(format!(
                    "Model '{model}' is not in the supported models list: {supported:?}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to OpenAI API at {}", self.config.api_base);

        self.validate_model(&request.model)?;

        let openai_request = build_openai_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(openai_request.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        parse_openai_response(openai_response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<FunctionSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCallMode>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    // Serialized as null for function-call requests
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<OpenAIFunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<OpenAIFunctionCall>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build the wire request; the system prompt goes first in the messages array
fn build_openai_request(request: CompletionRequest) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = request.system {
        messages.push(convert_message(Message::system(system)));
    }
    messages.extend(request.messages.into_iter().map(convert_message));

    OpenAIRequest {
        model: request.model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        functions: request.functions,
        function_call: request.function_call,
    }
}

/// Convert a single message to OpenAI format
fn convert_message(msg: Message) -> OpenAIMessage {
    match msg {
        Message::System { content } => OpenAIMessage {
            role: "system",
            content: Some(content),
            name: None,
            function_call: None,
        },
        Message::User { content } => OpenAIMessage {
            role: "user",
            content: Some(content),
            name: None,
            function_call: None,
        },
        Message::Assistant {
            content,
            function_call,
        } => OpenAIMessage {
            role: "assistant",
            content,
            name: None,
            function_call: function_call.map(|call| OpenAIFunctionCall {
                name: call.name,
                arguments: call.arguments,
            }),
        },
        Message::Function { name, content } => OpenAIMessage {
            role: "function",
            content: Some(content),
            name: Some(name),
            function_call: None,
        },
    }
}

/// Parse the OpenAI response into our format
fn parse_openai_response(response: OpenAIResponse) -> Result<CompletionResponse> {
    // OpenAI can return multiple choices but we use the first
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    // Some compatible servers send `"usage": null`
    let usage = response.usage.unwrap_or_default();
    let finish_reason = choice.finish_reason.unwrap_or_default();
    debug!(
        "Received response - finish_reason: {}, tokens: {}/{}",
        finish_reason, usage.prompt_tokens, usage.completion_tokens
    );

    let function_call = choice
        .message
        .function_call
        .map(|call| FunctionCall::new(call.name, call.arguments));
    let content = choice.message.content.filter(|text| !text.is_empty());

    let stop_reason = if function_call.is_some() {
        StopReason::FunctionCall
    } else {
        map_stop_reason(&finish_reason)
    };

    Ok(CompletionResponse {
        message: Message::Assistant {
            content,
            function_call,
        },
        stop_reason,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

/// Map OpenAI stop reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "function_call" | "tool_calls" => StopReason::FunctionCall,
        "content_filter" => {
            debug!("Content filtered by OpenAI safety systems");
            StopReason::EndTurn
        }
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::schema;
    use serde_json::json;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key");
        assert!(provider.is_ok());
        let provider = provider.unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_key, "test-key");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_provider_with_custom_config() {
        let config = OpenAIConfig::new("test-key")
            .with_api_base("https://custom.api.com/v1")
            .with_timeout(60)
            .with_supported_models(vec!["gpt-4".to_string(), "gpt-3.5-turbo-0613".to_string()]);

        let provider = OpenAIProvider::with_config(config).unwrap();
        assert_eq!(provider.config().api_base, "https://custom.api.com/v1");
        assert_eq!(provider.config().timeout_secs, 60);
        assert_eq!(
            provider.config().supported_models,
            Some(vec!["gpt-4".to_string(), "gpt-3.5-turbo-0613".to_string()])
        );
    }

    #[test]
    fn test_model_validation() {
        let config = OpenAIConfig::new("test-key")
            .add_supported_model("gpt-4")
            .add_supported_model("gpt-3.5-turbo-0613");

        let provider = OpenAIProvider::with_config(config).unwrap();

        assert!(provider.validate_model("gpt-4").is_ok());
        assert!(provider.validate_model("gpt-3.5-turbo-0613").is_ok());

        let result = provider.validate_model("invalid-model");
        assert!(matches!(result, Err(LLMError::InvalidRequest(_))));
    }

    #[test]
    fn test_no_model_validation_when_not_configured() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert!(provider.validate_model("any-model").is_ok());
    }

    #[test]
    fn test_system_prompt_goes_first() {
        let request = CompletionRequest::builder("m")
            .system("You are helpful")
            .add_message(Message::user("Hello"))
            .build();

        let wire = build_openai_request(request);
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content.as_deref(), Some("You are helpful"));
        assert_eq!(wire.messages[1].role, "user");
    }

    #[test]
    fn test_request_wire_shape() {
        let spec = FunctionSpec::new(
            "calculateRSI",
            "Calculate the RSI for a given stock ticker.",
            schema::object(json!({"ticker": {"type": "string"}}), vec!["ticker"]),
        );
        let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
            .messages(vec![
                Message::user("RSI of AAPL?"),
                Message::function_request(FunctionCall::new("calculateRSI", r#"{"ticker":"AAPL"}"#)),
                Message::function_result("calculateRSI", "61.5"),
            ])
            .functions(vec![spec])
            .max_tokens(256)
            .build();

        let value = serde_json::to_value(build_openai_request(request)).unwrap();

        assert_eq!(value["function_call"], "auto");
        assert_eq!(value["functions"][0]["name"], "calculateRSI");
        assert_eq!(value["functions"][0]["parameters"]["required"], json!(["ticker"]));
        assert!(value.get("temperature").is_none());
        assert_eq!(
            value["messages"][1],
            json!({
                "role": "assistant",
                "content": null,
                "function_call": {"name": "calculateRSI", "arguments": "{\"ticker\":\"AAPL\"}"}
            })
        );
        assert_eq!(
            value["messages"][2],
            json!({"role": "function", "content": "61.5", "name": "calculateRSI"})
        );
    }

    #[test]
    fn test_narration_request_has_no_functions() {
        let request = CompletionRequest::builder("m")
            .add_message(Message::user("hi"))
            .build();
        let value = serde_json::to_value(build_openai_request(request)).unwrap();
        assert!(value.get("functions").is_none());
        assert!(value.get("function_call").is_none());
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason("stop"), StopReason::EndTurn);
        assert_eq!(map_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(map_stop_reason("function_call"), StopReason::FunctionCall);
        assert_eq!(map_stop_reason("content_filter"), StopReason::EndTurn);
        assert_eq!(map_stop_reason("unknown"), StopReason::EndTurn);
    }

    #[test]
    fn test_response_with_function_call() {
        let response: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": {"name": "getStockPrice", "arguments": "{\"ticker\": \"AAPL\"}"}
                },
                "finish_reason": "function_call"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18}
        }))
        .unwrap();

        let completion = parse_openai_response(response).unwrap();
        assert_eq!(completion.stop_reason, StopReason::FunctionCall);
        assert_eq!(completion.usage.total(), 138);
        let call = completion.message.function_call().unwrap();
        assert_eq!(call.name, "getStockPrice");
        assert_eq!(call.arguments_value().unwrap()["ticker"], "AAPL");
        assert_eq!(completion.message.text(), None);
    }

    #[test]
    fn test_response_with_text() {
        let response: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello! How can I help?"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let completion = parse_openai_response(response).unwrap();
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.message.text(), Some("Hello! How can I help?"));
        assert!(!completion.message.has_function_call());
        assert_eq!(completion.usage.total(), 0);
    }

    #[test]
    fn test_response_with_null_usage() {
        let response: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hi"},
                "finish_reason": "stop"
            }],
            "usage": null
        }))
        .unwrap();

        let completion = parse_openai_response(response).unwrap();
        assert_eq!(completion.message.text(), Some("Hi"));
        assert_eq!(completion.usage.total(), 0);
    }

    #[test]
    fn test_response_without_choices() {
        let response: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_openai_response(response),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }
}
