//! LLM provider trait definition

use async_trait::async_trait;
use crate::{CompletionRequest, CompletionResponse, Result};

/// Trait for LLM providers
///
/// Implementations turn a conversation plus an optional function catalog
/// into either a text reply or a structured function-call request.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages, functions, and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
