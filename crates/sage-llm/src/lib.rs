//! Chat-completion layer for StockSage
//!
//! This crate provides provider-agnostic abstractions for talking to a
//! function-calling language model. It includes:
//!
//! - Message types for the conversation (user, assistant, function result)
//! - Completion request/response types
//! - Function specifications (the catalog the model chooses from)
//! - Provider trait for LLM implementations
//! - The OpenAI chat-completions provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod functions;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, FunctionCallMode, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use functions::FunctionSpec;
pub use messages::{FunctionCall, Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
