//! Message types for LLM communication
//!
//! A conversation is an ordered list of [`Message`] values. The enum is tagged
//! on `role`, mirroring the chat-completions wire format: user and assistant
//! messages carry free text, an assistant message may instead carry a
//! [`FunctionCall`], and a function message carries the name and string result
//! of a function the application invoked.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Function result supplied by the application
    Function,
}

/// A structured request from the model to call one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the requested function
    pub name: String,

    /// JSON-encoded argument object, exactly as produced by the model
    pub arguments: String,
}

impl FunctionCall {
    /// Create a function call from a name and a JSON-encoded argument string
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument string into a JSON value
    pub fn arguments_value(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.arguments)
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System instructions
    System {
        /// Text content
        content: String,
    },

    /// User input
    User {
        /// Text content
        content: String,
    },

    /// Assistant reply: free text, a function-call request, or both
    Assistant {
        /// Text content (absent for pure function-call requests)
        #[serde(default)]
        content: Option<String>,
        /// Requested function call
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function_call: Option<FunctionCall>,
    },

    /// Result of a function the application invoked
    Function {
        /// Name of the invoked function
        name: String,
        /// String-encoded return value
        content: String,
    },
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: text.into(),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(text.into()),
            function_call: None,
        }
    }

    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self::System {
            content: text.into(),
        }
    }

    /// Create an assistant message requesting a function call
    pub fn function_request(call: FunctionCall) -> Self {
        Self::Assistant {
            content: None,
            function_call: Some(call),
        }
    }

    /// Create a function-result message
    pub fn function_result(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self::Function {
            name: name.into(),
            content: result.into(),
        }
    }

    /// Role of this message
    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Function { .. } => Role::Function,
        }
    }

    /// Extract text content from the message (convenience method)
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } | Self::Function { content, .. } => {
                Some(content)
            }
            Self::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// Function call requested by an assistant message, if any
    pub fn function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::Assistant { function_call, .. } => function_call.as_ref(),
            _ => None,
        }
    }

    /// Check if this message requests a function call
    pub fn has_function_call(&self) -> bool {
        self.function_call().is_some()
    }
}
