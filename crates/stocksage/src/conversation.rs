//! Conversation history for one session
//!
//! The history is append-only: messages are pushed in order and never edited
//! or removed. The session loop owns it and lends it to each turn.

use crate::catalog::IndicatorKind;
use sage_llm::{FunctionCall, Message, Role};

/// Ordered messages exchanged with the agent
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Record the agent's function-call request as it was received
    pub fn push_function_request(&mut self, call: FunctionCall) {
        self.messages.push(Message::function_request(call));
    }

    /// Record a function's result; the name always comes from the catalog
    pub fn push_function_result(&mut self, kind: IndicatorKind, content: impl Into<String>) {
        self.messages.push(Message::function_result(kind.name(), content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// One line per message, for display
    pub fn transcript(&self) -> Vec<String> {
        self.messages.iter().map(describe).collect()
    }
}

fn describe(message: &Message) -> String {
    match message {
        Message::Assistant {
            function_call: Some(call),
            ..
        } => format!("assistant -> {}({})", call.name, call.arguments),
        Message::Function { name, content } => format!("function {name}: {content}"),
        _ => format!(
            "{}: {}",
            role_label(message.role()),
            message.text().unwrap_or_default()
        ),
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Function => "function",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.push_user("What is the price of AAPL?");
        conversation.push_function_request(FunctionCall::new("getStockPrice", r#"{"ticker":"AAPL"}"#));
        conversation.push_function_result(IndicatorKind::Price, "189.84");
        conversation.push_assistant("Apple is trading at $189.84.");

        let roles: Vec<Role> = conversation.messages().iter().map(Message::role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::Function, Role::Assistant]
        );
        assert_eq!(conversation.len(), 4);
        assert_eq!(
            conversation.messages()[2],
            Message::function_result("getStockPrice", "189.84")
        );
        assert_eq!(conversation.last().and_then(Message::text), Some("Apple is trading at $189.84."));
    }

    #[test]
    fn test_transcript() {
        let mut conversation = Conversation::new();
        conversation.push_user("RSI for MSFT?");
        conversation.push_function_request(FunctionCall::new("calculateRSI", r#"{"ticker":"MSFT"}"#));
        conversation.push_function_result(IndicatorKind::Rsi, "61.2");

        assert_eq!(
            conversation.transcript(),
            vec![
                "user: RSI for MSFT?".to_string(),
                r#"assistant -> calculateRSI({"ticker":"MSFT"})"#.to_string(),
                "function calculateRSI: 61.2".to_string(),
            ]
        );
    }
}
