//! Turn dispatcher
//!
//! One user input drives exactly one pass through:
//!
//! 1. append the user message and call the agent with the function catalog
//! 2. a text reply is appended and rendered as-is
//! 3. a function-call request is appended, decoded and invoked
//! 4. a chart ends the turn after its result is recorded
//! 5. any other result is appended and the agent is called again, without the
//!    catalog, to narrate it
//!
//! Failures anywhere in the turn are caught here and rendered as a single
//! generic message. Messages appended before the failure stay in the history.

use crate::catalog::{IndicatorCall, IndicatorKind, catalog};
use crate::config::SageConfig;
use crate::conversation::Conversation;
use crate::error::{Result, SageError};
use crate::indicators::{Indicators, Invocation};
use sage_llm::{CompletionRequest, CompletionResponse, FunctionCall, FunctionSpec, LLMProvider, Message};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the user sees at the end of a turn
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// The agent answered directly
    Reply(String),
    /// The agent narrated a function result
    Narration { function: IndicatorKind, text: String },
    /// A chart was written
    Chart { ticker: String, path: PathBuf },
    /// The turn failed
    Error(String),
}

/// Routes user input through the agent and the indicator library
pub struct Dispatcher {
    provider: Arc<dyn LLMProvider>,
    indicators: Indicators,
    config: SageConfig,
    functions: Vec<FunctionSpec>,
}

impl Dispatcher {
    /// Create a dispatcher with the full function catalog
    pub fn new(provider: Arc<dyn LLMProvider>, indicators: Indicators, config: SageConfig) -> Self {
        Self {
            provider,
            indicators,
            config,
            functions: catalog(),
        }
    }

    /// Handle one user input, never failing
    pub async fn handle_turn(&self, conversation: &mut Conversation, input: &str) -> Rendered {
        match self.run_turn(conversation, input).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, history_len = conversation.len(), "Turn failed");
                Rendered::Error(format!("An error occurred: {e}"))
            }
        }
    }

    async fn run_turn(&self, conversation: &mut Conversation, input: &str) -> Result<Rendered> {
        conversation.push_user(input);
        info!(history_len = conversation.len(), "Turn started");

        let response = self.call_agent(conversation, true).await?;
        match response.message {
            Message::Assistant {
                function_call: Some(call),
                ..
            } => self.dispatch(conversation, call).await,
            Message::Assistant {
                content: Some(text),
                ..
            } if !text.trim().is_empty() => {
                info!(response_length = text.len(), "Agent replied directly");
                conversation.push_assistant(text.clone());
                Ok(Rendered::Reply(text))
            }
            _ => Err(SageError::EmptyReply),
        }
    }

    async fn dispatch(&self, conversation: &mut Conversation, call: FunctionCall) -> Result<Rendered> {
        info!(function = %call.name, "Agent requested function call");
        debug!(arguments = %call.arguments, "Function arguments");
        conversation.push_function_request(call.clone());

        let decoded = IndicatorCall::decode(&call)?;
        let kind = decoded.kind();

        match self.indicators.invoke(&decoded).await? {
            Invocation::Chart(path) => {
                conversation.push_function_result(kind, path.display().to_string());
                info!(path = %path.display(), "Chart rendered, turn complete");
                Ok(Rendered::Chart {
                    ticker: decoded.ticker().to_string(),
                    path,
                })
            }
            Invocation::Text(result) => {
                conversation.push_function_result(kind, result);

                let response = self.call_agent(conversation, false).await?;
                let text = response
                    .message
                    .text()
                    .filter(|text| !text.trim().is_empty())
                    .ok_or(SageError::EmptyReply)?
                    .to_string();

                info!(function = %kind, response_length = text.len(), "Agent narrated result");
                conversation.push_assistant(text.clone());
                Ok(Rendered::Narration {
                    function: kind,
                    text,
                })
            }
        }
    }

    /// Call the agent with the whole history, offering the catalog when asked
    async fn call_agent(
        &self,
        conversation: &Conversation,
        offer_functions: bool,
    ) -> Result<CompletionResponse> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.messages().to_vec())
            .max_tokens(self.config.max_tokens);
        if let Some(system) = &self.config.system_prompt {
            builder = builder.system(system.clone());
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        if offer_functions {
            builder = builder.functions(self.functions.clone());
        }

        info!(
            model = %self.config.model,
            provider = self.provider.name(),
            messages = conversation.len(),
            functions = offer_functions,
            "Sending request to agent"
        );
        let response = self.provider.complete(builder.build()).await?;

        info!(
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "Agent response received"
        );
        let preview: String = response.message.text().unwrap_or("").chars().take(300).collect();
        debug!(response_preview = %preview, "Agent response preview");

        Ok(response)
    }
}
