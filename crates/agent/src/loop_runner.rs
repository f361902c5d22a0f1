//! The tool-call resolution loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use parley_core::error::{Error, ToolError};
use parley_core::message::Message;
use parley_core::provider::{Provider, ProviderRequest};
use parley_core::tool::{ToolCall, ToolRegistry, ToolResult};
use tracing::{debug, info, warn};

/// Default number of model round-trips allowed per turn.
pub const DEFAULT_MAX_ROUNDS: u32 = 25;

/// Drives one conversation turn to a final answer.
///
/// Each round sends the whole transcript plus the registry's tool
/// definitions. When the model asks for tools, every call is executed in the
/// order received and its result appended before the next round.
pub struct ToolLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Sampling temperature; `None` leaves it to the provider
    temperature: Option<f32>,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Model round-trips allowed before giving up
    max_rounds: u32,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the round limit. Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Resolve the transcript to a final answer.
    ///
    /// The transcript is extended in place with every assistant tool-call
    /// message and tool result. Only provider failures and the round limit
    /// are returned as errors; tool problems are reported to the model.
    pub async fn resolve(
        &self,
        tools: &ToolRegistry,
        transcript: &mut Vec<Message>,
    ) -> Result<String, Error> {
        let definitions = tools.definitions();

        for round in 1..=self.max_rounds {
            debug!(round, messages = transcript.len(), "Tool loop round");

            let request = ProviderRequest {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: definitions.clone(),
                ..ProviderRequest::new(self.model.clone(), transcript.clone())
            };

            let response = self.provider.complete(request).await?;

            if !response.requests_tools() {
                info!(rounds = round, "Turn resolved");
                return Ok(response.message.content);
            }

            let calls = response.message.tool_calls.clone();
            debug!(round, tool_count = calls.len(), "Executing tool calls");
            transcript.push(Message::assistant_with_tool_calls(
                response.message.content,
                calls.clone(),
            ));

            for raw in &calls {
                let call = ToolCall::from_message(raw);
                let result = execute_call(tools, call).await;
                transcript.push(Message::tool_result(&result.call_id, result.to_content()));
            }
        }

        warn!(limit = self.max_rounds, "Tool loop hit its round limit");
        Err(Error::ToolRoundsExceeded {
            limit: self.max_rounds,
        })
    }
}

/// Execute one call. Never fails: unknown tools, tool errors and panics all
/// become a [`ToolResult`].
pub async fn execute_call(tools: &ToolRegistry, call: ToolCall) -> ToolResult {
    let Some(tool) = tools.resolve(&call.name) else {
        warn!(tool = %call.name, "Model requested an unregistered tool");
        return ToolResult::unresolved(call.id);
    };

    let outcome = AssertUnwindSafe(tool.execute(call.arguments))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(ToolError::Panicked(panic_message(panic.as_ref()))));

    match outcome {
        Ok(fields) => {
            debug!(tool = %call.name, "Tool succeeded");
            ToolResult::fields(call.id, fields)
        }
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool execution failed");
            ToolResult::failed(call.id, &e)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}
