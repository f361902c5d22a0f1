//! The persona chat entry point.
//!
//! Every turn gets its own [`ChatContext`]: a fresh transcript
//! `[system, ...history, user]` and a fresh tool registry. Nothing mutable
//! is shared between concurrent turns.

use std::sync::Arc;
use parley_config::AppConfig;
use parley_core::delivery::{DeliveryPolicy, Notifier};
use parley_core::error::Error;
use parley_core::message::{Message, Role};
use parley_core::persona::Persona;
use parley_core::provider::Provider;
use parley_core::tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::loop_runner::ToolLoop;

/// One prior turn supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(&self.content),
            Role::Assistant => Message::assistant(&self.content),
            Role::System => Message::system(&self.content),
            // A bare tool turn has no call to answer; keep its text as context.
            Role::Tool => Message::assistant(&self.content),
        }
    }
}

/// Request-scoped state for one chat turn.
pub struct ChatContext {
    pub transcript: Vec<Message>,
    pub tools: ToolRegistry,
}

/// Answers visitor questions in character.
pub struct PersonaChat {
    tool_loop: ToolLoop,
    persona: Arc<Persona>,
    notifier: Arc<dyn Notifier>,
    notify_policy: DeliveryPolicy,
}

impl PersonaChat {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        persona: Persona,
        notifier: Arc<dyn Notifier>,
        notify_policy: DeliveryPolicy,
    ) -> Self {
        Self {
            tool_loop: ToolLoop::new(provider, model),
            persona: Arc::new(persona),
            notifier,
            notify_policy,
        }
    }

    /// Build from config. The persona documents are read once, here.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let persona = Persona::load(&config.persona.sources());
        let mut chat = Self::new(
            provider,
            &config.default_model,
            persona,
            notifier,
            config.notify.on_failure,
        );
        chat.tool_loop = chat
            .tool_loop
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_max_rounds(config.chat.max_tool_rounds);
        chat
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.tool_loop = self.tool_loop.with_max_rounds(max_rounds);
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Build the context for one turn.
    pub fn context(&self, history: &[ChatTurn], user_message: &str) -> ChatContext {
        let mut transcript = Vec::with_capacity(history.len() + 2);
        transcript.push(Message::system(&self.persona.system_prompt));
        transcript.extend(history.iter().map(ChatTurn::to_message));
        transcript.push(Message::user(user_message));

        ChatContext {
            transcript,
            tools: parley_tools::persona_registry(self.notifier.clone(), self.notify_policy),
        }
    }

    /// Answer `user_message` given the prior `history`.
    pub async fn reply(&self, history: &[ChatTurn], user_message: &str) -> Result<String, Error> {
        let mut ctx = self.context(history, user_message);
        debug!(history = history.len(), "Chat turn started");
        self.tool_loop.resolve(&ctx.tools, &mut ctx.transcript).await
    }
}
