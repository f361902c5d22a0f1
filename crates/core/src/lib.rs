//! # parley core
//!
//! Domain types, traits, and error definitions shared by the persona chatbot
//! and the research pipeline. Every subsystem (reasoning service, tools,
//! delivery sinks) is a trait here; implementations live in their own crates
//! so tests can swap in scripted mocks.

pub mod delivery;
pub mod error;
pub mod message;
pub mod persona;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use delivery::{DeliveryPolicy, MailSink, NoopNotifier, Notifier, OutgoingMail};
pub use error::{DeliveryError, Error, ProviderError, ToolError};
pub use message::{Message, MessageToolCall, Role};
pub use persona::{Persona, PersonaSources};
pub use provider::{FinishReason, Provider, ProviderRequest, ProviderResponse, ResponseFormat, ToolDefinition};
pub use tool::{Tool, ToolArgs, ToolCall, ToolFields, ToolOutcome, ToolRegistry, ToolResult};
