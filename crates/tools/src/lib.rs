//! Persona tools for parley.
//!
//! The chatbot can call two tools, both of which push a notification to the
//! site owner and report back `{"recorded": "ok"}`:
//!
//! - `record_user_details`: a visitor left an email address
//! - `record_unknown_question`: the model could not answer something

pub mod record_unknown_question;
pub mod record_user_details;

pub use record_unknown_question::RecordUnknownQuestionTool;
pub use record_user_details::RecordUserDetailsTool;

use parley_core::delivery::{DeliveryPolicy, Notifier};
use parley_core::error::ToolError;
use parley_core::tool::{ToolArgs, ToolFields, ToolRegistry};
use std::sync::Arc;

/// Build the registry offered to the persona chatbot.
pub fn persona_registry(notifier: Arc<dyn Notifier>, policy: DeliveryPolicy) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecordUserDetailsTool::new(notifier.clone(), policy)));
    registry.register(Box::new(RecordUnknownQuestionTool::new(notifier, policy)));
    registry
}

/// Read a string argument. Non-string scalars are rendered as JSON text.
pub(crate) fn string_arg(args: &ToolArgs, key: &str) -> Option<String> {
    match args.get(key)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn required_arg(args: &ToolArgs, key: &str) -> Result<String, ToolError> {
    string_arg(args, key)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required argument '{key}'")))
}

/// Push `text` and apply the sink's policy.
pub(crate) async fn push(
    notifier: &dyn Notifier,
    policy: DeliveryPolicy,
    tool_name: &str,
    text: &str,
) -> Result<ToolFields, ToolError> {
    let result = notifier.notify(text).await;
    policy
        .apply(notifier.name(), result)
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: e.to_string(),
        })?;

    let mut fields = ToolFields::new();
    fields.insert("recorded".into(), "ok".into());
    Ok(fields)
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use parley_core::delivery::Notifier;
    use parley_core::error::DeliveryError;
    use std::sync::Mutex;

    /// Records every pushed message.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    /// Fails every push.
    pub struct DownNotifier;

    #[async_trait]
    impl Notifier for DownNotifier {
        fn name(&self) -> &str {
            "down"
        }

        async fn notify(&self, _text: &str) -> Result<(), DeliveryError> {
            Err(DeliveryError::Transport {
                sink: "down".into(),
                reason: "connection refused".into(),
            })
        }
    }
}
