//! `record_user_details`: a visitor wants to get in touch.

use async_trait::async_trait;
use parley_core::delivery::{DeliveryPolicy, Notifier};
use parley_core::error::ToolError;
use parley_core::tool::{Tool, ToolArgs, ToolFields};
use std::sync::Arc;
use tracing::info;

pub const NAME: &str = "record_user_details";

pub struct RecordUserDetailsTool {
    notifier: Arc<dyn Notifier>,
    policy: DeliveryPolicy,
}

impl RecordUserDetailsTool {
    pub fn new(notifier: Arc<dyn Notifier>, policy: DeliveryPolicy) -> Self {
        Self { notifier, policy }
    }
}

#[async_trait]
impl Tool for RecordUserDetailsTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Use this tool to record that a user is interested in being in touch and provided an email address"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The email address of this user"
                },
                "name": {
                    "type": "string",
                    "description": "The user's name, if they provided it"
                },
                "notes": {
                    "type": "string",
                    "description": "Any additional information about the conversation that's worth recording to give context"
                }
            },
            "required": ["email"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolFields, ToolError> {
        let email = crate::required_arg(&arguments, "email")?;
        let name = crate::string_arg(&arguments, "name").unwrap_or_else(|| "Name not provided".into());
        let notes = crate::string_arg(&arguments, "notes").unwrap_or_else(|| "not provided".into());

        info!(tool = NAME, "Recording visitor contact details");
        let text = format!("Recording {name} with email {email} and notes {notes}");
        crate::push(self.notifier.as_ref(), self.policy, NAME, &text).await
    }
}
