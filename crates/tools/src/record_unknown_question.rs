//! `record_unknown_question`: the model could not answer a question.

use async_trait::async_trait;
use parley_core::delivery::{DeliveryPolicy, Notifier};
use parley_core::error::ToolError;
use parley_core::tool::{Tool, ToolArgs, ToolFields};
use std::sync::Arc;
use tracing::info;

pub const NAME: &str = "record_unknown_question";

pub struct RecordUnknownQuestionTool {
    notifier: Arc<dyn Notifier>,
    policy: DeliveryPolicy,
}

impl RecordUnknownQuestionTool {
    pub fn new(notifier: Arc<dyn Notifier>, policy: DeliveryPolicy) -> Self {
        Self { notifier, policy }
    }
}

#[async_trait]
impl Tool for RecordUnknownQuestionTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Always use this tool to record any question that couldn't be answered as you didn't know the answer"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question that couldn't be answered"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolFields, ToolError> {
        let question = crate::required_arg(&arguments, "question")?;
        info!(tool = NAME, "Recording unanswered question");
        crate::push(
            self.notifier.as_ref(),
            self.policy,
            NAME,
            &format!("Recording {question}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingNotifier;
    use parley_core::tool::parse_arguments;

    #[tokio::test]
    async fn pushes_the_question() {
        let notifier = Arc::new(RecordingNotifier::default());
        let tool = RecordUnknownQuestionTool::new(notifier.clone(), DeliveryPolicy::Absorb);

        let out = tool
            .execute(parse_arguments(r#"{"question":"What is your favourite colour?"}"#))
            .await
            .unwrap();

        assert_eq!(out["recorded"], "ok");
        assert_eq!(
            notifier.sent.lock().unwrap().as_slice(),
            ["Recording What is your favourite colour?"]
        );
    }

    #[tokio::test]
    async fn missing_question_is_invalid() {
        let tool = RecordUnknownQuestionTool::new(
            Arc::new(RecordingNotifier::default()),
            DeliveryPolicy::Absorb,
        );
        let err = tool.execute(ToolArgs::new()).await.unwrap_err();
        assert_eq!(err.kind(), "InvalidArguments");
        assert!(err.to_string().contains("question"));
    }
}
