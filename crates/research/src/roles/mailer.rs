//! Mailer role: report → HTML email → mail sink.
//!
//! The model drafts the subject and HTML body; sending is a direct call to
//! the configured [`MailSink`], filtered through its [`DeliveryPolicy`].

use async_trait::async_trait;
use parley_core::delivery::{DeliveryPolicy, MailSink, OutgoingMail};
use parley_core::provider::Provider;
use std::sync::Arc;
use tracing::info;
use crate::error::ResearchError;
use crate::model::{EmailDraft, ReportData};
use crate::prompts;
use super::{Mailer, RoleAgent};

pub struct LlmMailer {
    agent: RoleAgent,
    sink: Arc<dyn MailSink>,
    policy: DeliveryPolicy,
    from: String,
    to: String,
}

impl LlmMailer {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        sink: Arc<dyn MailSink>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            agent: RoleAgent::new("mailer", provider, model, prompts::MAILER_INSTRUCTIONS),
            sink,
            policy,
            from: String::new(),
            to: String::new(),
        }
    }

    /// Sender and recipient. Empty addresses are rejected by the sink.
    pub fn with_addresses(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from = from.unwrap_or_default();
        self.to = to.unwrap_or_default();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.agent = self.agent.with_temperature(temperature);
        self
    }
}

#[async_trait]
impl Mailer for LlmMailer {
    async fn deliver(&self, report: &ReportData) -> Result<(), ResearchError> {
        let draft: EmailDraft = self.agent.structured(&report.markdown_report).await?;

        let mail = OutgoingMail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: draft.subject,
            html_body: draft.html_body,
        };

        let sent = self.policy.apply(self.sink.name(), self.sink.send(&mail).await)?;
        if let Some(status) = sent {
            info!(sink = self.sink.name(), status, "Report emailed");
        }
        Ok(())
    }
}
