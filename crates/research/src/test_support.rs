//! Test doubles shared by the research tests.

use async_trait::async_trait;
use parley_core::error::{DeliveryError, ProviderError};
use parley_core::delivery::{MailSink, OutgoingMail};
use parley_core::message::Message;
use parley_core::provider::{FinishReason, Provider, ProviderRequest, ProviderResponse};
use std::sync::Mutex;

/// Answers each call with the next scripted content string.
pub struct ScriptedProvider {
    contents: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(contents: Vec<&str>) -> Self {
        Self {
            contents: Mutex::new(contents.into_iter().map(String::from).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);
        let content = self
            .contents
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .ok_or_else(|| ProviderError::Network(format!("no scripted response #{index}")))?;

        Ok(ProviderResponse {
            message: Message::assistant(content),
            finish_reason: FinishReason::Stop,
            usage: None,
            model: "scripted".into(),
        })
    }
}

/// Captures mail instead of sending it; optionally fails.
#[derive(Default)]
pub struct CapturingMailSink {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

#[async_trait]
impl MailSink for CapturingMailSink {
    fn name(&self) -> &str {
        "capture"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<u16, DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected {
                sink: "capture".into(),
                status_code: 403,
                body: "sender not verified".into(),
            });
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(202)
    }
}
