//! Delivery sinks: where notifications and reports leave the process.
//!
//! Two sinks exist: a free-text [`Notifier`] (fire-and-forget push) and a
//! [`MailSink`] for HTML email. Each is paired with a [`DeliveryPolicy`]
//! that decides whether a failure is absorbed or propagated to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::DeliveryError;

/// What to do when a sink fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Log the failure and carry on as if delivery succeeded.
    Absorb,
    /// Hand the failure back to the caller.
    Propagate,
}

impl DeliveryPolicy {
    /// Apply this policy to a delivery result.
    pub fn apply<T>(
        self,
        sink: &str,
        result: Result<T, DeliveryError>,
    ) -> Result<Option<T>, DeliveryError> {
        match (self, result) {
            (_, Ok(value)) => Ok(Some(value)),
            (Self::Absorb, Err(e)) => {
                tracing::warn!(sink, error = %e, "Delivery failed, absorbing");
                Ok(None)
            }
            (Self::Propagate, Err(e)) => Err(e),
        }
    }
}

/// A push-notification sink taking free text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sink name for logs (e.g., "pushover").
    fn name(&self) -> &str;

    /// Send one message. Unconfigured sinks return `Ok(())` without sending.
    async fn notify(&self, text: &str) -> Result<(), DeliveryError>;
}

/// An email to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// An outbound email sink.
#[async_trait]
pub trait MailSink: Send + Sync {
    /// Sink name for logs (e.g., "sendgrid").
    fn name(&self) -> &str;

    /// Send the mail and return the transport status code.
    async fn send(&self, mail: &OutgoingMail) -> Result<u16, DeliveryError>;
}

/// A notifier that drops every message. Used when no push sink is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn notify(&self, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> Result<u16, DeliveryError> {
        Err(DeliveryError::Transport {
            sink: "test".into(),
            reason: "connection refused".into(),
        })
    }

    #[test]
    fn absorb_swallows_failures() {
        let out = DeliveryPolicy::Absorb.apply("test", failure()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn propagate_returns_failures() {
        let err = DeliveryPolicy::Propagate.apply("test", failure()).unwrap_err();
        assert!(matches!(err, DeliveryError::Transport { .. }));
    }

    #[test]
    fn success_passes_through_either_policy() {
        assert_eq!(DeliveryPolicy::Absorb.apply("t", Ok(202)).unwrap(), Some(202));
        assert_eq!(DeliveryPolicy::Propagate.apply("t", Ok(202)).unwrap(), Some(202));
    }

    #[test]
    fn policy_serializes_snake_case() {
        let json = serde_json::to_string(&DeliveryPolicy::Propagate).unwrap();
        assert_eq!(json, r#""propagate""#);
    }

    #[tokio::test]
    async fn noop_notifier_never_fails() {
        assert!(NoopNotifier.notify("anything").await.is_ok());
    }
}
