//! SendGrid mail sink (v3 mail send API).

use async_trait::async_trait;
use parley_config::MailConfig;
use parley_core::delivery::{MailSink, OutgoingMail};
use parley_core::error::DeliveryError;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const SINK: &str = "sendgrid";

/// Sends HTML email through SendGrid.
pub struct SendGridMailer {
    api_key: Option<String>,
    api_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SendGridMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridMailer")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl SendGridMailer {
    pub fn new(api_key: Option<String>, api_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key,
            api_url: api_url.into(),
            client,
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(config.sendgrid_api_key.clone(), &config.api_url)
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'a str,
    value: &'a str,
}

impl<'a> SendRequest<'a> {
    fn from_mail(mail: &'a OutgoingMail) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: &mail.to }],
            }],
            from: Address { email: &mail.from },
            subject: &mail.subject,
            content: [Content {
                mime: "text/html",
                value: &mail.html_body,
            }],
        }
    }
}

#[async_trait]
impl MailSink for SendGridMailer {
    fn name(&self) -> &str {
        SINK
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<u16, DeliveryError> {
        let Some(api_key) = &self.api_key else {
            return Err(DeliveryError::NotConfigured(
                "mail.sendgrid_api_key is not set".into(),
            ));
        };
        if mail.from.is_empty() || mail.to.is_empty() {
            return Err(DeliveryError::NotConfigured(
                "mail.from and mail.to must both be set".into(),
            ));
        }

        debug!(to = %mail.to, subject = %mail.subject, "Sending email");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&SendRequest::from_mail(mail))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                sink: SINK.into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                sink: SINK.into(),
                status_code: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "Email accepted");
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use std::sync::{Arc, Mutex};

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "reports@example.com".into(),
            to: "me@example.com".into(),
            subject: "Research: rust async".into(),
            html_body: "<h1>Report</h1>".into(),
        }
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v3/mail/send")
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let mailer = SendGridMailer::new(None, "http://127.0.0.1:1/v3/mail/send");
        let err = mailer.send(&mail()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn missing_addresses_are_not_configured() {
        let mailer = SendGridMailer::new(Some("SG.key".into()), "http://127.0.0.1:1/v3/mail/send");
        let mut m = mail();
        m.to.clear();
        let err = mailer.send(&m).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn posts_v3_payload_and_returns_status() {
        let seen: Arc<Mutex<Vec<(String, serde_json::Value)>>> = Arc::default();
        let captured = seen.clone();
        let router = Router::new().route(
            "/v3/mail/send",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    captured.lock().unwrap().push((auth, body));
                    StatusCode::ACCEPTED
                }
            }),
        );
        let url = serve(router).await;

        let mailer = SendGridMailer::new(Some("SG.key".into()), url);
        let status = mailer.send(&mail()).await.unwrap();
        assert_eq!(status, 202);

        let requests = seen.lock().unwrap();
        let (auth, body) = &requests[0];
        assert_eq!(auth, "Bearer SG.key");
        assert_eq!(body["from"]["email"], "reports@example.com");
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "me@example.com");
        assert_eq!(body["subject"], "Research: rust async");
        assert_eq!(body["content"][0]["type"], "text/html");
        assert_eq!(body["content"][0]["value"], "<h1>Report</h1>");
    }

    #[tokio::test]
    async fn rejection_carries_status_and_body() {
        let router = Router::new().route(
            "/v3/mail/send",
            post(|| async { (StatusCode::FORBIDDEN, "sender not verified") }),
        );
        let url = serve(router).await;

        let mailer = SendGridMailer::new(Some("SG.key".into()), url);
        match mailer.send(&mail()).await.unwrap_err() {
            DeliveryError::Rejected { status_code, body, .. } => {
                assert_eq!(status_code, 403);
                assert_eq!(body, "sender not verified");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
