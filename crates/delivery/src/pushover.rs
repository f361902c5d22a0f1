//! Pushover push-notification sink.
//!
//! Posts a form to the Pushover messages endpoint. Without both a token and
//! a user key the notifier is a silent no-op.

use async_trait::async_trait;
use parley_config::NotifyConfig;
use parley_core::delivery::Notifier;
use parley_core::error::DeliveryError;
use std::time::Duration;
use tracing::debug;

const SINK: &str = "pushover";

#[derive(Clone)]
struct Credentials {
    token: String,
    user: String,
}

/// Sends free-text notifications through Pushover.
pub struct PushoverNotifier {
    credentials: Option<Credentials>,
    api_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("configured", &self.is_configured())
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl PushoverNotifier {
    pub fn new(
        token: Option<String>,
        user: Option<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let credentials = match (token, user) {
            (Some(token), Some(user)) => Some(Credentials { token, user }),
            _ => None,
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            credentials,
            api_url: api_url.into(),
            client,
        }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(
            config.pushover_token.clone(),
            config.pushover_user.clone(),
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    fn name(&self) -> &str {
        SINK
    }

    async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
        let Some(creds) = &self.credentials else {
            debug!("Pushover not configured, dropping notification");
            return Ok(());
        };

        debug!(len = text.len(), "Sending push notification");

        let response = self
            .client
            .post(&self.api_url)
            .form(&[
                ("token", creds.token.as_str()),
                ("user", creds.user.as_str()),
                ("message", text),
            ])
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

        Ok(())
    }
}
