//! Delivery sinks for parley.
//!
//! - [`PushoverNotifier`] implements `parley_core::Notifier`
//! - [`SendGridMailer`] implements `parley_core::MailSink`

pub mod pushover;
pub mod sendgrid;

pub use pushover::PushoverNotifier;
pub use sendgrid::SendGridMailer;

use parley_config::AppConfig;
use parley_core::delivery::{DeliveryPolicy, MailSink, Notifier};
use std::sync::Arc;

/// A sink paired with the policy applied to its failures.
pub struct Sink<T: ?Sized> {
    pub sink: Arc<T>,
    pub policy: DeliveryPolicy,
}

impl<T: ?Sized> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            policy: self.policy,
        }
    }
}

/// Build the notification sink described by `[notify]`.
pub fn notifier_from_config(config: &AppConfig) -> Sink<dyn Notifier> {
    let notifier = PushoverNotifier::from_config(&config.notify);
    if !notifier.is_configured() {
        tracing::info!("Pushover credentials missing, notifications disabled");
    }
    Sink {
        sink: Arc::new(notifier),
        policy: config.notify.on_failure,
    }
}

/// Build the mail sink described by `[mail]`.
pub fn mailer_from_config(config: &AppConfig) -> Sink<dyn MailSink> {
    Sink {
        sink: Arc::new(SendGridMailer::from_config(&config.mail)),
        policy: config.mail.on_failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policies_follow_config() {
        let config = AppConfig::default();
        assert_eq!(notifier_from_config(&config).policy, DeliveryPolicy::Absorb);
        assert_eq!(mailer_from_config(&config).policy, DeliveryPolicy::Propagate);
    }

    #[test]
    fn sink_names() {
        let config = AppConfig::default();
        assert_eq!(notifier_from_config(&config).sink.name(), "pushover");
        assert_eq!(mailer_from_config(&config).sink.name(), "sendgrid");
    }
}
