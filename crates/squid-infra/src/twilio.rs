//! Owner notifications over Twilio SMS.
//!
//! Uses the Messages REST endpoint directly: a form POST with basic auth.
//! Delivery failures are logged and dropped.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use squid_core::notify::Notifier;
use tracing::{error, info};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Everything needed to text the owner.
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from: String,
    pub to: String,
}

pub struct TwilioNotifier {
    client: reqwest::Client,
    config: TwilioConfig,
    agent_name: String,
    base_url: String,
}

impl TwilioNotifier {
    pub fn new(config: TwilioConfig, agent_name: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            agent_name: agent_name.into(),
            base_url: TWILIO_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Messages are prefixed with the agent name so the owner knows who is texting.
    fn body_for(&self, message: &str) -> String {
        format!("[{}] {}", self.agent_name, message)
    }
}

impl Notifier for TwilioNotifier {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn notify(&self, message: &str) {
        let body = self.body_for(message);
        let form = [
            ("To", self.config.to.as_str()),
            ("From", self.config.from.as_str()),
            ("Body", body.as_str()),
        ];

        let result = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&form)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(to = %self.config.to, "Owner notified by SMS");
            }
            Ok(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                error!(%status, body = %text, "SMS send failed");
            }
            Err(e) => error!(error = %e, "SMS send failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> TwilioNotifier {
        TwilioNotifier::new(
            TwilioConfig {
                account_sid: "AC123".into(),
                auth_token: SecretString::from("token"),
                from: "+15550001111".into(),
                to: "+15552223333".into(),
            },
            "Inky",
        )
        .unwrap()
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            notifier().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_body_is_prefixed_with_agent_name() {
        assert_eq!(notifier().body_for("hello"), "[Inky] hello");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let notifier = notifier().with_base_url("http://127.0.0.1:9");
        // Completes without panicking or returning an error.
        notifier.notify("Security scan alert").await;
    }
}
