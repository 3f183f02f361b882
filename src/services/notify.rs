use serde_json::json;

use crate::config::Config;

/// Best-effort driver notifications. Delivery is never part of a booking's
/// outcome: failures are logged and dropped.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    sender: String,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.notify_api_url.clone(),
            api_key: config.notify_api_key.clone(),
            sender: config.notify_sender.clone(),
        }
    }

    /// Notifier without a delivery API; every message is logged and skipped.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: None,
            api_key: None,
            sender: "noreply@carpool.local".to_string(),
        }
    }

    /// Queue a message without blocking the caller.
    pub fn notify(&self, to: &str, subject: &str, body: &str) {
        let notifier = self.clone();
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        tokio::spawn(async move {
            notifier.send(&to, &subject, &body).await;
        });
    }

    async fn send(&self, to: &str, subject: &str, body: &str) {
        let (Some(api_url), Some(api_key)) = (&self.api_url, &self.api_key) else {
            tracing::warn!("notification API not configured, skipping message to {}", to);
            return;
        };

        let payload = json!({
            "sender": { "email": self.sender },
            "to": [{ "email": to }],
            "subject": subject,
            "textContent": body,
        });

        let result = self
            .client
            .post(api_url)
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("notification sent to {}", to);
            }
            Ok(response) => {
                tracing::warn!("notification to {} rejected: {}", to, response.status());
            }
            Err(e) => {
                tracing::warn!("notification to {} failed: {}", to, e);
            }
        }
    }
}
