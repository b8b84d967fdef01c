use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Posts `{"event","timestamp","data"}` to webhook endpoints.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new() -> Result<Self, NotifyError> {
        Ok(Self {
            client: Client::builder().timeout(WEBHOOK_TIMEOUT).build()?,
        })
    }

    pub async fn send(&self, url: &str, event: &str, data: &Value) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(url)
            .json(&payload(event, data))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        info!(event, "Webhook delivered");
        Ok(())
    }
}

fn payload(event: &str, data: &Value) -> Value {
    json!({
        "event": event,
        "timestamp": Utc::now().to_rfc3339(),
        "data": data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let body = payload("content_generated", &json!({ "content_id": "abc" }));
        assert_eq!(body["event"], "content_generated");
        assert_eq!(body["data"]["content_id"], "abc");
        assert!(body["timestamp"].is_string());
    }
}
