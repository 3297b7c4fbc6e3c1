use crate::errors::{BillDroidError, BillDroidResult};

/// Posts `{"text": ...}` to an incoming-webhook URL (Slack style).
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// `None` when no URL is configured: notifications are then skipped.
    pub fn new(url: &str) -> Option<Self> {
        if url.trim().is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub async fn send(&self, text: &str) -> BillDroidResult<()> {
        tracing::debug!(chars = text.len(), "sending webhook message");
        let res = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(BillDroidError::Notification(format!(
                "response status {status}: {}",
                body.trim()
            )));
        }
        Ok(())
    }

    /// Delivery failures are logged and otherwise ignored.
    pub async fn send_best_effort(&self, text: &str) {
        if let Err(e) = self.send(text).await {
            tracing::warn!(error = %e, "webhook delivery failed");
        }
    }
}
