//! Hand-off of finished cards to the publishing queue

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{config::WebhookConfig, error::PipelineError};

pub const QUEUE_STATUS: &str = "Queue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub headline: String,
    pub image_url: String,
    pub summary: String,
    pub news_link: String,
    pub status: String,
}

impl DeliveryPayload {
    pub fn queued(
        headline: impl Into<String>,
        image_url: impl Into<String>,
        summary: impl Into<String>,
        news_link: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            image_url: image_url.into(),
            summary: summary.into(),
            news_link: news_link.into(),
            status: QUEUE_STATUS.to_string(),
        }
    }
}

#[async_trait]
pub trait WebhookClient: Send + Sync {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), PipelineError>;
}

pub struct HttpWebhook {
    client: Client,
    config: WebhookConfig,
}

impl HttpWebhook {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: WebhookConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl WebhookClient for HttpWebhook {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), PipelineError> {
        let resp = self
            .client
            .post(&self.config.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Delivery(format!("{} - {}", status, text)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_queue_status_and_camel_case() {
        let payload = DeliveryPayload::queued("H", "https://img/1.png", "S", "https://news/1");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "headline": "H",
                "imageUrl": "https://img/1.png",
                "summary": "S",
                "newsLink": "https://news/1",
                "status": "Queue"
            })
        );
    }
}
