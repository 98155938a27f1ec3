//! API Client for the Newsframe server
//!
//! Wire types here mirror the server's JSON rather than sharing its crates,
//! so the CLI builds without the image stack.

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use utils::{ndjson::decode_stream, response::ApiResponse};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub api_value: String,
}

/// One progress line from `/api/batch`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: String,
    pub category_name: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<TaskOutcome>,
}

impl TaskSnapshot {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "DONE" | "ERROR")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub headline: String,
    pub image_url: String,
    pub caption: String,
    pub source_url: String,
    pub source_name: String,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a [Category]>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        tracing::debug!("GET {}/api/categories", self.base_url);
        let resp = self
            .client
            .get(format!("{}/api/categories", self.base_url))
            .send()
            .await
            .context("Failed to fetch categories")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to fetch categories: {} - {}", status, text);
        }

        let envelope: ApiResponse<Vec<Category>> = resp
            .json()
            .await
            .context("Failed to parse categories response")?;
        let message = envelope.message().unwrap_or("no data").to_string();
        envelope
            .into_data()
            .ok_or_else(|| anyhow::anyhow!("Server returned no categories: {}", message))
    }

    /// Start a batch and return its live progress. `None` runs the server's
    /// default category list.
    pub async fn start_batch(
        &self,
        categories: Option<&[Category]>,
    ) -> Result<impl Stream<Item = Result<TaskSnapshot>>> {
        tracing::debug!(
            "POST {}/api/batch ({} categories requested)",
            self.base_url,
            categories.map_or_else(|| "default".to_string(), |c| c.len().to_string())
        );
        let resp = self
            .client
            .post(format!("{}/api/batch", self.base_url))
            .json(&BatchRequest { categories })
            .send()
            .await
            .context("Failed to start batch")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiResponse<()>>(&text)
                .ok()
                .and_then(|e| e.message().map(str::to_string))
                .unwrap_or(text);
            anyhow::bail!("Batch rejected: {} - {}", status, message);
        }

        tracing::debug!("Batch accepted with {}", resp.status());
        Ok(decode_stream::<TaskSnapshot, _, _>(resp.bytes_stream())
            .map(|item| item.context("Progress stream interrupted")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_flat_server_record() {
        let snapshot: TaskSnapshot = serde_json::from_str(
            r#"{"id":"science","categoryName":"Science","status":"DONE","result":{"headline":"H","imageUrl":"https://img/1.png","caption":"C","sourceUrl":"https://n/1","sourceName":"Wire"}}"#,
        )
        .unwrap();
        assert!(snapshot.is_terminal());
        assert_eq!(snapshot.result.unwrap().image_url, "https://img/1.png");

        let pending: TaskSnapshot =
            serde_json::from_str(r#"{"id":"top","categoryName":"Top","status":"PENDING"}"#).unwrap();
        assert!(!pending.is_terminal());
        assert!(pending.error.is_none());
    }

    #[test]
    fn default_batch_request_sends_empty_object() {
        let body = serde_json::to_string(&BatchRequest { categories: None }).unwrap();
        assert_eq!(body, "{}");
    }
}
