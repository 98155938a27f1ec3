use async_trait::async_trait;
use composer::EncodedImage;
use reqwest::Client;
use serde::Deserialize;

use super::{config::ImgbbConfig, error::PipelineError};

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Host the image and return its public URL
    async fn upload(&self, image: &EncodedImage) -> Result<String, PipelineError>;
}

pub struct ImgbbUploader {
    client: Client,
    config: ImgbbConfig,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgbbData>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: String,
}

impl ImgbbResponse {
    fn into_url(self) -> Result<String, PipelineError> {
        match self.data {
            Some(data) if self.success && !data.url.is_empty() => Ok(data.url),
            _ => Err(PipelineError::Upload(
                "image host did not return a URL".to_string(),
            )),
        }
    }
}

impl ImgbbUploader {
    pub fn new(config: ImgbbConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: ImgbbConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ImageUploader for ImgbbUploader {
    async fn upload(&self, image: &EncodedImage) -> Result<String, PipelineError> {
        let body = image.to_base64();
        let resp = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[("image", body.as_str())])
            .send()
            .await
            .map_err(|e| PipelineError::Upload(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Upload(format!("{} - {}", status, text)));
        }

        let payload: ImgbbResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::Upload(format!("invalid response: {}", e)))?;
        let url = payload.into_url()?;
        tracing::info!("[UPLOAD] Card hosted at {}", url);
        Ok(url)
    }
}
