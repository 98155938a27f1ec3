//! Source images: loading a reference and generating a substitute

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::json;

use super::{config::OpenAiConfig, error::PipelineError};

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Raw bytes behind an image reference (URL or data URI)
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, PipelineError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce an image for `prompt` and return a reference to it
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Decode `data:<mime>;base64,<payload>`; `None` if `reference` is not a data URI
pub fn decode_data_uri(reference: &str) -> Option<Result<Vec<u8>, PipelineError>> {
    let rest = reference.strip_prefix("data:")?;
    let decoded = match rest.split_once(";base64,") {
        Some((_, payload)) => STANDARD
            .decode(payload.trim())
            .map_err(|e| PipelineError::ImageAcquisition(format!("bad data URI: {}", e))),
        None => Err(PipelineError::ImageAcquisition(
            "only base64 data URIs are supported".to_string(),
        )),
    };
    Some(decoded)
}

pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, PipelineError> {
        if let Some(decoded) = decode_data_uri(reference) {
            return decoded;
        }
        if !(reference.starts_with("http://") || reference.starts_with("https://")) {
            return Err(PipelineError::ImageAcquisition(format!(
                "unsupported image reference: {}",
                reference.chars().take(60).collect::<String>()
            )));
        }

        let resp = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| PipelineError::ImageAcquisition(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::ImageAcquisition(format!(
                "{} returned {}",
                reference, status
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PipelineError::ImageAcquisition(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// OpenAI images endpoint; returns a data URI so no second hop is needed
pub struct OpenAiImageGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiImageGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let mut body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "size": self.config.image_size,
            "n": 1
        });
        // gpt-image models always answer with base64 and reject the field
        if !self.config.image_model.starts_with("gpt-image") {
            body["response_format"] = json!("b64_json");
        }

        tracing::info!(
            "[IMAGERY] Generating substitute image: {}...",
            prompt.chars().take(60).collect::<String>()
        );
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::ImageGeneration(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::ImageGeneration(format!("{} - {}", status, text)));
        }

        let payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PipelineError::ImageGeneration(format!("invalid response: {}", e)))?;
        let image = &payload["data"][0];
        if let Some(b64) = image["b64_json"].as_str() {
            return Ok(format!("data:image/png;base64,{}", b64));
        }
        image["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PipelineError::ImageGeneration("response contained no image".to_string()))
    }
}
