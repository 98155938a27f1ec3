//! Environment-driven configuration for the batch pipeline and its
//! collaborators. `.env` is loaded by the binary before any of this runs.

use std::time::Duration;

use thiserror::Error;

use super::batch::BatchOptions;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct NewsDataConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub analysis_model: String,
    pub image_model: String,
    pub image_size: String,
}

#[derive(Debug, Clone)]
pub struct ImgbbConfig {
    pub api_key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub news: NewsDataConfig,
    pub openai: OpenAiConfig,
    pub imgbb: ImgbbConfig,
    pub webhook: WebhookConfig,
    pub batch: BatchOptions,
    pub brand_text: String,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let optional = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let gather_delay = match get("GATHER_DELAY_MS") {
            Some(raw) => {
                let ms = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "GATHER_DELAY_MS",
                    value: raw.clone(),
                })?;
                Duration::from_millis(ms)
            }
            None => BatchOptions::default().gather_delay,
        };

        Ok(Self {
            news: NewsDataConfig {
                api_key: required("NEWSDATA_API_KEY")?,
                base_url: optional("NEWSDATA_BASE_URL", "https://newsdata.io/api/1"),
                language: optional("NEWS_LANGUAGE", "en"),
            },
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                base_url: optional("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                analysis_model: optional("ANALYSIS_MODEL", "gpt-4o-mini"),
                image_model: optional("IMAGE_MODEL", "dall-e-3"),
                image_size: optional("IMAGE_SIZE", "1024x1024"),
            },
            imgbb: ImgbbConfig {
                api_key: required("IMGBB_API_KEY")?,
                endpoint: optional("IMGBB_ENDPOINT", "https://api.imgbb.com/1/upload"),
            },
            webhook: WebhookConfig {
                url: required("DELIVERY_WEBHOOK_URL")?,
            },
            batch: BatchOptions {
                gather_delay,
                ..BatchOptions::default()
            },
            brand_text: optional("BRAND_TEXT", "Daily Brief"),
        })
    }
}
