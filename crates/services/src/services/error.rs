use composer::ComposeError;
use thiserror::Error;

use super::task_store::TaskStoreError;

/// Every way a single category can fail. The `Display` text is what lands in
/// the task's `error` field.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch news for {category}: {message}")]
    Fetch { category: String, message: String },
    #[error("No trending articles could be gathered")]
    EmptyTrendingPool,
    #[error("No unused articles available")]
    NoUnusedArticles,
    #[error("All candidate articles were judged irrelevant")]
    Irrelevant,
    #[error("Analysis request failed: {0}")]
    Analysis(String),
    #[error("Analysis response was malformed: {0}")]
    AnalysisMalformed(String),
    #[error("Image acquisition failed: {0}")]
    ImageAcquisition(String),
    #[error("Image generation failed: {0}")]
    ImageGeneration(String),
    #[error("Composition failed: {0}")]
    Compose(#[from] ComposeError),
    #[error("Composition task aborted: {0}")]
    CompositionAborted(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Webhook delivery failed: {0}")]
    Delivery(String),
    #[error(transparent)]
    TaskStore(#[from] TaskStoreError),
}

impl PipelineError {
    pub fn fetch(category: &str, message: impl std::fmt::Display) -> Self {
        PipelineError::Fetch {
            category: category.to_string(),
            message: message.to_string(),
        }
    }
}
