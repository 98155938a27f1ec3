use std::sync::Arc;

use services::services::{BatchPipeline, categories::Category};

/// Shared by every handler. The pipeline holds no per-run state, so one
/// instance serves concurrent batch requests.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<BatchPipeline>,
    categories: Arc<Vec<Category>>,
}

impl AppState {
    pub fn new(pipeline: BatchPipeline, categories: Vec<Category>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            categories: Arc::new(categories),
        }
    }

    pub fn pipeline(&self) -> Arc<BatchPipeline> {
        Arc::clone(&self.pipeline)
    }

    /// Categories used when a request does not name its own
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
