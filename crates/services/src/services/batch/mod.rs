//! Two-phase batch run: gather one article per category, then turn each
//! gathered article into a delivered card.
//!
//! Phase 1 finishes for every category before phase 2 starts, so the set of
//! claimed links is final before any image work begins.

mod gather;
mod process;
pub mod trending;


use std::{collections::HashSet, sync::Arc, time::Duration};

use composer::BrandAssets;

use super::{
    analysis::{NewsAnalyzer, OpenAiAnalyzer},
    article::{Article, NewsAnalysis},
    categories::{Category, default_categories},
    compositor::{BrandedCompositor, Compositor},
    config::PipelineConfig,
    delivery::{HttpWebhook, WebhookClient},
    error::PipelineError,
    imagery::{HttpImageSource, ImageGenerator, ImageSource, OpenAiImageGenerator},
    news::{NewsDataClient, NewsProvider},
    progress::{ProgressReporter, ProgressSender},
    task::{BatchTask, TaskState, TaskStatus},
    task_store::{TaskStore, TaskStoreError},
    upload::{ImageUploader, ImgbbUploader},
};

/// External services a run talks to
#[derive(Clone)]
pub struct Collaborators {
    pub news: Arc<dyn NewsProvider>,
    pub analyzer: Arc<dyn NewsAnalyzer>,
    pub images: Arc<dyn ImageSource>,
    pub generator: Arc<dyn ImageGenerator>,
    pub uploader: Arc<dyn ImageUploader>,
    pub webhook: Arc<dyn WebhookClient>,
    pub compositor: Arc<dyn Compositor>,
}

impl Collaborators {
    /// HTTP-backed collaborators sharing one connection pool
    pub fn from_config(config: &PipelineConfig, assets: BrandAssets) -> Self {
        let client = reqwest::Client::new();
        Self {
            news: Arc::new(NewsDataClient::with_client(client.clone(), config.news.clone())),
            analyzer: Arc::new(OpenAiAnalyzer::with_client(client.clone(), config.openai.clone())),
            images: Arc::new(HttpImageSource::with_client(client.clone())),
            generator: Arc::new(OpenAiImageGenerator::with_client(
                client.clone(),
                config.openai.clone(),
            )),
            uploader: Arc::new(ImgbbUploader::with_client(client.clone(), config.imgbb.clone())),
            webhook: Arc::new(HttpWebhook::with_client(client, config.webhook.clone())),
            compositor: Arc::new(BrandedCompositor::new(assets)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Pause between categories in phase 1; zero disables it
    pub gather_delay: Duration,
    /// Articles kept after merging the trending pool
    pub trending_pool_size: usize,
    /// Configured categories the trending pool fans out over
    pub trending_sources: Vec<Category>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            gather_delay: Duration::from_millis(2000),
            trending_pool_size: 10,
            trending_sources: default_categories(),
        }
    }
}

/// Terminal state of every task once both phases are over
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub tasks: Vec<BatchTask>,
    pub completed: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn all_failed(&self) -> bool {
        !self.tasks.is_empty() && self.failed == self.tasks.len()
    }
}

/// Output of phase 1 for one category, consumed by phase 2
#[derive(Debug, Clone)]
pub(crate) struct CollectedData {
    pub task_id: String,
    pub analysis: NewsAnalysis,
    pub article: Article,
}

/// Mutable state of a single run. Only the pipeline writes to it, one
/// category at a time.
pub(crate) struct BatchRun {
    store: TaskStore,
    used_links: HashSet<String>,
    progress: ProgressReporter,
}

impl BatchRun {
    fn new(store: TaskStore, progress: ProgressSender) -> Self {
        Self {
            store,
            used_links: HashSet::new(),
            progress: ProgressReporter::new(progress),
        }
    }

    /// Record a transition and publish the snapshot. Returns false if the
    /// store refused it.
    fn transition(&mut self, id: &str, state: TaskState) -> bool {
        match self.store.update(id, state) {
            Ok(snapshot) => {
                self.progress.report(&snapshot);
                true
            }
            Err(e) => {
                tracing::error!("[BATCH] {}", e);
                false
            }
        }
    }

    fn fail(&mut self, id: &str, error: &PipelineError) {
        tracing::warn!("[BATCH] Task {} failed: {}", id, error);
        self.transition(id, TaskState::failed(error));
    }

    fn status(&self, id: &str) -> Option<TaskStatus> {
        self.store.get(id).map(BatchTask::status)
    }

    fn into_summary(self) -> BatchSummary {
        let completed = self.store.completed();
        let failed = self.store.failed();
        BatchSummary {
            tasks: self.store.into_tasks(),
            completed,
            failed,
        }
    }
}

pub struct BatchPipeline {
    collaborators: Collaborators,
    options: BatchOptions,
}

impl BatchPipeline {
    pub fn new(collaborators: Collaborators, options: BatchOptions) -> Self {
        Self {
            collaborators,
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run both phases over `categories`, streaming every snapshot to
    /// `progress`. Per-category failures end up in the summary; only a
    /// category list with duplicate ids is rejected outright.
    pub async fn run(
        &self,
        categories: &[Category],
        progress: ProgressSender,
    ) -> Result<BatchSummary, TaskStoreError> {
        let store = TaskStore::new(categories)?;
        let mut run = BatchRun::new(store, progress);
        for task in run.store.snapshot() {
            run.progress.report(&task);
        }

        tracing::info!("[BATCH] Starting run over {} categories", categories.len());
        let collected = self.gather(&mut run, categories).await;
        tracing::info!(
            "[BATCH] Gather finished: {}/{} categories found an article",
            collected.len(),
            categories.len()
        );

        self.process(&mut run, collected).await;

        let summary = run.into_summary();
        tracing::info!(
            "[BATCH] Run finished: {} done, {} failed",
            summary.completed,
            summary.failed
        );
        Ok(summary)
    }
}
