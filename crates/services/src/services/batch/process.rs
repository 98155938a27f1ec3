use std::sync::Arc;

use composer::EncodedImage;
use image::DynamicImage;

use super::{BatchPipeline, BatchRun, CollectedData};
use crate::services::{
    compositor::CompositionJob,
    delivery::DeliveryPayload,
    error::PipelineError,
    task::{TaskResult, TaskState, TaskStatus},
};

impl BatchPipeline {
    /// Phase 2, over the categories that made it through phase 1
    pub(super) async fn process(&self, run: &mut BatchRun, collected: Vec<CollectedData>) {
        for item in collected {
            let id = item.task_id.clone();
            if run.status(&id) != Some(TaskStatus::Gathered) {
                tracing::warn!("[PROCESS] Skipping {}: not in GATHERED", id);
                continue;
            }

            run.transition(&id, TaskState::Processing);
            match self.process_one(run, &item).await {
                Ok(result) => {
                    tracing::info!("[PROCESS] {} delivered {}", id, result.image_url);
                    run.transition(&id, TaskState::Done { result });
                }
                Err(e) => run.fail(&id, &e),
            }
        }
    }

    async fn process_one(
        &self,
        run: &mut BatchRun,
        item: &CollectedData,
    ) -> Result<TaskResult, PipelineError> {
        let id = item.task_id.as_str();
        let analysis = &item.analysis;

        let source = self.acquire_image(run, item).await?;

        run.transition(id, TaskState::Composing);
        let job = CompositionJob {
            source,
            headline: analysis.headline().to_string(),
            highlights: analysis.highlight_phrases().to_vec(),
        };
        let card = self.compose(job).await?;

        run.transition(id, TaskState::Uploading);
        let image_url = self.collaborators.uploader.upload(&card).await?;

        // An upload stays hosted even when delivery fails below
        run.transition(id, TaskState::SendingWebhook);
        let payload = DeliveryPayload::queued(
            analysis.headline(),
            &image_url,
            analysis.caption(),
            &item.article.link,
        );
        self.collaborators.webhook.deliver(&payload).await?;

        Ok(TaskResult {
            headline: analysis.headline().to_string(),
            image_url,
            caption: analysis.caption().to_string(),
            source_url: item.article.link.clone(),
            source_name: analysis.source_name().to_string(),
        })
    }

    /// The article's own image, or a generated one when that is missing or
    /// unusable
    async fn acquire_image(
        &self,
        run: &mut BatchRun,
        item: &CollectedData,
    ) -> Result<DynamicImage, PipelineError> {
        let primary = match item.article.image_url.as_deref() {
            Some(reference) => self.load_image(reference).await,
            None => Err(PipelineError::ImageAcquisition(
                "article has no image".to_string(),
            )),
        };

        match primary {
            Ok(image) => Ok(image),
            Err(e) => {
                tracing::info!(
                    "[PROCESS] {} falling back to a generated image: {}",
                    item.task_id,
                    e
                );
                run.transition(&item.task_id, TaskState::GeneratingImage);
                let reference = self
                    .collaborators
                    .generator
                    .generate(item.analysis.image_prompt())
                    .await?;
                self.load_image(&reference).await
            }
        }
    }

    async fn load_image(&self, reference: &str) -> Result<DynamicImage, PipelineError> {
        let bytes = self.collaborators.images.fetch(reference).await?;
        composer::decode_image(&bytes).map_err(|e| PipelineError::ImageAcquisition(e.to_string()))
    }

    async fn compose(&self, job: CompositionJob) -> Result<EncodedImage, PipelineError> {
        let compositor = Arc::clone(&self.collaborators.compositor);
        tokio::task::spawn_blocking(move || compositor.compose(&job))
            .await
            .map_err(|e| PipelineError::CompositionAborted(e.to_string()))?
    }
}
