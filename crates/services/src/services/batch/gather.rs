use std::collections::HashSet;

use super::{BatchPipeline, BatchRun, CollectedData, trending};
use crate::services::{
    article::Article, categories::Category, error::PipelineError, task::TaskState,
};

impl BatchPipeline {
    /// Phase 1. Categories run strictly one after another so each one sees
    /// the links claimed by everything before it.
    pub(super) async fn gather(
        &self,
        run: &mut BatchRun,
        categories: &[Category],
    ) -> Vec<CollectedData> {
        let mut collected = Vec::new();

        for (index, category) in categories.iter().enumerate() {
            if index > 0 && !self.options.gather_delay.is_zero() {
                tokio::time::sleep(self.options.gather_delay).await;
            }

            let id = category.api_value.as_str();
            run.transition(id, TaskState::Gathering);
            tracing::info!("[GATHER] {} ({})", category.name, id);

            match self.gather_one(category, &run.used_links).await {
                Ok(item) => {
                    run.used_links.insert(item.article.link.clone());
                    run.transition(id, TaskState::Gathered);
                    tracing::info!("[GATHER] {} claimed {}", id, item.article.link);
                    collected.push(item);
                }
                Err(e) => run.fail(id, &e),
            }
        }

        collected
    }

    async fn gather_one(
        &self,
        category: &Category,
        used_links: &HashSet<String>,
    ) -> Result<CollectedData, PipelineError> {
        let articles = self.candidates(category).await?;

        let unused: Vec<Article> = articles
            .into_iter()
            .filter(|a| !used_links.contains(&a.link))
            .collect();
        if unused.is_empty() {
            return Err(PipelineError::NoUnusedArticles);
        }

        let analyzed = self
            .collaborators
            .analyzer
            .analyze(&unused)
            .await?
            .ok_or(PipelineError::Irrelevant)?;

        if !unused.iter().any(|a| a.link == analyzed.article.link) {
            return Err(PipelineError::AnalysisMalformed(format!(
                "selected article {} was not among the candidates",
                analyzed.article.link
            )));
        }

        Ok(CollectedData {
            task_id: category.api_value.clone(),
            analysis: analyzed.analysis,
            article: analyzed.article,
        })
    }

    async fn candidates(&self, category: &Category) -> Result<Vec<Article>, PipelineError> {
        let news = self.collaborators.news.as_ref();
        if category.is_trending() {
            let keys = trending::fan_out_keys(&self.options.trending_sources);
            trending::fetch_trending(news, &keys, self.options.trending_pool_size).await
        } else {
            news.fetch_articles(&category.api_value).await
        }
    }
}
