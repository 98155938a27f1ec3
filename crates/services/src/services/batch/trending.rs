//! The synthetic trending category: a merged pool of the newest articles
//! across every other category.

use std::{cmp::Reverse, collections::HashSet};

use futures::future::join_all;

use crate::services::{
    article::Article,
    categories::Category,
    error::PipelineError,
    news::NewsProvider,
};

/// Deduplicate by link (first occurrence wins), order newest first with
/// undated articles last, and keep at most `limit`.
pub fn merge_trending(batches: Vec<Vec<Article>>, limit: usize) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Article> = batches
        .into_iter()
        .flatten()
        .filter(|article| seen.insert(article.link.clone()))
        .collect();

    merged.sort_by_cached_key(|article| Reverse(article.published_at()));
    merged.truncate(limit);
    merged
}

/// Category keys the trending pool draws from: every configured category
/// except trending itself, whatever subset the run asked for.
pub fn fan_out_keys(sources: &[Category]) -> Vec<String> {
    sources
        .iter()
        .filter(|c| !c.is_trending())
        .map(|c| c.api_value.clone())
        .collect()
}

/// Fetch every key concurrently. A failed key is logged and left out of the
/// pool; the pool itself must end up non-empty.
pub async fn fetch_trending(
    news: &dyn NewsProvider,
    keys: &[String],
    limit: usize,
) -> Result<Vec<Article>, PipelineError> {
    let fetches = keys.iter().map(|key| async move { (key, news.fetch_articles(key).await) });

    let mut batches = Vec::with_capacity(keys.len());
    for (key, result) in join_all(fetches).await {
        match result {
            Ok(articles) => batches.push(articles),
            Err(e) => tracing::warn!("[GATHER] Trending source {} skipped: {}", key, e),
        }
    }

    let pool = merge_trending(batches, limit);
    if pool.is_empty() {
        return Err(PipelineError::EmptyTrendingPool);
    }
    tracing::debug!("[GATHER] Trending pool holds {} articles", pool.len());
    Ok(pool)
}
