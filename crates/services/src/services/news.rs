//! News article retrieval

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{article::Article, config::NewsDataConfig, error::PipelineError};

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Latest articles for one category key
    async fn fetch_articles(&self, category: &str) -> Result<Vec<Article>, PipelineError>;
}

/// newsdata.io `latest` endpoint client
pub struct NewsDataClient {
    client: Client,
    config: NewsDataConfig,
}

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    status: String,
    #[serde(default)]
    results: Vec<NewsDataArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsDataArticle {
    link: Option<String>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    source_id: Option<String>,
    image_url: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

impl NewsDataArticle {
    fn into_article(self) -> Option<Article> {
        let link = self.link.filter(|l| !l.trim().is_empty())?;
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(Article {
            link,
            title,
            description: self.description,
            content: self.content.filter(|c| !c.starts_with("ONLY AVAILABLE")),
            source_id: self.source_id.unwrap_or_else(|| "unknown".to_string()),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            pub_date: self.pub_date,
        })
    }
}

impl NewsDataClient {
    pub fn new(config: NewsDataConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: NewsDataConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/latest", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NewsProvider for NewsDataClient {
    async fn fetch_articles(&self, category: &str) -> Result<Vec<Article>, PipelineError> {
        tracing::debug!("[NEWS] Fetching latest articles for {}", category);

        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("apikey", self.config.api_key.as_str()),
                ("category", category),
                ("language", self.config.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::fetch(category, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PipelineError::fetch(category, format!("{} - {}", status, body)));
        }

        let payload: NewsDataResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::fetch(category, format!("invalid response: {}", e)))?;
        if payload.status != "success" {
            return Err(PipelineError::fetch(
                category,
                format!("provider status {}", payload.status),
            ));
        }

        let articles: Vec<Article> = payload
            .results
            .into_iter()
            .filter_map(NewsDataArticle::into_article)
            .collect();
        tracing::info!("[NEWS] {} articles for {}", articles.len(), category);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_provider_fields_and_skips_incomplete_entries() {
        let raw = serde_json::json!({
            "status": "success",
            "results": [
                {
                    "link": "https://news.example/a",
                    "title": "A",
                    "description": "desc",
                    "content": "ONLY AVAILABLE IN PAID PLANS",
                    "source_id": "wire",
                    "image_url": "",
                    "pubDate": "2024-01-02 10:00:00"
                },
                { "link": null, "title": "No link" }
            ]
        });
        let payload: NewsDataResponse = serde_json::from_value(raw).unwrap();
        let articles: Vec<Article> = payload
            .results
            .into_iter()
            .filter_map(NewsDataArticle::into_article)
            .collect();

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.source_id, "wire");
        assert_eq!(article.content, None);
        assert_eq!(article.image_url, None);
        assert!(article.published_at().is_some());
    }
}
