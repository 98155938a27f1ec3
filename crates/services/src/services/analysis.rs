//! Article selection and copywriting via a chat-completions model

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{
    article::{AnalyzedArticle, Article, NewsAnalysis},
    config::OpenAiConfig,
    error::PipelineError,
};

const MAX_BODY_CHARS: usize = 600;

const SYSTEM_PROMPT: &str = "You are the editor of a social media news page. \
From the numbered candidate articles pick the single most newsworthy one that is \
suitable for a general audience. Respond with a JSON object with the keys \
selectedIndex (number, or null when no candidate is suitable), headline (at most \
12 words), highlightPhrases (1-3 short phrases copied verbatim from the headline), \
caption (2-3 sentences for the post body), imagePrompt (a photorealistic scene \
description without text or logos) and sourceName (the publisher's display name).";

#[async_trait]
pub trait NewsAnalyzer: Send + Sync {
    /// Pick one article and write copy for it; `Ok(None)` when none qualifies
    async fn analyze(&self, articles: &[Article]) -> Result<Option<AnalyzedArticle>, PipelineError>;
}

pub struct OpenAiAnalyzer {
    client: Client,
    config: OpenAiConfig,
}

/// Model reply shape; every field optional so validation can name what is missing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReply {
    pub selected_index: Option<usize>,
    pub headline: Option<String>,
    #[serde(default)]
    pub highlight_phrases: Vec<String>,
    pub caption: Option<String>,
    pub image_prompt: Option<String>,
    pub source_name: Option<String>,
}

impl AnalysisReply {
    /// Resolve the reply against the candidates it was produced from
    pub fn resolve(self, articles: &[Article]) -> Result<Option<AnalyzedArticle>, PipelineError> {
        let Some(index) = self.selected_index else {
            return Ok(None);
        };
        let article = articles.get(index).cloned().ok_or_else(|| {
            PipelineError::AnalysisMalformed(format!(
                "selectedIndex {} out of range for {} candidates",
                index,
                articles.len()
            ))
        })?;

        let missing = |field: &str| PipelineError::AnalysisMalformed(format!("{field} missing"));
        let analysis = NewsAnalysis::new(
            self.headline.ok_or_else(|| missing("headline"))?,
            self.highlight_phrases,
            self.caption.ok_or_else(|| missing("caption"))?,
            self.image_prompt.ok_or_else(|| missing("imagePrompt"))?,
            self.source_name.ok_or_else(|| missing("sourceName"))?,
        )?;

        Ok(Some(AnalyzedArticle { analysis, article }))
    }
}

fn candidate_list(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            let body: String = article.body().chars().take(MAX_BODY_CHARS).collect();
            format!(
                "[{}] {}\nSource: {}\nPublished: {}\n{}",
                index,
                article.title,
                article.source_id,
                article.pub_date.as_deref().unwrap_or("unknown"),
                body
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl OpenAiAnalyzer {
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
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NewsAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, articles: &[Article]) -> Result<Option<AnalyzedArticle>, PipelineError> {
        let body = json!({
            "model": self.config.analysis_model,
            "response_format": { "type": "json_object" },
            "temperature": 0.4,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": candidate_list(articles) }
            ]
        });

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Analysis(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Analysis(format!("{} - {}", status, text)));
        }

        let completion: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PipelineError::Analysis(format!("invalid response: {}", e)))?;
        let content = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| PipelineError::Analysis("completion had no message content".to_string()))?;

        let reply: AnalysisReply = serde_json::from_str(content)
            .map_err(|e| PipelineError::Analysis(format!("reply was not valid JSON: {}", e)))?;
        tracing::debug!("[ANALYSIS] Model selected {:?}", reply.selected_index);
        reply.resolve(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(link: &str) -> Article {
        Article {
            link: link.into(),
            title: format!("Title {link}"),
            description: Some("Body".into()),
            content: None,
            source_id: "wire".into(),
            image_url: None,
            pub_date: None,
        }
    }

    fn full_reply(index: usize) -> AnalysisReply {
        AnalysisReply {
            selected_index: Some(index),
            headline: Some("Rates hold steady".into()),
            highlight_phrases: vec!["Rates".into()],
            caption: Some("Caption".into()),
            image_prompt: Some("A bank".into()),
            source_name: Some("Wire".into()),
        }
    }

    #[test]
    fn null_selection_means_no_candidate() {
        let reply: AnalysisReply = serde_json::from_str(r#"{"selectedIndex": null}"#).unwrap();
        assert!(reply.resolve(&[article("a")]).unwrap().is_none());
    }

    #[test]
    fn resolves_selected_article() {
        let articles = [article("a"), article("b")];
        let analyzed = full_reply(1).resolve(&articles).unwrap().unwrap();
        assert_eq!(analyzed.article.link, "b");
        assert_eq!(analyzed.analysis.headline(), "Rates hold steady");
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let err = full_reply(5).resolve(&[article("a")]).unwrap_err();
        assert!(matches!(err, PipelineError::AnalysisMalformed(_)));
    }

    #[test]
    fn missing_field_is_malformed() {
        let reply = AnalysisReply {
            caption: None,
            ..full_reply(0)
        };
        let err = reply.resolve(&[article("a")]).unwrap_err();
        assert_eq!(err.to_string(), "Analysis response was malformed: caption missing");
    }

    #[test]
    fn candidate_list_numbers_articles() {
        let text = candidate_list(&[article("a"), article("b")]);
        assert!(text.starts_with("[0] Title a"));
        assert!(text.contains("[1] Title b"));
    }
}
