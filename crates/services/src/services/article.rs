//! Articles from the news provider and the analysis derived from them

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub link: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub source_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub pub_date: Option<String>,
}

impl Article {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.pub_date.as_deref().and_then(parse_timestamp)
    }

    /// Best available body text, preferring full content
    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.description.as_deref())
            .unwrap_or_default()
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare `YYYY-MM-DD`, all as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Text derived for one chosen article. Construction validates every field,
/// so a value of this type is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsAnalysis {
    headline: String,
    highlight_phrases: Vec<String>,
    caption: String,
    image_prompt: String,
    source_name: String,
}

impl NewsAnalysis {
    pub fn new(
        headline: impl Into<String>,
        highlight_phrases: Vec<String>,
        caption: impl Into<String>,
        image_prompt: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let headline = required("headline", headline.into())?;
        let caption = required("caption", caption.into())?;
        let image_prompt = required("imagePrompt", image_prompt.into())?;
        let source_name = required("sourceName", source_name.into())?;

        let highlight_phrases: Vec<String> = highlight_phrases
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if highlight_phrases.is_empty() {
            return Err(PipelineError::AnalysisMalformed(
                "highlightPhrases is empty".to_string(),
            ));
        }

        Ok(Self {
            headline,
            highlight_phrases,
            caption,
            image_prompt,
            source_name,
        })
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn highlight_phrases(&self) -> &[String] {
        &self.highlight_phrases
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

fn required(field: &str, value: String) -> Result<String, PipelineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::AnalysisMalformed(format!("{field} is empty")));
    }
    Ok(trimmed.to_string())
}

/// Analysis together with the article it was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedArticle {
    pub analysis: NewsAnalysis,
    pub article: Article,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .map(|ts| ts.and_utc());

        assert_eq!(parse_timestamp("2024-01-02 10:30:00"), expected);
        assert_eq!(parse_timestamp("2024-01-02T10:30:00Z"), expected);
        assert_eq!(parse_timestamp("2024-01-02T12:30:00+02:00"), expected);
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn analysis_requires_every_field() {
        let err = NewsAnalysis::new("Headline", vec!["x".into()], " ", "prompt", "Source").unwrap_err();
        assert!(matches!(err, PipelineError::AnalysisMalformed(ref m) if m.contains("caption")));

        let err = NewsAnalysis::new("Headline", vec!["  ".into()], "c", "prompt", "Source").unwrap_err();
        assert!(matches!(err, PipelineError::AnalysisMalformed(ref m) if m.contains("highlightPhrases")));
    }

    #[test]
    fn analysis_trims_fields() {
        let analysis =
            NewsAnalysis::new(" Rates hold ", vec![" rates ".into(), "".into()], "c", "p", "Wire").unwrap();
        assert_eq!(analysis.headline(), "Rates hold");
        assert_eq!(analysis.highlight_phrases(), ["rates".to_string()]);
    }

    #[test]
    fn body_prefers_content_over_description() {
        let mut article = Article {
            link: "l".into(),
            title: "t".into(),
            description: Some("desc".into()),
            content: Some("  ".into()),
            source_id: "s".into(),
            image_url: None,
            pub_date: None,
        };
        assert_eq!(article.body(), "desc");
        article.content = Some("full".into());
        assert_eq!(article.body(), "full");
    }
}
