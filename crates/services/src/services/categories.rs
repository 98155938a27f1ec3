use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of the synthetic category built from every other category's articles
pub const TRENDING_KEY: &str = "trending";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub api_value: String,
}

impl Category {
    pub fn new(name: impl Into<String>, api_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_value: api_value.into(),
        }
    }

    pub fn is_trending(&self) -> bool {
        self.api_value == TRENDING_KEY
    }
}

pub fn default_categories() -> Vec<Category> {
    [
        ("Trending", TRENDING_KEY),
        ("Top Stories", "top"),
        ("Business", "business"),
        ("Technology", "technology"),
        ("Science", "science"),
        ("Health", "health"),
        ("Sports", "sports"),
        ("Entertainment", "entertainment"),
        ("World", "world"),
        ("Politics", "politics"),
    ]
    .into_iter()
    .map(|(name, key)| Category::new(name, key))
    .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("At least one category is required")]
    Empty,
    #[error("Category \"{0}\" has an empty key")]
    BlankKey(String),
    #[error("Category key \"{0}\" appears more than once")]
    Duplicate(String),
}

/// Keys must be present and unique within a run
pub fn validate_categories(categories: &[Category]) -> Result<(), CategoryError> {
    if categories.is_empty() {
        return Err(CategoryError::Empty);
    }

    let mut seen = HashSet::new();
    for category in categories {
        if category.api_value.trim().is_empty() {
            return Err(CategoryError::BlankKey(category.name.clone()));
        }
        if !seen.insert(category.api_value.as_str()) {
            return Err(CategoryError::Duplicate(category.api_value.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_include_trending() {
        let categories = default_categories();
        assert!(validate_categories(&categories).is_ok());
        assert_eq!(categories.iter().filter(|c| c.is_trending()).count(), 1);
    }

    #[test]
    fn rejects_duplicates_and_blank_keys() {
        let dup = vec![Category::new("A", "x"), Category::new("B", "x")];
        assert_eq!(validate_categories(&dup), Err(CategoryError::Duplicate("x".into())));

        let blank = vec![Category::new("A", " ")];
        assert_eq!(validate_categories(&blank), Err(CategoryError::BlankKey("A".into())));

        assert_eq!(validate_categories(&[]), Err(CategoryError::Empty));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Category::new("Business", "business")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Business", "apiValue": "business"}));
    }
}
