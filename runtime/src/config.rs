//! Configuration: constraints, selectors, and page-shape settings.
//!
//! Every value here is immutable once built and is passed explicitly to the
//! extractor that needs it. All types deserialize from JSON with the
//! defaults below filling omitted keys, so suite files only need to name
//! what they change.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the default page-load timeout.
pub const LOAD_TIMEOUT_ENV: &str = "WEBCHECK_LOAD_TIMEOUT_MS";

/// Default page-load timeout in milliseconds.
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 15_000;

/// Resolve the page-load timeout: explicit value, then env, then default.
pub fn resolve_load_timeout(explicit: Option<u64>) -> u64 {
    if let Some(ms) = explicit {
        return ms;
    }

    std::env::var(LOAD_TIMEOUT_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_LOAD_TIMEOUT_MS)
}

/// Read and deserialize a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

// ── Search URL ──────────────────────────────────────────────────────────────

/// Host and path a search URL must have before any field is extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPageShape {
    pub host: String,
    pub path: String,
}

impl Default for SearchPageShape {
    fn default() -> Self {
        Self {
            host: "github.com".into(),
            path: "/search".into(),
        }
    }
}

/// What a GitHub issue search URL must ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConstraints {
    /// `owner/name` of the repository.
    pub repo: String,
    /// Value of the `type` query parameter.
    #[serde(rename = "type")]
    pub kind: String,
    /// Issue state, e.g. `open`.
    pub state: String,
    pub label: String,
    /// Item qualifier, e.g. `issue` for `is:issue`.
    pub item: String,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            repo: "microsoft/playwright".into(),
            kind: "issues".into(),
            state: "open".into(),
            label: "bug".into(),
            item: "issue".into(),
        }
    }
}

impl SearchConstraints {
    /// Tokens the decoded `q` parameter must contain.
    pub fn required_tokens(&self) -> Vec<String> {
        vec![
            format!("repo:{}", self.repo),
            format!("is:{}", self.item),
            format!("is:{}", self.state),
            format!("label:{}", self.label),
        ]
    }
}

// ── Live page ───────────────────────────────────────────────────────────────

/// Selectors and limits for reading an article heading and infobox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlePageConfig {
    pub title_selector: String,
    pub infobox_selector: String,
    /// Header text (case-insensitive substring) of the infobox row to read.
    pub row_keyword: String,
    pub load_timeout_ms: u64,
}

impl Default for ArticlePageConfig {
    fn default() -> Self {
        Self {
            title_selector: "h1#firstHeading".into(),
            infobox_selector: "table.infobox".into(),
            row_keyword: "location".into(),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
        }
    }
}

/// Substrings the article heading and infobox row must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConstraints {
    pub title_contains: String,
    pub location_contains: String,
}

impl Default for ArticleConstraints {
    fn default() -> Self {
        Self {
            title_contains: "Taj Mahal".into(),
            location_contains: "Agra".into(),
        }
    }
}

// ── Snapshot ────────────────────────────────────────────────────────────────

/// Attribute names carrying the listing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    pub price_attr: String,
    pub city_attr: String,
    pub bedrooms_attr: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            price_attr: "data-price".into(),
            city_attr: "data-city".into(),
            bedrooms_attr: "data-bedrooms".into(),
        }
    }
}

/// Bounds a rental listing must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConstraints {
    pub max_price: i64,
    pub city: String,
    pub bedrooms: i64,
}

impl Default for ListingConstraints {
    fn default() -> Self {
        Self {
            max_price: 3000,
            city: "Pune".into(),
            bedrooms: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_required_tokens_compose_from_constraints() {
        let c = SearchConstraints::default();
        assert_eq!(
            c.required_tokens(),
            vec![
                "repo:microsoft/playwright",
                "is:issue",
                "is:open",
                "label:bug"
            ]
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: SearchConstraints = serde_json::from_str(r#"{"type": "pullrequests"}"#).unwrap();
        assert_eq!(c.kind, "pullrequests");
        assert_eq!(c.repo, "microsoft/playwright");

        let l: ListingConstraints = serde_json::from_str(r#"{"max_price": 1200}"#).unwrap();
        assert_eq!(l.max_price, 1200);
        assert_eq!(l.bedrooms, 2);
    }

    #[test]
    fn test_explicit_timeout_wins() {
        assert_eq!(resolve_load_timeout(Some(250)), 250);
    }

    #[test]
    fn test_load_json_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = load_json::<ListingConstraints>(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON"));
    }
}
