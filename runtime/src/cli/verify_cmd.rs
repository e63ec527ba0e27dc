//! `webcheck url|page|snapshot`: verify one input and print the verdict.

use crate::cli::output::print_result;
use crate::config::{
    resolve_load_timeout, ArticleConstraints, ArticlePageConfig, ListingConstraints,
    ListingSelectors, SearchConstraints, SearchPageShape,
};
use crate::extraction::live_page::verify_live_page;
use crate::extraction::search_url::verify_search_url;
use crate::extraction::snapshot::verify_snapshot;
use crate::renderer;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Constraint overrides for a search URL.
#[derive(Debug, Clone, Args)]
pub struct UrlArgs {
    /// Search URL to verify
    pub url: String,
    /// Repository the query must be scoped to (owner/name)
    #[arg(long)]
    pub repo: Option<String>,
    /// Required value of the `type` query parameter
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Required issue state
    #[arg(long)]
    pub state: Option<String>,
    /// Required label
    #[arg(long)]
    pub label: Option<String>,
}

impl UrlArgs {
    pub fn constraints(&self) -> SearchConstraints {
        let d = SearchConstraints::default();
        SearchConstraints {
            repo: self.repo.clone().unwrap_or(d.repo),
            kind: self.kind.clone().unwrap_or(d.kind),
            state: self.state.clone().unwrap_or(d.state),
            label: self.label.clone().unwrap_or(d.label),
            item: d.item,
        }
    }
}

/// Constraint overrides for a live article page.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Article URL to load
    pub url: String,
    /// Substring the page heading must contain
    #[arg(long)]
    pub title: Option<String>,
    /// Substring the infobox location must contain
    #[arg(long)]
    pub location: Option<String>,
    /// Page-load timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Fetch raw HTML over HTTP instead of rendering in Chromium
    #[arg(long)]
    pub http_only: bool,
}

impl PageArgs {
    pub fn constraints(&self) -> ArticleConstraints {
        let d = ArticleConstraints::default();
        ArticleConstraints {
            title_contains: self.title.clone().unwrap_or(d.title_contains),
            location_contains: self.location.clone().unwrap_or(d.location_contains),
        }
    }

    pub fn page_config(&self) -> ArticlePageConfig {
        ArticlePageConfig {
            load_timeout_ms: resolve_load_timeout(self.timeout_ms),
            ..ArticlePageConfig::default()
        }
    }
}

/// Constraint overrides for a listing snapshot.
#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// HTML snapshot file
    pub file: PathBuf,
    /// Highest acceptable price
    #[arg(long)]
    pub max_price: Option<i64>,
    /// Substring the city must contain
    #[arg(long)]
    pub city: Option<String>,
    /// Exact number of bedrooms
    #[arg(long)]
    pub bedrooms: Option<i64>,
}

impl SnapshotArgs {
    pub fn constraints(&self) -> ListingConstraints {
        let d = ListingConstraints::default();
        ListingConstraints {
            max_price: self.max_price.unwrap_or(d.max_price),
            city: self.city.clone().unwrap_or(d.city),
            bedrooms: self.bedrooms.unwrap_or(d.bedrooms),
        }
    }
}

pub fn run_url(args: &UrlArgs, json: bool) -> Result<()> {
    let result = verify_search_url(
        &args.url,
        &SearchPageShape::default(),
        &args.constraints().constraint_set(),
    );
    print_result(&result, json)
}

pub async fn run_page(args: &PageArgs, json: bool) -> Result<()> {
    let config = args.page_config();
    let renderer = renderer::select(args.http_only, config.load_timeout_ms).await?;
    let result = verify_live_page(
        renderer.as_ref(),
        &args.url,
        &config,
        &args.constraints().constraint_set(),
    )
    .await;
    print_result(&result, json)
}

pub fn run_snapshot(args: &SnapshotArgs, json: bool) -> Result<()> {
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read snapshot {}", args.file.display()))?;
    let result = verify_snapshot(
        &html,
        &ListingSelectors::default(),
        &args.constraints().constraint_set(),
    );
    print_result(&result, json)
}
