//! Renderer abstraction for loading live pages.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over how a
//! page is loaded: a headless Chromium via chromiumoxide, or a plain HTTP GET
//! when no browser is available.

pub mod chromium;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use chromium::ChromiumRenderer;
pub use http::HttpRenderer;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Failures a renderer reports with a type callers can match on.
///
/// Returned inside `anyhow::Error`; use `downcast_ref::<RenderError>()`.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("navigation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("no page loaded")]
    NotLoaded,
}

/// A page loader that hands out rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new context (browser tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Number of contexts not yet closed.
    fn active_contexts(&self) -> usize;
}

/// A single context for loading one page.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL, giving up after `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// The current DOM serialized as HTML.
    async fn get_html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Whether an error chain was caused by a navigation timeout.
pub fn is_timeout(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<RenderError>(),
        Some(RenderError::Timeout { .. })
    )
}

/// Pick a renderer: Chromium when requested and installed, HTTP otherwise.
pub async fn select(http_only: bool, timeout_ms: u64) -> Result<Box<dyn Renderer>> {
    if !http_only {
        match chromium::find_chromium() {
            Some(_) => return Ok(Box::new(ChromiumRenderer::new().await?)),
            None => tracing::warn!("Chromium not found, falling back to HTTP-only mode"),
        }
    }
    Ok(Box::new(HttpRenderer::new(timeout_ms)))
}
