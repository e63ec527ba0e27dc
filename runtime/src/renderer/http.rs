//! HTTP-only renderer wrapping reqwest.
//!
//! Not a browser: the "rendered" DOM is whatever HTML the server returns.
//! Good enough for server-rendered pages such as Wikipedia articles, and
//! usable where Chromium is not installed. No retries.

use super::{NavigationResult, RenderContext, RenderError, Renderer};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Renderer that fetches pages with a single GET.
pub struct HttpRenderer {
    client: reqwest::Client,
    active_count: Arc<AtomicUsize>,
}

impl HttpRenderer {
    /// Create a renderer whose client gives up after `timeout_ms`.
    pub fn new(timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(HttpContext {
            client: self.client.clone(),
            html: None,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// One fetched page.
pub struct HttpContext {
    client: reqwest::Client,
    html: Option<String>,
    active_count: Arc<AtomicUsize>,
}

fn map_reqwest_error(e: reqwest::Error, timeout_ms: u64) -> anyhow::Error {
    if e.is_timeout() {
        RenderError::Timeout { timeout_ms }.into()
    } else {
        RenderError::Navigation(e.to_string()).into()
    }
}

#[async_trait]
impl RenderContext for HttpContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout_ms))?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout_ms))?;

        let load_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url, status, load_time_ms, bytes = body.len(), "page fetched");

        self.html = Some(body);
        Ok(NavigationResult {
            final_url,
            status,
            load_time_ms,
        })
    }

    async fn get_html(&self) -> Result<String> {
        self.html
            .clone()
            .ok_or_else(|| RenderError::NotLoaded.into())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::is_timeout;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_navigate_returns_served_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/Taj_Mahal"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Taj Mahal</h1>"))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(5000);
        let mut ctx = renderer.new_context().await.unwrap();
        assert_eq!(renderer.active_contexts(), 1);

        let nav = ctx
            .navigate(&format!("{}/wiki/Taj_Mahal", server.uri()), 5000)
            .await
            .unwrap();
        assert_eq!(nav.status, 200);
        assert!(nav.final_url.ends_with("/wiki/Taj_Mahal"));
        assert_eq!(ctx.get_html().await.unwrap(), "<h1>Taj Mahal</h1>");

        ctx.close().await.unwrap();
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    async fn test_slow_response_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<h1>late</h1>")
                    .set_delay(Duration::from_millis(2000)),
            )
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(5000);
        let mut ctx = renderer.new_context().await.unwrap();
        let err = ctx.navigate(&server.uri(), 100).await.unwrap_err();
        assert!(is_timeout(&err), "unexpected error: {err:#}");
        ctx.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_html_before_navigate_fails() {
        let renderer = HttpRenderer::new(1000);
        let ctx = renderer.new_context().await.unwrap();
        assert!(ctx.get_html().await.is_err());
        ctx.close().await.unwrap();
    }
}
