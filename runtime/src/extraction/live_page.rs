//! Live page verifier: loads an article and reads its heading and infobox.

use super::{inner_text, normalize_text, parse_selector};
use crate::config::{ArticleConstraints, ArticlePageConfig};
use crate::renderer::{is_timeout, RenderContext, Renderer};
use scraper::Html;
use serde_json::json;
use webcheck::{
    verify, Check, Constraint, ConstraintSet, ExtractError, ExtractedFields, Extraction,
    FieldValue, VerificationResult,
};

pub const FIELD_TITLE: &str = "pageTitle";
pub const FIELD_LOCATION: &str = "extractedLocation";

impl ArticleConstraints {
    pub fn constraint_set(&self) -> ConstraintSet {
        ConstraintSet::new()
            .with(Constraint::new(
                "title",
                FIELD_TITLE,
                Check::Contains(self.title_contains.clone()),
            ))
            .with(Constraint::new(
                "location",
                FIELD_LOCATION,
                Check::Contains(self.location_contains.clone()),
            ))
    }
}

/// Read the heading and the keyword row of the infobox from page HTML.
///
/// Rows pair their first `th` with their first `td`; the first row whose
/// header contains the keyword (ignoring case) wins. Rows without both cells
/// are skipped. An empty value counts as not found.
pub fn extract_article_fields(
    html: &str,
    config: &ArticlePageConfig,
) -> Result<Extraction, ExtractError> {
    let title_sel = parse_selector(&config.title_selector)?;
    let infobox_sel = parse_selector(&config.infobox_selector)?;
    let row_sel = parse_selector("tr")?;
    let th_sel = parse_selector("th")?;
    let td_sel = parse_selector("td")?;

    let document = Html::parse_document(html);

    let title = document
        .select(&title_sel)
        .next()
        .map(|el| normalize_text(&inner_text(el)));

    let keyword = config.row_keyword.to_lowercase();
    let mut checked_rows = 0usize;
    let mut location = None;

    if let Some(infobox) = document.select(&infobox_sel).next() {
        let rows: Vec<_> = infobox.select(&row_sel).collect();
        checked_rows = rows.len();
        location = rows.into_iter().find_map(|row| {
            let header = row.select(&th_sel).next()?;
            let value = row.select(&td_sel).next()?;
            inner_text(header)
                .to_lowercase()
                .contains(&keyword)
                .then(|| normalize_text(&inner_text(value)))
        });
    }
    let location = location.filter(|l| !l.is_empty());

    tracing::debug!(?title, ?location, checked_rows, "article fields read");

    let fields = ExtractedFields::new()
        .with(FIELD_TITLE, title.map(FieldValue::Text))
        .with(FIELD_LOCATION, location.map(FieldValue::Text));

    Ok(Extraction::new(fields)
        .with_evidence("checkedRows", checked_rows)
        .with_evidence(
            "selectors",
            json!({
                "title": config.title_selector,
                "infobox": config.infobox_selector,
                "location": format!("{} tr > th:contains('{}') + td", config.infobox_selector, config.row_keyword),
            }),
        ))
}

async fn load_html(ctx: &mut dyn RenderContext, url: &str, timeout_ms: u64) -> Result<String, ExtractError> {
    let nav = ctx.navigate(url, timeout_ms).await.map_err(|e| {
        if is_timeout(&e) {
            ExtractError::system("Network timeout while loading page", format!("{e:#}"))
        } else {
            ExtractError::system("Unexpected system error", format!("{e:#}"))
        }
    })?;
    tracing::debug!(url, final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "page loaded");

    ctx.get_html()
        .await
        .map_err(|e| ExtractError::system("Unexpected system error", format!("{e:#}")))
}

/// Load `url` through `renderer` and extract the article fields.
///
/// The render context is closed on every path, including load failures.
pub async fn load_article(
    renderer: &dyn Renderer,
    url: &str,
    config: &ArticlePageConfig,
) -> Result<Extraction, ExtractError> {
    let mut ctx = renderer.new_context().await.map_err(|e| {
        ExtractError::system("Unexpected system error", format!("{e:#}")).with_evidence("url", url)
    })?;

    let loaded = load_html(ctx.as_mut(), url, config.load_timeout_ms).await;

    if let Err(e) = ctx.close().await {
        tracing::warn!(url, "failed to close render context: {e:#}");
    }

    let html = loaded.map_err(|e| e.with_evidence("url", url))?;
    Ok(extract_article_fields(&html, config)?.with_evidence("url", url))
}

/// Verify a live page against the article constraints.
pub async fn verify_live_page(
    renderer: &dyn Renderer,
    url: &str,
    config: &ArticlePageConfig,
    constraints: &ConstraintSet,
) -> VerificationResult {
    let result = verify(load_article(renderer, url, config).await, constraints);
    tracing::info!(url, outcome = %result.outcome(), "live page verified");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{NavigationResult, RenderError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use webcheck::Outcome;

    const TAJ_MAHAL: &str = r#"<html><body>
<h1 id="firstHeading" class="firstHeading"><span class="mw-page-title-main">Taj Mahal</span></h1>
<table class="infobox"><tbody>
<tr><th colspan="2" class="infobox-above">Taj Mahal</th></tr>
<tr><th scope="row" class="infobox-label">Type</th><td class="infobox-data">Mausoleum</td></tr>
<tr><th scope="row" class="infobox-label">Location</th><td class="infobox-data">Agra, <a href="/wiki/Uttar_Pradesh">Uttar Pradesh</a>,<br>India</td></tr>
</tbody></table>
</body></html>"#;

    /// Serves fixed HTML, or fails navigation with a timeout.
    struct FixedRenderer {
        html: Option<&'static str>,
        active: Arc<AtomicUsize>,
    }

    impl FixedRenderer {
        fn serving(html: &'static str) -> Self {
            Self {
                html: Some(html),
                active: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn timing_out() -> Self {
            Self {
                html: None,
                active: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct FixedContext {
        html: Option<&'static str>,
        active: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Renderer for FixedRenderer {
        async fn new_context(&self) -> anyhow::Result<Box<dyn RenderContext>> {
            self.active.fetch_add(1, Ordering::Relaxed);
            Ok(Box::new(FixedContext {
                html: self.html,
                active: Arc::clone(&self.active),
            }))
        }

        fn active_contexts(&self) -> usize {
            self.active.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl RenderContext for FixedContext {
        async fn navigate(&mut self, url: &str, timeout_ms: u64) -> anyhow::Result<NavigationResult> {
            match self.html {
                Some(_) => Ok(NavigationResult {
                    final_url: url.to_string(),
                    status: 200,
                    load_time_ms: 1,
                }),
                None => Err(RenderError::Timeout { timeout_ms }.into()),
            }
        }

        async fn get_html(&self) -> anyhow::Result<String> {
            Ok(self.html.unwrap_or_default().to_string())
        }

        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            self.active.fetch_sub(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn rules() -> ConstraintSet {
        ArticleConstraints::default().constraint_set()
    }

    #[test]
    fn test_extracts_title_and_location() {
        let ex = extract_article_fields(TAJ_MAHAL, &ArticlePageConfig::default()).unwrap();
        assert_eq!(ex.fields.get(FIELD_TITLE), Some(&FieldValue::from("Taj Mahal")));
        assert_eq!(
            ex.fields.get(FIELD_LOCATION),
            Some(&FieldValue::from("Agra, Uttar Pradesh, India"))
        );
        assert_eq!(ex.evidence["checkedRows"], json!(3));
    }

    #[test]
    fn test_heading_match_is_case_insensitive() {
        let rules = ArticleConstraints {
            title_contains: "taj mahal".into(),
            location_contains: "AGRA".into(),
        }
        .constraint_set();
        let ex = extract_article_fields(TAJ_MAHAL, &ArticlePageConfig::default());
        let result = verify(ex, &rules);
        assert!(result.success(), "{}", result.reason());
    }

    #[test]
    fn test_missing_infobox_is_structural() {
        let html = r#"<h1 id="firstHeading">Taj Mahal</h1><p>No table here.</p>"#;
        let result = verify(extract_article_fields(html, &ArticlePageConfig::default()), &rules());
        assert_eq!(result.outcome(), Outcome::StructuralMismatch);
        assert_eq!(result.evidence()["missingFields"], json!([FIELD_LOCATION]));
        assert_eq!(result.evidence()["checkedRows"], json!(0));
    }

    #[test]
    fn test_missing_heading_is_structural() {
        let html = r#"<table class="infobox"><tr><th>Location</th><td>Agra</td></tr></table>"#;
        let result = verify(extract_article_fields(html, &ArticlePageConfig::default()), &rules());
        assert_eq!(result.outcome(), Outcome::StructuralMismatch);
        assert_eq!(result.evidence()[FIELD_TITLE], serde_json::Value::Null);
        assert_eq!(result.evidence()[FIELD_LOCATION], json!("Agra"));
    }

    #[test]
    fn test_rows_without_both_cells_are_skipped() {
        let html = r#"<h1 id="firstHeading">X</h1>
<table class="infobox">
<tr><th>Location map</th></tr>
<tr><td>Location</td><td>Nowhere</td></tr>
<tr><th>Location</th><td>Delhi</td></tr>
</table>"#;
        let ex = extract_article_fields(html, &ArticlePageConfig::default()).unwrap();
        assert_eq!(ex.fields.get(FIELD_LOCATION), Some(&FieldValue::from("Delhi")));
    }

    #[tokio::test]
    async fn test_live_page_passes_and_releases_context() {
        let renderer = FixedRenderer::serving(TAJ_MAHAL);
        let url = "https://en.wikipedia.org/wiki/Taj_Mahal";
        let result =
            verify_live_page(&renderer, url, &ArticlePageConfig::default(), &rules()).await;
        assert!(result.success(), "{}", result.reason());
        assert_eq!(result.evidence()["url"], json!(url));
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_system_error_and_releases_context() {
        let renderer = FixedRenderer::timing_out();
        let result = verify_live_page(
            &renderer,
            "https://en.wikipedia.org/wiki/Taj_Mahal",
            &ArticlePageConfig::default(),
            &rules(),
        )
        .await;
        assert_eq!(result.outcome(), Outcome::SystemError);
        assert_eq!(result.reason(), "Network timeout while loading page");
        assert!(result.evidence().contains_key("error"));
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[test]
    fn test_bad_selector_config_is_system_error() {
        let config = ArticlePageConfig {
            infobox_selector: "table[".into(),
            ..ArticlePageConfig::default()
        };
        let result = verify(extract_article_fields(TAJ_MAHAL, &config), &rules());
        assert_eq!(result.outcome(), Outcome::SystemError);
        assert_eq!(result.reason(), "Invalid selector");
    }
}
