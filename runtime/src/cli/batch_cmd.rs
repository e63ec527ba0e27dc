//! `webcheck batch <variant>`: run a regression suite through one verifier.

use crate::batch::fixtures::{builtin_cases, load_suite, Variant};
use crate::batch::{run_cases, write_results, BatchRecord, Case, CaseInput};
use crate::config::{
    resolve_load_timeout, ArticleConstraints, ArticlePageConfig, ListingConstraints,
    ListingSelectors, SearchConstraints, SearchPageShape,
};
use crate::extraction::live_page::verify_live_page;
use crate::extraction::search_url::verify_search_url;
use crate::extraction::snapshot::verify_snapshot;
use crate::renderer;
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::future::ready;
use std::path::{Path, PathBuf};
use webcheck::{Evidence, VerificationResult};

/// Run `variant`'s cases, print every verdict, and save the results file.
pub async fn run(
    variant: Variant,
    suite: Option<&Path>,
    output: Option<&Path>,
    http_only: bool,
) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(variant.default_output()));
    let mut stdout = std::io::stdout();

    let records = match variant {
        Variant::SearchUrl => {
            let (constraints, cases) = cases_for::<SearchConstraints>(variant, suite)?;
            let shape = SearchPageShape::default();
            let rules = constraints.constraint_set();
            run_cases(
                &cases,
                |input| {
                    ready(match &input {
                        CaseInput::Url(url) => verify_search_url(url, &shape, &rules),
                        CaseInput::File(_) => input.unsupported("url"),
                    })
                },
                &mut stdout,
            )
            .await?
        }
        Variant::LivePage => {
            let (constraints, cases) = cases_for::<ArticleConstraints>(variant, suite)?;
            let config = ArticlePageConfig {
                load_timeout_ms: resolve_load_timeout(None),
                ..ArticlePageConfig::default()
            };
            let rules = constraints.constraint_set();
            let renderer = renderer::select(http_only, config.load_timeout_ms).await?;
            let renderer = renderer.as_ref();
            let (config, rules) = (&config, &rules);
            run_cases(
                &cases,
                |input| async move {
                    match &input {
                        CaseInput::Url(url) => verify_live_page(renderer, url, config, rules).await,
                        CaseInput::File(_) => input.unsupported("url"),
                    }
                },
                &mut stdout,
            )
            .await?
        }
        Variant::Snapshot => {
            let (constraints, cases) = cases_for::<ListingConstraints>(variant, suite)?;
            let selectors = ListingSelectors::default();
            let rules = constraints.constraint_set();
            run_cases(
                &cases,
                |input| {
                    ready(match &input {
                        CaseInput::File(path) => match std::fs::read_to_string(path) {
                            Ok(html) => verify_snapshot(&html, &selectors, &rules),
                            Err(e) => unreadable_snapshot(path, e),
                        },
                        CaseInput::Url(_) => input.unsupported("file"),
                    })
                },
                &mut stdout,
            )
            .await?
        }
    };

    write_results(&output, &records)?;
    print_summary(&records, &output);
    Ok(())
}

/// Suite constraints and cases, or the variant's defaults and built-in cases.
fn cases_for<C: DeserializeOwned + Default>(
    variant: Variant,
    suite: Option<&Path>,
) -> Result<(C, Vec<Case>)> {
    match suite {
        Some(path) => {
            let suite = load_suite::<C>(path)?;
            tracing::info!(path = %path.display(), cases = suite.cases.len(), "suite loaded");
            Ok((suite.constraints, suite.cases))
        }
        None => Ok((C::default(), builtin_cases(variant))),
    }
}

fn unreadable_snapshot(path: &Path, err: std::io::Error) -> VerificationResult {
    let mut evidence = Evidence::new();
    evidence.insert("file".into(), path.display().to_string().into());
    VerificationResult::system_error("Failed to read snapshot", err, evidence)
}

fn print_summary(records: &[BatchRecord], output: &Path) {
    println!();
    println!(
        "All {} test cases passed. Results saved to {}",
        records.len(),
        output.display()
    );
}
