//! Built-in regression fixtures and suite files.

use super::Case;
use crate::config::load_json;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Which verifier a batch drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    SearchUrl,
    LivePage,
    Snapshot,
}

impl Variant {
    /// Fixed results file name.
    pub fn default_output(&self) -> &'static str {
        match self {
            Variant::SearchUrl => "search_url_results.json",
            Variant::LivePage => "live_page_results.json",
            Variant::Snapshot => "snapshot_results.json",
        }
    }
}

/// Directory holding the snapshot fixtures shipped with this crate.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// The literal cases each variant runs when no suite file is given.
pub fn builtin_cases(variant: Variant) -> Vec<Case> {
    match variant {
        Variant::SearchUrl => vec![
            Case::url("https://github.com/search?q=repo%3Amicrosoft%2Fplaywright+is%3Aissue+is%3Aopen+label%3Abug&type=issues", true),
            Case::url("https://github.com/search?q=repo%3Amicrosoft%2Fplaywright+is%3Apr&type=issues", false),
            Case::url("https://github.com/search?q=repo%3Amicrosoft%2Fplaywright+is%3Aissue+label%3Adocumentation&type=issues", false),
            Case::url("https://github.com/search?q=label%3Abug+is%3Aopen+repo%3Amicrosoft%2Fplaywright+is%3Aissue&type=issues", true),
            Case::url("https://github.com/search?q=repo:microsoft/playwright+is:issue+is:open+label:bug&type=issues", true),
        ],
        Variant::LivePage => vec![
            Case::url("https://en.wikipedia.org/wiki/Taj_Mahal", true),
            Case::url("https://en.wikipedia.org/wiki/Eiffel_Tower", false),
            Case::url("https://en.wikipedia.org/wiki/Agra", false),
        ],
        Variant::Snapshot => vec![
            Case::file(fixture_dir().join("snapshot_listing.html"), true),
            Case::file(fixture_dir().join("snapshot_listing_fail.html"), false),
        ],
    }
}

/// A suite file: constraints plus the cases to run against them.
///
/// ```json
/// { "constraints": { "max_price": 3000 }, "cases": [ { "file": "a.html", "expected": true } ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de> + Default"))]
pub struct Suite<C> {
    #[serde(default)]
    pub constraints: C,
    pub cases: Vec<Case>,
}

/// Load a suite, resolving relative case files against the suite's directory.
pub fn load_suite<C: DeserializeOwned + Default>(path: &Path) -> Result<Suite<C>> {
    let mut suite: Suite<C> = load_json(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    suite.cases = suite
        .cases
        .into_iter()
        .map(|c| Case {
            input: c.input.resolved_against(base),
            expected: c.expected,
        })
        .collect();
    Ok(suite)
}
