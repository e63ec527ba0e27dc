//! Batch runner: drives fixed (input, expected) cases through a verifier.
//!
//! Cases run in order. Each result is printed as pretty JSON; the first case
//! whose `success` differs from its expectation halts the run. When every
//! case matches, the records are written to the output file as a JSON array.

pub mod fixtures;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use webcheck::{Evidence, VerificationResult};

/// The raw input of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseInput {
    Url(String),
    File(PathBuf),
}

impl CaseInput {
    fn kind(&self) -> &'static str {
        match self {
            CaseInput::Url(_) => "url",
            CaseInput::File(_) => "file",
        }
    }

    /// Verdict for an input the verifier cannot take, e.g. a file for a URL check.
    pub fn unsupported(&self, expected_kind: &str) -> VerificationResult {
        let mut evidence = Evidence::new();
        evidence.insert("input".into(), serde_json::to_value(self).unwrap_or_default());
        VerificationResult::structural_mismatch(
            format!("Expected a {expected_kind} input, got a {}", self.kind()),
            evidence,
        )
    }

    /// Resolve a relative file path against `base`.
    pub fn resolved_against(self, base: &Path) -> Self {
        match self {
            CaseInput::File(path) if path.is_relative() => CaseInput::File(base.join(path)),
            other => other,
        }
    }
}

/// One regression case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    #[serde(flatten)]
    pub input: CaseInput,
    pub expected: bool,
}

impl Case {
    pub fn url(url: impl Into<String>, expected: bool) -> Self {
        Self {
            input: CaseInput::Url(url.into()),
            expected,
        }
    }

    pub fn file(path: impl Into<PathBuf>, expected: bool) -> Self {
        Self {
            input: CaseInput::File(path.into()),
            expected,
        }
    }
}

/// One printed and persisted result line.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRecord {
    pub test_case: usize,
    #[serde(flatten)]
    pub input: CaseInput,
    #[serde(flatten)]
    pub result: VerificationResult,
}

/// Errors that stop a batch run.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("test case {test_case} failed: expected {expected}, got {actual}")]
    Mismatch {
        test_case: usize,
        expected: bool,
        actual: bool,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run `cases` through `verify`, printing each record to `out`.
///
/// Returns the records of a fully matching run; stops at the first mismatch.
pub async fn run_cases<F, Fut, W>(
    cases: &[Case],
    mut verify: F,
    out: &mut W,
) -> Result<Vec<BatchRecord>, BatchError>
where
    F: FnMut(CaseInput) -> Fut,
    Fut: Future<Output = VerificationResult>,
    W: Write,
{
    let mut records = Vec::with_capacity(cases.len());

    for (i, case) in cases.iter().enumerate() {
        let test_case = i + 1;
        let result = verify(case.input.clone()).await;
        let actual = result.success();

        let record = BatchRecord {
            test_case,
            input: case.input.clone(),
            result,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;

        if actual != case.expected {
            tracing::error!(test_case, expected = case.expected, actual, "expectation mismatch");
            return Err(BatchError::Mismatch {
                test_case,
                expected: case.expected,
                actual,
            });
        }
        records.push(record);
    }

    Ok(records)
}

/// Write records as a pretty-printed UTF-8 JSON array.
pub fn write_results(path: &Path, records: &[BatchRecord]) -> Result<(), BatchError> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).map_err(|source| BatchError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), count = records.len(), "results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ListingConstraints, ListingSelectors};
    use crate::extraction::snapshot::verify_snapshot;
    use serde_json::{json, Value};

    fn verdict(success: bool) -> VerificationResult {
        if success {
            verify_snapshot(
                r#"<p data-price="1" data-city="Pune" data-bedrooms="2"></p>"#,
                &ListingSelectors::default(),
                &ListingConstraints::default().constraint_set(),
            )
        } else {
            VerificationResult::structural_mismatch("nope", Evidence::new())
        }
    }

    #[tokio::test]
    async fn test_all_matching_cases_are_recorded() {
        let cases = vec![Case::url("pass", true), Case::url("fail", false)];
        let mut out = Vec::new();
        let records = run_cases(
            &cases,
            |input| async move { verdict(input == CaseInput::Url("pass".into())) },
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].test_case, 2);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("\"test_case\": 1"));
        assert!(printed.contains("\"url\": \"fail\""));
    }

    #[tokio::test]
    async fn test_first_mismatch_halts() {
        let cases = vec![
            Case::url("a", true),
            Case::url("b", true),
            Case::url("c", true),
        ];
        let mut calls = 0;
        let mut out = Vec::new();
        let err = run_cases(
            &cases,
            |input| {
                calls += 1;
                async move { verdict(input != CaseInput::Url("b".into())) }
            },
            &mut out,
        )
        .await
        .unwrap_err();

        assert_eq!(calls, 2);
        assert_eq!(err.to_string(), "test case 2 failed: expected true, got false");
    }

    #[test]
    fn test_record_flattens_input_and_result() {
        let record = BatchRecord {
            test_case: 3,
            input: CaseInput::File("listing.html".into()),
            result: verdict(true),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["test_case"], json!(3));
        assert_eq!(value["file"], json!("listing.html"));
        assert_eq!(value["success"], json!(true));
        assert!(value["evidence"].is_object());
    }

    #[test]
    fn test_write_results_is_a_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let records = vec![BatchRecord {
            test_case: 1,
            input: CaseInput::Url("https://example.com".into()),
            result: verdict(false),
        }];
        write_results(&path, &records).unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.as_array().unwrap().len(), 1);
        assert_eq!(saved[0]["outcome"], json!("STRUCTURAL_MISMATCH"));
    }

    #[test]
    fn test_unsupported_input_is_structural() {
        let result = CaseInput::File("a.html".into()).unsupported("url");
        assert!(!result.success());
        assert_eq!(result.reason(), "Expected a url input, got a file");
        assert_eq!(result.evidence()["input"], json!({"file": "a.html"}));
    }

    #[test]
    fn test_case_json_shape() {
        let case: Case = serde_json::from_str(r#"{"file": "a.html", "expected": false}"#).unwrap();
        assert_eq!(case, Case::file("a.html", false));
        let resolved = case.input.resolved_against(Path::new("/suites"));
        assert_eq!(resolved, CaseInput::File("/suites/a.html".into()));
    }
}
