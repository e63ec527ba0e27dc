//! Verdict building: turn an extraction and its evaluation into a result.

use crate::constraint::ConstraintSet;
use crate::error::ExtractError;
use crate::evaluate::evaluate;
use crate::types::{Evidence, Extraction};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Terminal state of one verification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Pass,
    ConstraintViolation,
    StructuralMismatch,
    SystemError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Outcome::StructuralMismatch => "STRUCTURAL_MISMATCH",
            Outcome::SystemError => "SYSTEM_ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{success, reason, evidence}` record returned by every verifier.
///
/// Only the constructors in this module build one, so `success` always
/// agrees with `outcome`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    success: bool,
    reason: String,
    outcome: Outcome,
    evidence: Evidence,
}

impl VerificationResult {
    fn new(outcome: Outcome, reason: String, evidence: Evidence) -> Self {
        Self {
            success: outcome == Outcome::Pass,
            reason,
            outcome,
            evidence,
        }
    }

    /// The input was not of the expected shape, or a required field is absent.
    pub fn structural_mismatch(reason: impl Into<String>, evidence: Evidence) -> Self {
        Self::new(Outcome::StructuralMismatch, reason.into(), evidence)
    }

    /// Extraction itself failed; `error` is kept verbatim in the evidence.
    pub fn system_error(
        reason: impl Into<String>,
        error: impl fmt::Display,
        mut evidence: Evidence,
    ) -> Self {
        evidence.insert("error".into(), Value::String(error.to_string()));
        Self::new(Outcome::SystemError, reason.into(), evidence)
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }
}

impl From<ExtractError> for VerificationResult {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Shape { reason, evidence } => {
                VerificationResult::structural_mismatch(reason, evidence)
            }
            ExtractError::System {
                reason,
                detail,
                evidence,
            } => VerificationResult::system_error(reason, detail, evidence),
        }
    }
}

/// Build the verdict for one extraction.
///
/// Extraction errors and missing required fields short-circuit before any
/// violation is reported; a constraint violation is only possible once
/// every required field is present.
pub fn verify(
    extraction: Result<Extraction, ExtractError>,
    constraints: &ConstraintSet,
) -> VerificationResult {
    let extraction = match extraction {
        Ok(extraction) => extraction,
        Err(err) => {
            tracing::debug!("extraction failed: {err}");
            return err.into();
        }
    };

    let evaluation = evaluate(&extraction.fields, constraints);

    let mut evidence = extraction.evidence;
    evidence.extend(extraction.fields.to_evidence());

    if !evaluation.missing_fields.is_empty() {
        let reason = format!(
            "Missing required fields: {}",
            evaluation.missing_fields.join(", ")
        );
        evidence.insert(
            "missingFields".into(),
            Value::from(evaluation.missing_fields),
        );
        return VerificationResult::structural_mismatch(reason, evidence);
    }

    if !evaluation.violations.is_empty() {
        let messages: Vec<&str> = evaluation
            .violations
            .iter()
            .map(|v| v.message.as_str())
            .collect();
        let reason = format!("Constraint violations: {}", messages.join(", "));

        let fields: Vec<Value> = evaluation
            .violations
            .iter()
            .map(|v| Value::String(v.field.clone()))
            .collect();
        evidence.insert("violations".into(), Value::Array(fields));
        for v in evaluation.violations.iter().filter(|v| !v.missing.is_empty()) {
            evidence.insert(format!("{}Missing", v.field), Value::from(v.missing.clone()));
        }

        return VerificationResult::new(Outcome::ConstraintViolation, reason, evidence);
    }

    let reason = format!(
        "All constraints satisfied: {}",
        evaluation.satisfied.join(", ")
    );
    VerificationResult::new(Outcome::Pass, reason, evidence)
}
