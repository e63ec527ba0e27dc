//! Errors raised while extracting fields.

use crate::types::Evidence;
use serde_json::Value;

/// An extraction that could not produce fields.
///
/// Both variants are recovered into a failed verdict by [`crate::verify`];
/// neither escapes a verification call.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ExtractError {
    /// The input is not of the expected shape (wrong host, wrong path).
    #[error("{reason}")]
    Shape { reason: String, evidence: Evidence },

    /// Extraction itself failed (load timeout, non-numeric attribute, bad selector).
    #[error("{reason}: {detail}")]
    System {
        reason: String,
        detail: String,
        evidence: Evidence,
    },
}

impl ExtractError {
    pub fn shape(reason: impl Into<String>) -> Self {
        ExtractError::Shape {
            reason: reason.into(),
            evidence: Evidence::new(),
        }
    }

    pub fn system(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        ExtractError::System {
            reason: reason.into(),
            detail: detail.into(),
            evidence: Evidence::new(),
        }
    }

    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        match &mut self {
            ExtractError::Shape { evidence, .. } | ExtractError::System { evidence, .. } => {
                evidence.insert(key.into(), value.into());
            }
        }
        self
    }

    pub fn reason(&self) -> &str {
        match self {
            ExtractError::Shape { reason, .. } | ExtractError::System { reason, .. } => reason,
        }
    }
}
