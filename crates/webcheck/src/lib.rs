//! webcheck: core library for checking extracted web content against constraints.
//!
//! A verifier extracts named fields from some raw input (a URL, a rendered
//! page, an HTML snapshot), evaluates them against a [`ConstraintSet`], and
//! turns the outcome into an evidence-carrying [`VerificationResult`].

pub mod constraint;
pub mod error;
pub mod evaluate;
pub mod types;
pub mod verdict;

pub use constraint::{Check, Constraint, ConstraintSet};
pub use error::ExtractError;
pub use evaluate::{evaluate, Evaluation, Violation};
pub use types::*;
pub use verdict::{verify, Outcome, VerificationResult};
