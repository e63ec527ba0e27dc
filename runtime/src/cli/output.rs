//! Result printing: pretty JSON for machines, a labelled block for humans.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use webcheck::VerificationResult;

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a verdict, as JSON or as a human-readable block.
pub fn print_result(result: &VerificationResult, json: bool) -> Result<()> {
    if json {
        print_json(result)
    } else {
        print!("{}", render_result(result));
        Ok(())
    }
}

/// Render the human-readable block for a verdict.
pub fn render_result(result: &VerificationResult) -> String {
    let mut out = String::new();
    let status = if result.success() { "PASS" } else { "FAIL" };

    let _ = writeln!(out, "=== VERIFICATION RESULT ===");
    let _ = writeln!(out, "Success : {status}");
    let _ = writeln!(out, "Outcome : {}", result.outcome());
    let _ = writeln!(out, "Reason  : {}", result.reason());

    if !result.evidence().is_empty() {
        let _ = writeln!(out, "\nEvidence:");
        for (key, value) in result.evidence() {
            let _ = writeln!(out, "  - {key}: {}", evidence_value(value));
        }
    }
    out
}

/// Strings print bare; everything else as compact JSON.
fn evidence_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
