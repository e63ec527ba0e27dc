//! Constraint evaluation over extracted fields.

use crate::constraint::{Check, Constraint, ConstraintSet};
use crate::types::{ExtractedFields, FieldValue};
use serde::Serialize;
use serde_json::Value;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub constraint: String,
    pub field: String,
    pub expected: Value,
    pub actual: Value,
    /// Required tokens not present in the extracted set, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    /// Human-readable description used in reason strings.
    pub message: String,
}

/// Everything the evaluator learned about one extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Required fields with no extracted value.
    pub missing_fields: Vec<String>,
    pub violations: Vec<Violation>,
    /// Descriptions of satisfied checks, in declaration order.
    pub satisfied: Vec<String>,
}

impl Evaluation {
    pub fn is_pass(&self) -> bool {
        self.missing_fields.is_empty() && self.violations.is_empty()
    }
}

/// Run every constraint against the extracted fields.
///
/// Checks are independent: all of them run and every violation is kept, so
/// the caller can report every problem at once.
pub fn evaluate(fields: &ExtractedFields, constraints: &ConstraintSet) -> Evaluation {
    let mut eval = Evaluation::default();

    for constraint in constraints {
        match fields.get(&constraint.field) {
            None => {
                if !eval.missing_fields.contains(&constraint.field) {
                    eval.missing_fields.push(constraint.field.clone());
                }
            }
            Some(actual) => match apply(constraint, actual) {
                Ok(description) => eval.satisfied.push(description),
                Err(violation) => {
                    tracing::debug!(
                        constraint = %constraint.name,
                        field = %constraint.field,
                        "constraint violated: {}",
                        violation.message
                    );
                    eval.violations.push(violation)
                }
            },
        }
    }

    eval
}

fn apply(constraint: &Constraint, actual: &FieldValue) -> Result<String, Violation> {
    let field = constraint.field.as_str();
    let fail = |expected: Value, missing: Vec<String>, message: String| Violation {
        constraint: constraint.name.clone(),
        field: field.to_string(),
        expected,
        actual: Value::from(actual),
        missing,
        message,
    };

    match &constraint.check {
        Check::Equals(expected) => {
            if actual == expected {
                Ok(format!("{field} {actual} = {expected}"))
            } else {
                Err(fail(
                    Value::from(expected),
                    Vec::new(),
                    format!("{field} {actual} != {expected}"),
                ))
            }
        }
        Check::AtMost(bound) => match actual.as_int() {
            Some(v) if v <= *bound => Ok(format!("{field} {v} <= {bound}")),
            Some(v) => Err(fail(
                Value::from(*bound),
                Vec::new(),
                format!("{field} {v} > {bound}"),
            )),
            None => Err(fail(
                Value::from(*bound),
                Vec::new(),
                format!("{field} {actual} is not an integer"),
            )),
        },
        Check::Contains(needle) => match actual.as_text() {
            Some(text) if text.to_lowercase().contains(&needle.to_lowercase()) => {
                Ok(format!("{field} {actual} contains '{needle}'"))
            }
            Some(_) => Err(fail(
                Value::String(needle.clone()),
                Vec::new(),
                format!("{field} {actual} does not contain '{needle}'"),
            )),
            None => Err(fail(
                Value::String(needle.clone()),
                Vec::new(),
                format!("{field} {actual} is not text"),
            )),
        },
        Check::RequiredTokens(required) => {
            let expected = Value::Array(required.iter().cloned().map(Value::String).collect());
            let Some(tokens) = actual.as_tokens() else {
                return Err(fail(
                    expected,
                    required.clone(),
                    format!("{field} {actual} is not a token set"),
                ));
            };
            let missing: Vec<String> = required
                .iter()
                .map(|t| t.to_lowercase())
                .filter(|t| !tokens.contains(t))
                .collect();
            if missing.is_empty() {
                Ok(format!("{field} include {}", required.join(", ")))
            } else {
                let message = format!(
                    "{field} missing required search tokens: {}",
                    missing.join(", ")
                );
                Err(fail(expected, missing, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: i64, city: &str, bedrooms: i64) -> ExtractedFields {
        ExtractedFields::new()
            .with("price", Some(FieldValue::Int(price)))
            .with("city", Some(city.into()))
            .with("bedrooms", Some(FieldValue::Int(bedrooms)))
    }

    fn listing_rules() -> ConstraintSet {
        ConstraintSet::new()
            .with(Constraint::new("max_price", "price", Check::AtMost(3000)))
            .with(Constraint::new("city", "city", Check::Contains("Pune".into())))
            .with(Constraint::new(
                "bedrooms",
                "bedrooms",
                Check::Equals(FieldValue::Int(2)),
            ))
    }

    fn search_rules() -> ConstraintSet {
        ConstraintSet::new().with(Constraint::new(
            "tokens",
            "tokens",
            Check::RequiredTokens(vec![
                "repo:microsoft/playwright".into(),
                "is:issue".into(),
                "is:open".into(),
                "label:bug".into(),
            ]),
        ))
    }

    #[test]
    fn test_price_bound_is_inclusive() {
        let eval = evaluate(&listing(3000, "Pune", 2), &listing_rules());
        assert!(eval.is_pass());
        assert_eq!(eval.satisfied.len(), 3);

        let eval = evaluate(&listing(3001, "Pune", 2), &listing_rules());
        assert!(!eval.is_pass());
        assert_eq!(eval.violations.len(), 1);
        assert_eq!(eval.violations[0].field, "price");
        assert_eq!(eval.violations[0].message, "price 3001 > 3000");
    }

    #[test]
    fn test_all_violations_accumulate_in_declaration_order() {
        let eval = evaluate(&listing(5000, "Mumbai", 3), &listing_rules());
        let fields: Vec<&str> = eval.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["price", "city", "bedrooms"]);
        assert_eq!(eval.violations[1].message, "city 'Mumbai' does not contain 'Pune'");
        assert_eq!(eval.violations[2].message, "bedrooms 3 != 2");
    }

    #[test]
    fn test_contains_ignores_case() {
        let eval = evaluate(&listing(100, "pune central", 2), &listing_rules());
        assert!(eval.is_pass());
        assert_eq!(eval.satisfied[1], "city 'pune central' contains 'Pune'");
    }

    #[test]
    fn test_missing_field_is_reported_not_evaluated() {
        let fields = ExtractedFields::new()
            .with("price", Some(FieldValue::Int(100)))
            .with("city", None);
        let eval = evaluate(&fields, &listing_rules());
        assert_eq!(eval.missing_fields, vec!["city", "bedrooms"]);
        assert!(eval.violations.is_empty());
        assert!(!eval.is_pass());
    }

    #[test]
    fn test_required_tokens_order_independent() {
        let a = ExtractedFields::new().with(
            "tokens",
            Some(FieldValue::tokens_from(
                "label:bug is:open repo:microsoft/playwright is:issue",
            )),
        );
        let b = ExtractedFields::new().with(
            "tokens",
            Some(FieldValue::tokens_from(
                "repo:microsoft/playwright is:issue is:open label:bug",
            )),
        );
        assert!(evaluate(&a, &search_rules()).is_pass());
        assert!(evaluate(&b, &search_rules()).is_pass());
    }

    #[test]
    fn test_missing_single_token_lists_only_that_token() {
        let fields = ExtractedFields::new().with(
            "tokens",
            Some(FieldValue::tokens_from(
                "repo:microsoft/playwright is:issue label:bug",
            )),
        );
        let eval = evaluate(&fields, &search_rules());
        assert_eq!(eval.violations.len(), 1);
        assert_eq!(eval.violations[0].missing, vec!["is:open"]);
    }

    #[test]
    fn test_required_tokens_compare_case_insensitively() {
        let rules = ConstraintSet::new().with(Constraint::new(
            "tokens",
            "tokens",
            Check::RequiredTokens(vec!["Label:Bug".into()]),
        ));
        let fields =
            ExtractedFields::new().with("tokens", Some(FieldValue::tokens_from("LABEL:bug")));
        assert!(evaluate(&fields, &rules).is_pass());
    }

    #[test]
    fn test_type_mismatch_is_a_violation() {
        let fields = ExtractedFields::new()
            .with("price", Some("cheap".into()))
            .with("city", Some(FieldValue::Int(7)))
            .with("bedrooms", Some(FieldValue::Int(2)));
        let eval = evaluate(&fields, &listing_rules());
        assert_eq!(eval.violations.len(), 2);
        assert_eq!(eval.violations[0].message, "price 'cheap' is not an integer");
        assert_eq!(eval.violations[1].message, "city 7 is not text");
    }
}
