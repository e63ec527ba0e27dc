//! Core data types for extracted fields and extractor output.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Diagnostic payload attached to a verdict.
pub type Evidence = Map<String, Value>;

/// A single extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    /// Order-independent set of lower-cased tokens.
    Tokens(BTreeSet<String>),
}

impl FieldValue {
    /// Build a token set from whitespace-delimited text, lower-cased.
    pub fn tokens_from(text: &str) -> Self {
        FieldValue::Tokens(
            text.to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tokens(&self) -> Option<&BTreeSet<String>> {
        match self {
            FieldValue::Tokens(t) => Some(t),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&FieldValue> for Value {
    fn from(v: &FieldValue) -> Self {
        match v {
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Tokens(t) => Value::Array(t.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Text(s) => write!(f, "'{s}'"),
            FieldValue::Tokens(t) => {
                let joined: Vec<&str> = t.iter().map(String::as_str).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

/// Named values pulled out of one raw input.
///
/// Entries keep insertion order. A field that was looked for but not found is
/// recorded as `None`, so "absent" is distinguishable from "never extracted".
/// There is no mutable access: a finished mapping is only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    entries: Vec<(String, Option<FieldValue>)>,
}

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field, replacing an earlier entry with the same name.
    pub fn with(mut self, name: impl Into<String>, value: Option<FieldValue>) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// The value of a field, or `None` if it is absent or unknown.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render every field as evidence, absent fields as `null`.
    pub fn to_evidence(&self) -> Evidence {
        self.entries
            .iter()
            .map(|(n, v)| (n.clone(), v.as_ref().map(Value::from).unwrap_or(Value::Null)))
            .collect()
    }
}

/// What an extractor hands to the verdict builder.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub fields: ExtractedFields,
    /// Auxiliary diagnostics (selectors used, rows scanned, decoded query).
    pub evidence: Evidence,
}

impl Extraction {
    pub fn new(fields: ExtractedFields) -> Self {
        Self {
            fields,
            evidence: Evidence::new(),
        }
    }

    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.evidence.insert(key.into(), value.into());
        self
    }
}
