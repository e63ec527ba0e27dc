//! Constraint definitions.

use crate::types::FieldValue;

/// The predicate a field must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Extracted value must equal the expected value.
    Equals(FieldValue),
    /// Extracted integer must not exceed the bound.
    AtMost(i64),
    /// Extracted text must contain the substring, ignoring case.
    Contains(String),
    /// Extracted token set must include every listed token, ignoring case.
    RequiredTokens(Vec<String>),
}

/// A named check against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub field: String,
    pub check: Check,
}

impl Constraint {
    pub fn new(name: impl Into<String>, field: impl Into<String>, check: Check) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            check,
        }
    }
}

/// An ordered, immutable collection of constraints.
///
/// Declaration order drives the order of violations and therefore the
/// reason string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Fields the constraints reference, deduplicated, in declaration order.
    pub fn required_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for c in &self.constraints {
            if !fields.contains(&c.field.as_str()) {
                fields.push(&c.field);
            }
        }
        fields
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
