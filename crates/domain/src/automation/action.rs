//! Action instances — a registered action kind paired with its option values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::OptionValue;

/// Option values of an action, keyed by field name.
pub type ActionOptions = BTreeMap<String, OptionValue>;

/// Identifier of a registered action kind (e.g. `"message_send"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionKind(String);

impl ActionKind {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A configured action ready to be placed in an automation.
///
/// Only produced by [`ActionBuilder::build`](super::ActionBuilder::build),
/// so its options always satisfy the kind's schema. Serializes to the flat
/// document `{"type": "<kind>", "<field>": <value>, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionInstance {
    #[serde(rename = "type")]
    kind: ActionKind,
    #[serde(flatten)]
    options: ActionOptions,
}

impl ActionInstance {
    pub(crate) fn new(kind: ActionKind, options: ActionOptions) -> Self {
        Self { kind, options }
    }

    #[must_use]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    #[must_use]
    pub fn options(&self) -> &ActionOptions {
        &self.options
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&OptionValue> {
        self.options.get(field)
    }

    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.get(field) {
            Some(OptionValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn int(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            Some(OptionValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn float(&self, field: &str) -> Option<f64> {
        match self.get(field) {
            Some(OptionValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn bool(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            Some(OptionValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ActionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (index, name) in self.options.keys().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str(")")
    }
}
