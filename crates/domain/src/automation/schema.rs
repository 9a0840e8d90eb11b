//! Options schema — the declared shape of an action kind's options.
//!
//! A schema is a flat, ordered list of named fields, each with a scalar
//! type tag and a nullability flag. Action kinds declare it once, at
//! registration time, and every option value is checked against it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Key carrying the action kind inside a persisted action document.
pub const RESERVED_KEY: &str = "type";

/// Declared type of an option field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Runtime type of the value, `None` for [`OptionValue::Null`].
    #[must_use]
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(FieldType::Bool),
            Self::Int(_) => Some(FieldType::Int),
            Self::Float(_) => Some(FieldType::Float),
            Self::Text(_) => Some(FieldType::Text),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a JSON scalar. Integers map to `Int`, any other number to
    /// `Float`. Arrays and objects yield `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for OptionValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One named, typed field of an options schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    field_type: FieldType,
    nullable: bool,
    description: String,
}

impl FieldSpec {
    /// A field that must hold a non-null value before an action can be built.
    #[must_use]
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            description: String::new(),
        }
    }

    /// A field that may be left unset or set to null.
    #[must_use]
    pub fn nullable(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, field_type)
        }
    }

    /// Attach a human-readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check `value` against this field: nullability first, then exact type.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NullNotAllowed`] or
    /// [`ValidationError::TypeMismatch`].
    pub fn check(&self, value: &OptionValue) -> Result<(), ValidationError> {
        match value.field_type() {
            None if self.nullable => Ok(()),
            None => Err(ValidationError::NullNotAllowed {
                field: self.name.clone(),
            }),
            Some(actual) if actual == self.field_type => Ok(()),
            Some(actual) => Err(ValidationError::TypeMismatch {
                field: self.name.clone(),
                expected: self.field_type,
                actual,
            }),
        }
    }
}

/// Ordered, fixed set of option fields for one action kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsSchema {
    fields: Vec<FieldSpec>,
}

impl OptionsSchema {
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// A schema for actions that take no options.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that the schema is a flat record: every field has a non-empty,
    /// unique name that does not collide with [`RESERVED_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchema`] naming the first offence.
    pub fn validate(&self, kind: &str) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidSchema {
            kind: kind.to_string(),
            reason,
        };
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(invalid(format!("field #{index} has an empty name")));
            }
            if field.name == RESERVED_KEY {
                return Err(invalid(format!("field name `{RESERVED_KEY}` is reserved")));
            }
            if self.fields[..index].iter().any(|f| f.name == field.name) {
                return Err(invalid(format!("field `{}` is declared twice", field.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound_schema() -> OptionsSchema {
        OptionsSchema::new([
            FieldSpec::required("sound", FieldType::Text).describe("Sound identifier"),
            FieldSpec::required("volume", FieldType::Float),
            FieldSpec::nullable("location", FieldType::Text),
        ])
    }

    #[test]
    fn should_accept_flat_schema() {
        assert!(sound_schema().validate("sound_play").is_ok());
        assert!(OptionsSchema::empty().validate("teleport").is_ok());
    }

    #[test]
    fn should_reject_duplicate_field_names() {
        let schema = OptionsSchema::new([
            FieldSpec::required("a", FieldType::Int),
            FieldSpec::nullable("a", FieldType::Text),
        ]);
        assert!(matches!(
            schema.validate("k"),
            Err(ValidationError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn should_reject_reserved_field_name() {
        let schema = OptionsSchema::new([FieldSpec::required("type", FieldType::Text)]);
        assert!(matches!(
            schema.validate("k"),
            Err(ValidationError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn should_reject_empty_field_name() {
        let schema = OptionsSchema::new([FieldSpec::required("", FieldType::Text)]);
        assert!(schema.validate("k").is_err());
    }

    #[test]
    fn should_find_field_by_name() {
        let schema = sound_schema();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.field("sound").unwrap().description(), "Sound identifier");
        assert!(schema.field("pitch").is_none());
    }

    #[test]
    fn should_reject_null_for_required_field() {
        let field = FieldSpec::required("volume", FieldType::Float);
        assert!(matches!(
            field.check(&OptionValue::Null),
            Err(ValidationError::NullNotAllowed { .. })
        ));
    }

    #[test]
    fn should_accept_null_for_nullable_field() {
        let field = FieldSpec::nullable("location", FieldType::Text);
        assert!(field.check(&OptionValue::Null).is_ok());
    }

    #[test]
    fn should_reject_int_for_float_field_without_coercion() {
        let field = FieldSpec::required("volume", FieldType::Float);
        assert_eq!(
            field.check(&OptionValue::Int(1)),
            Err(ValidationError::TypeMismatch {
                field: "volume".to_string(),
                expected: FieldType::Float,
                actual: FieldType::Int,
            })
        );
        assert!(field.check(&OptionValue::Float(1.0)).is_ok());
    }

    #[test]
    fn should_convert_json_scalars() {
        use serde_json::json;
        assert_eq!(OptionValue::from_json(&json!(3)), Some(OptionValue::Int(3)));
        assert_eq!(
            OptionValue::from_json(&json!(0.5)),
            Some(OptionValue::Float(0.5))
        );
        assert_eq!(
            OptionValue::from_json(&json!("hi")),
            Some(OptionValue::Text("hi".to_string()))
        );
        assert_eq!(OptionValue::from_json(&json!(null)), Some(OptionValue::Null));
        assert_eq!(OptionValue::from_json(&json!([1, 2])), None);
        assert_eq!(OptionValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn should_map_none_to_null() {
        let value: OptionValue = None::<String>.into();
        assert!(value.is_null());
        let value: OptionValue = Some("x").into();
        assert_eq!(value, OptionValue::Text("x".to_string()));
    }
}
