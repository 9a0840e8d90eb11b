//! Step builder — validating constructor of a single [`ActionInstance`].

use super::action::{ActionInstance, ActionKind, ActionOptions};
use super::schema::{FieldSpec, OptionValue, OptionsSchema, RESERVED_KEY};
use crate::error::ValidationError;

/// Fills in the options of one action kind, checking each value against
/// the kind's schema as it is set.
///
/// [`build`](Self::build) is a pure factory: it can be called repeatedly
/// and never changes the builder.
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    kind: ActionKind,
    schema: OptionsSchema,
    values: ActionOptions,
}

impl ActionBuilder {
    #[must_use]
    pub fn new(kind: ActionKind, schema: OptionsSchema) -> Self {
        Self {
            kind,
            schema,
            values: ActionOptions::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Declared fields in schema order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        self.schema.fields()
    }

    /// Description attached to `field`, `None` if the field is unknown.
    #[must_use]
    pub fn description(&self, field: &str) -> Option<&str> {
        self.schema.field(field).map(FieldSpec::description)
    }

    /// Value currently set for `field`.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&OptionValue> {
        self.values.get(field)
    }

    /// Set one option. A later call for the same field overwrites it.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownField`] if the schema has no such field
    /// - [`ValidationError::NullNotAllowed`] if `value` is null and the field is not nullable
    /// - [`ValidationError::TypeMismatch`] if the value's type differs from the declared type
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<&mut Self, ValidationError> {
        let value = value.into();
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| ValidationError::UnknownField {
                kind: self.kind.to_string(),
                field: name.to_string(),
            })?;
        field.check(&value)?;
        self.values.insert(name.to_string(), value);
        Ok(self)
    }

    /// Set every entry of a persisted action document except the kind tag.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedValue`] for non-scalar values,
    /// otherwise the same errors as [`set_field`](Self::set_field).
    pub fn set_from_json(
        &mut self,
        document: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<&mut Self, ValidationError> {
        for (name, raw) in document {
            if name == RESERVED_KEY {
                continue;
            }
            let value = OptionValue::from_json(raw).ok_or_else(|| {
                ValidationError::UnsupportedValue {
                    field: name.clone(),
                }
            })?;
            self.set_field(name, value)?;
        }
        Ok(self)
    }

    /// Required fields that still lack a non-null value, in schema order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .filter(|f| !f.is_nullable())
            .filter(|f| self.values.get(f.name()).is_none_or(OptionValue::is_null))
            .map(FieldSpec::name)
            .collect()
    }

    /// Whether every non-nullable field holds a non-null value.
    #[must_use]
    pub fn can_build(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Produce the configured action. Unset nullable fields become `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteConfiguration`] listing the
    /// required fields that are still unset.
    pub fn build(&self) -> Result<ActionInstance, ValidationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::IncompleteConfiguration {
                kind: self.kind.to_string(),
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }

        let options = self
            .schema
            .fields()
            .iter()
            .map(|f| {
                let value = self.values.get(f.name()).cloned().unwrap_or(OptionValue::Null);
                (f.name().to_string(), value)
            })
            .collect();
        Ok(ActionInstance::new(self.kind.clone(), options))
    }
}
