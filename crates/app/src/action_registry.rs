//! Action registry — the catalogue of action kinds the system can run.
//!
//! Each kind is registered once at startup with its options schema and the
//! handler that carries it out. The registry is then shared read-only.

use std::fmt;
use std::sync::Arc;

use gather_domain::automation::{
    ActionBuilder, ActionInstance, ActionKind, OptionsSchema, RESERVED_KEY,
};
use gather_domain::error::{GatherError, NotFoundError, ValidationError};

use crate::ports::ActionHandler;

struct Registration {
    kind: ActionKind,
    schema: OptionsSchema,
    handler: Arc<dyn ActionHandler>,
}

/// Kinds in registration order, each with its schema and handler.
#[derive(Default)]
pub struct ActionRegistry {
    entries: Vec<Registration>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.kind.as_str()))
            .finish()
    }
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kind`. Registering a kind again replaces its schema and
    /// handler but keeps its original position.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchema`] when the schema is not a
    /// flat record with unique, non-reserved field names.
    pub fn register(
        &mut self,
        kind: impl Into<ActionKind>,
        schema: OptionsSchema,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), GatherError> {
        let kind = kind.into();
        schema.validate(kind.as_str())?;

        if let Some(existing) = self.entries.iter_mut().find(|e| e.kind == kind) {
            tracing::debug!(%kind, "action kind re-registered");
            existing.schema = schema;
            existing.handler = handler;
        } else {
            tracing::debug!(%kind, fields = schema.len(), "action kind registered");
            self.entries.push(Registration {
                kind,
                schema,
                handler,
            });
        }
        Ok(())
    }

    fn entry(&self, kind: &str) -> Option<&Registration> {
        self.entries.iter().find(|e| e.kind.as_str() == kind)
    }

    /// Options schema of `kind`, `None` if it is not registered.
    #[must_use]
    pub fn options_schema(&self, kind: &str) -> Option<&OptionsSchema> {
        self.entry(kind).map(|e| &e.schema)
    }

    #[must_use]
    pub fn handler(&self, kind: &str) -> Option<Arc<dyn ActionHandler>> {
        self.entry(kind).map(|e| Arc::clone(&e.handler))
    }

    /// Registered kinds in registration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&ActionKind> {
        self.entries.iter().map(|e| &e.kind).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh step builder for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when `kind` is not registered.
    pub fn action_builder(&self, kind: &str) -> Result<ActionBuilder, GatherError> {
        let entry = self.entry(kind).ok_or_else(|| unknown_kind(kind))?;
        Ok(ActionBuilder::new(entry.kind.clone(), entry.schema.clone()))
    }

    /// Decode one persisted action document against its kind's schema.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MalformedAction`] if the document is not an
    ///   object or lacks a string `type` tag
    /// - [`GatherError::NotFound`] if the kind is not registered
    /// - any [`ValidationError`] raised while filling or building the action
    pub fn decode_action(
        &self,
        document: &serde_json::Value,
    ) -> Result<ActionInstance, GatherError> {
        let object = document.as_object().ok_or_else(|| {
            ValidationError::MalformedAction("expected a JSON object".to_string())
        })?;
        let kind = object
            .get(RESERVED_KEY)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                ValidationError::MalformedAction(format!("missing string `{RESERVED_KEY}` tag"))
            })?;

        let mut builder = self.action_builder(kind)?;
        builder.set_from_json(object)?;
        Ok(builder.build()?)
    }
}

fn unknown_kind(kind: &str) -> GatherError {
    NotFoundError {
        entity: "ActionKind",
        id: kind.to_string(),
    }
    .into()
}
