//! Automation service — durable start/end automations of events.
//!
//! Loading is tolerant of partial corruption: every stored action is
//! decoded on its own, and the ones that fail are skipped and reported
//! rather than failing the whole automation.

use std::sync::Arc;

use gather_domain::automation::{Automation, AutomationDocument, LoadedAutomation, Slot};
use gather_domain::error::{GatherError, ValidationError};
use gather_domain::id::EventId;

use crate::action_registry::ActionRegistry;
use crate::automation_builder::AutomationBuilder;
use crate::ports::AutomationRepository;

/// Application service reading and writing per-slot automation documents.
pub struct AutomationService<R> {
    repo: R,
    registry: Arc<ActionRegistry>,
}

impl<R: AutomationRepository> AutomationService<R> {
    /// Create a new service backed by the given repository, decoding
    /// actions against `registry`.
    pub fn new(repo: R, registry: Arc<ActionRegistry>) -> Self {
        Self { repo, registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Load the automation stored in `slot` of an event.
    ///
    /// Returns `Ok(None)` when the event has no row or the slot is empty.
    /// Actions that fail to decode are logged and left out of the
    /// automation; their raw documents are listed in
    /// [`LoadedAutomation::failed`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedAction`] when the document
    /// envelope is not valid JSON of the expected shape, or a storage error
    /// from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn load(
        &self,
        event_id: EventId,
        slot: Slot,
    ) -> Result<Option<LoadedAutomation>, GatherError> {
        let Some(row) = self.repo.get(event_id).await? else {
            return Ok(None);
        };
        let Some(raw) = row.slot(slot) else {
            return Ok(None);
        };
        let Some(document) = AutomationDocument::parse(raw).map_err(|err| {
            tracing::warn!(error = %err, "automation document is malformed");
            ValidationError::MalformedAction(err.to_string())
        })?
        else {
            return Ok(None);
        };

        tracing::debug!(found = document.actions.len(), "loading automation");
        let mut actions = Vec::with_capacity(document.actions.len());
        let mut failed = Vec::new();
        for entry in &document.actions {
            match self.registry.decode_action(entry) {
                Ok(action) => actions.push(action),
                Err(err) => {
                    tracing::warn!(error = %err, action = %entry, "failed to load action");
                    failed.push(entry.to_string());
                }
            }
        }

        tracing::info!(
            loaded = actions.len(),
            failed = failed.len(),
            "automation loaded"
        );
        Ok(Some(LoadedAutomation {
            automation: Automation::new(actions, document.delay_seconds),
            failed,
        }))
    }

    /// Overwrite the automation in `slot`; `None` clears the slot.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the event has no automation
    /// row yet, or a storage error from the repository.
    #[tracing::instrument(skip(self, automation))]
    pub async fn save(
        &self,
        event_id: EventId,
        slot: Slot,
        automation: Option<&Automation>,
    ) -> Result<(), GatherError> {
        let document = automation
            .map(Automation::to_document)
            .transpose()
            .map_err(|err| GatherError::Storage(Box::new(err)))?;

        if let Err(err) = self.repo.put(event_id, slot, document).await {
            tracing::warn!(error = %err, "failed to save automation");
            return Err(err);
        }
        tracing::info!(
            actions = automation.map_or(0, |a| a.actions.len()),
            "automation saved"
        );
        Ok(())
    }

    /// Start authoring the automation for `slot` of an event.
    ///
    /// Makes sure the event has an automation row before anything is written.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the row cannot be created.
    pub async fn builder(
        &self,
        event_id: EventId,
        slot: Slot,
    ) -> Result<AutomationBuilder<'_, R>, GatherError> {
        self.repo.ensure(event_id).await?;
        Ok(AutomationBuilder::new(self, event_id, slot))
    }
}
