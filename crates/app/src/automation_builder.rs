//! Sequence builder — assembles an [`Automation`] for one event slot and
//! persists it.

use gather_domain::automation::{ActionBuilder, ActionInstance, Automation, Slot};
use gather_domain::error::GatherError;
use gather_domain::id::EventId;

use crate::ports::AutomationRepository;
use crate::services::automation_service::AutomationService;

/// Accumulates built actions and the inter-step delay, then saves the
/// result into the owning event's slot.
///
/// Obtained from [`AutomationService::builder`], which has already made
/// sure the event has an automation row.
pub struct AutomationBuilder<'a, R> {
    service: &'a AutomationService<R>,
    event_id: EventId,
    slot: Slot,
    actions: Vec<ActionInstance>,
    delay_seconds: u32,
}

impl<'a, R: AutomationRepository> AutomationBuilder<'a, R> {
    pub(crate) fn new(service: &'a AutomationService<R>, event_id: EventId, slot: Slot) -> Self {
        Self {
            service,
            event_id,
            slot,
            actions: Vec::new(),
            delay_seconds: Automation::DEFAULT_DELAY_SECONDS,
        }
    }

    /// Append an action; actions run in the order they are added.
    #[must_use]
    pub fn action(mut self, action: ActionInstance) -> Self {
        self.actions.push(action);
        self
    }

    /// Seconds to wait between two consecutive actions.
    #[must_use]
    pub fn delay_seconds(mut self, seconds: u32) -> Self {
        self.delay_seconds = seconds;
        self
    }

    #[must_use]
    pub fn actions(&self) -> &[ActionInstance] {
        &self.actions
    }

    #[must_use]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Step builder for a registered action kind.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when `kind` is not registered.
    pub fn action_builder(&self, kind: &str) -> Result<ActionBuilder, GatherError> {
        self.service.registry().action_builder(kind)
    }

    /// Save the automation into the slot, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the automation cannot be written.
    pub async fn build(self) -> Result<Automation, GatherError> {
        let automation = Automation::new(self.actions, self.delay_seconds);
        self.service
            .save(self.event_id, self.slot, Some(&automation))
            .await?;
        Ok(automation)
    }
}
