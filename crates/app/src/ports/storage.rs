//! Storage ports — persistence for events and their automation documents.

use std::future::Future;
use std::sync::Arc;

use gather_domain::automation::Slot;
use gather_domain::error::GatherError;
use gather_domain::event::{Event, EventOptions, EventStatus};
use gather_domain::id::{ActorId, EventId};

/// Repository for persisting and querying [`Event`] rows.
pub trait EventRepository {
    /// Insert a new event row.
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, GatherError>> + Send;

    /// Get an event by its unique identifier.
    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, GatherError>> + Send;

    /// All events currently stored with `status`.
    fn find_by_status(
        &self,
        status: EventStatus,
    ) -> impl Future<Output = Result<Vec<Event>, GatherError>> + Send;

    /// Overwrite the stored status of an event.
    fn update_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> impl Future<Output = Result<(), GatherError>> + Send;

    /// Overwrite the stored entrant list of an event.
    fn update_entrants(
        &self,
        id: EventId,
        entrants: Vec<ActorId>,
    ) -> impl Future<Output = Result<(), GatherError>> + Send;

    /// Overwrite the stored options of an event.
    fn update_options(
        &self,
        id: EventId,
        options: EventOptions,
    ) -> impl Future<Output = Result<(), GatherError>> + Send;

    /// Delete an event and its automations. Returns `false` when no row existed.
    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, GatherError>> + Send;
}

/// Stored automation documents of one event.
///
/// A missing row and a row holding `None` for a slot are different states:
/// the first means the event never had automations authored, the second
/// that the slot is empty or was cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationRow {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl AutomationRow {
    /// Raw document stored for `slot`.
    #[must_use]
    pub fn slot(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Start => self.start.as_deref(),
            Slot::End => self.end.as_deref(),
        }
    }
}

/// Repository for the per-slot JSON automation documents of events.
pub trait AutomationRepository {
    /// Create an empty row for `event_id` unless one already exists.
    fn ensure(&self, event_id: EventId) -> impl Future<Output = Result<(), GatherError>> + Send;

    /// Read both slot documents of `event_id`.
    fn get(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<AutomationRow>, GatherError>> + Send;

    /// Overwrite one slot; `None` clears it.
    ///
    /// Fails with [`GatherError::NotFound`] when the row does not exist.
    fn put(
        &self,
        event_id: EventId,
        slot: Slot,
        document: Option<String>,
    ) -> impl Future<Output = Result<(), GatherError>> + Send;
}

impl<T: EventRepository + Send + Sync> EventRepository for Arc<T> {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, GatherError>> + Send {
        (**self).create(event)
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, GatherError>> + Send {
        (**self).get_by_id(id)
    }

    fn find_by_status(
        &self,
        status: EventStatus,
    ) -> impl Future<Output = Result<Vec<Event>, GatherError>> + Send {
        (**self).find_by_status(status)
    }

    fn update_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        (**self).update_status(id, status)
    }

    fn update_entrants(
        &self,
        id: EventId,
        entrants: Vec<ActorId>,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        (**self).update_entrants(id, entrants)
    }

    fn update_options(
        &self,
        id: EventId,
        options: EventOptions,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        (**self).update_options(id, options)
    }

    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, GatherError>> + Send {
        (**self).delete(id)
    }
}

impl<T: AutomationRepository + Send + Sync> AutomationRepository for Arc<T> {
    fn ensure(&self, event_id: EventId) -> impl Future<Output = Result<(), GatherError>> + Send {
        (**self).ensure(event_id)
    }

    fn get(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<AutomationRow>, GatherError>> + Send {
        (**self).get(event_id)
    }

    fn put(
        &self,
        event_id: EventId,
        slot: Slot,
        document: Option<String>,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        (**self).put(event_id, slot, document)
    }
}
