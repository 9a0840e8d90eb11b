//! Notification — signals emitted to subscribers of the lifecycle.
//!
//! The scanner raises transition *requests*; the event manager announces
//! the *status change* once it has been persisted.

use crate::automation::Slot;
use crate::event::{Event, EventStatus};
use crate::id::EventId;

/// A signal published on the notification bus.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The event's start time has passed while it is still upcoming.
    StartRequested { event: Event },
    /// The event's end time has passed (or it has none) while it is active.
    EndRequested { event: Event },
    /// The event moved from `from` to `to`; `event` reflects the new status.
    StatusChanged {
        event: Event,
        from: EventStatus,
        to: EventStatus,
    },
}

impl Notification {
    /// The event this notification concerns.
    #[must_use]
    pub fn event(&self) -> &Event {
        match self {
            Self::StartRequested { event }
            | Self::EndRequested { event }
            | Self::StatusChanged { event, .. } => event,
        }
    }

    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event().id()
    }

    /// For transition requests: the status the event must currently hold,
    /// the status it moves to, and the automation slot to run.
    #[must_use]
    pub fn requested_transition(&self) -> Option<(EventStatus, EventStatus, Slot)> {
        match self {
            Self::StartRequested { .. } => {
                Some((EventStatus::Upcoming, EventStatus::Active, Slot::Start))
            }
            Self::EndRequested { .. } => Some((EventStatus::Active, EventStatus::Ended, Slot::End)),
            Self::StatusChanged { .. } => None,
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartRequested { event } => write!(f, "start_requested({})", event.id()),
            Self::EndRequested { event } => write!(f, "end_requested({})", event.id()),
            Self::StatusChanged { event, from, to } => {
                write!(f, "status_changed({}, {from} -> {to})", event.id())
            }
        }
    }
}
