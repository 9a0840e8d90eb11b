//! Event — a time-bounded activity tracked through its lifecycle.
//!
//! Events start [`EventStatus::Upcoming`], become [`EventStatus::Active`]
//! once their start time passes, and finish [`EventStatus::Ended`] once
//! their end time (if any) passes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GatherError, ValidationError};
use crate::id::{ActorId, EventId};
use crate::time::Timestamp;

/// Free-form, event-specific settings.
pub type EventOptions = serde_json::Map<String, serde_json::Value>;

/// Lifecycle status of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Active,
    Ended,
}

impl EventStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Upcoming, Self::Active, Self::Ended];

    /// Whether events in this status are kept in the live index.
    #[must_use]
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Ended)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a status string that is not a known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "active" => Ok(Self::Active),
            "ended" => Ok(Self::Ended),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A time-bounded activity with entrants and optional automations.
///
/// The identifier never changes and the entrant list never holds the same
/// actor twice. Status is only moved through the event manager; copies
/// handed out to callers are snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: EventId,
    name: String,
    description: String,
    owner: ActorId,
    status: EventStatus,
    start_time: Timestamp,
    end_time: Option<Timestamp>,
    location: Option<serde_json::Value>,
    entrants: Vec<ActorId>,
    options: EventOptions,
}

impl Event {
    /// Create a builder for constructing an [`Event`].
    #[must_use]
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    #[must_use]
    pub fn status(&self) -> EventStatus {
        self.status
    }

    #[must_use]
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// End of the event, `None` when it has no fixed end.
    #[must_use]
    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    #[must_use]
    pub fn location(&self) -> Option<&serde_json::Value> {
        self.location.as_ref()
    }

    /// Entrants in the order they joined.
    #[must_use]
    pub fn entrants(&self) -> &[ActorId] {
        &self.entrants
    }

    #[must_use]
    pub fn options(&self) -> &EventOptions {
        &self.options
    }

    /// Whether the start time lies strictly before `now`.
    #[must_use]
    pub fn has_started(&self, now: Timestamp) -> bool {
        self.start_time < now
    }

    /// Whether the event is due to end: no fixed end, or an end strictly before `now`.
    #[must_use]
    pub fn has_ended(&self, now: Timestamp) -> bool {
        self.end_time.is_none_or(|end| end < now)
    }

    /// Overwrite the status and return the previous one.
    ///
    /// Only the event manager should call this, paired with persistence.
    pub fn set_status(&mut self, status: EventStatus) -> EventStatus {
        std::mem::replace(&mut self.status, status)
    }

    /// Append `actor` unless already present. Returns `true` when appended.
    pub fn add_entrant(&mut self, actor: ActorId) -> bool {
        if self.entrants.contains(&actor) {
            return false;
        }
        self.entrants.push(actor);
        true
    }

    /// Remove `actor`. Returns `true` when it was present.
    pub fn remove_entrant(&mut self, actor: ActorId) -> bool {
        let before = self.entrants.len();
        self.entrants.retain(|a| *a != actor);
        self.entrants.len() != before
    }

    /// Set an option, returning the previous value.
    pub fn set_option(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.options.insert(key.into(), value)
    }

    /// Remove an option, returning the previous value.
    pub fn remove_option(&mut self, key: &str) -> Option<serde_json::Value> {
        self.options.remove(key)
    }
}

/// Step-by-step builder for [`Event`].
///
/// A fresh id is assigned unless one is given and the status defaults to
/// [`EventStatus::Upcoming`]. Setting `id`, `status`, `entrants` or
/// `options` explicitly is meant for rehydrating stored rows.
#[derive(Debug, Default)]
pub struct EventBuilder {
    id: Option<EventId>,
    name: Option<String>,
    description: Option<String>,
    owner: Option<ActorId>,
    status: Option<EventStatus>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    location: Option<serde_json::Value>,
    entrants: Vec<ActorId>,
    options: EventOptions,
}

impl EventBuilder {
    #[must_use]
    pub fn id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn status(mut self, status: EventStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn start_time(mut self, start_time: Timestamp) -> Self {
        self.start_time = Some(start_time);
        self
    }

    #[must_use]
    pub fn end_time(mut self, end_time: Timestamp) -> Self {
        self.end_time = Some(end_time);
        self
    }

    #[must_use]
    pub fn location(mut self, location: serde_json::Value) -> Self {
        self.location = Some(location);
        self
    }

    /// Seed the entrant list. Duplicates are dropped, first occurrence wins.
    #[must_use]
    pub fn entrants(mut self, entrants: impl IntoIterator<Item = ActorId>) -> Self {
        for actor in entrants {
            if !self.entrants.contains(&actor) {
                self.entrants.push(actor);
            }
        }
        self
    }

    #[must_use]
    pub fn options(mut self, options: EventOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether every required field has been provided.
    #[must_use]
    pub fn can_build(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
            && self.owner.is_some()
            && self.start_time.is_some()
    }

    /// Consume the builder, validate, and return an [`Event`].
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::Validation`] when the name is missing or
    /// empty, or when the owner or start time is missing.
    pub fn build(self) -> Result<Event, GatherError> {
        let name = self.name.unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let owner = self.owner.ok_or(ValidationError::MissingField("owner"))?;
        let start_time = self
            .start_time
            .ok_or(ValidationError::MissingField("start_time"))?;

        Ok(Event {
            id: self.id.unwrap_or_default(),
            name,
            description: self.description.unwrap_or_default(),
            owner,
            status: self.status.unwrap_or(EventStatus::Upcoming),
            start_time,
            end_time: self.end_time,
            location: self.location,
            entrants: self.entrants,
            options: self.options,
        })
    }
}
