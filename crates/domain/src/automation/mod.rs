//! Automation — an ordered action sequence bound to an event transition.
//!
//! Each event owns up to two automations, one per [`Slot`]. An automation
//! runs its [`ActionInstance`]s strictly in order, pausing
//! [`Automation::delay`] between consecutive steps.

mod action;
mod builder;
mod schema;

pub use action::{ActionInstance, ActionKind, ActionOptions};
pub use builder::ActionBuilder;
pub use schema::{FieldSpec, FieldType, OptionValue, OptionsSchema, RESERVED_KEY};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which transition of an event an automation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// Runs when the event becomes active.
    Start,
    /// Runs when the event ends.
    End,
}

impl Slot {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered list of actions with a single inter-step delay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Automation {
    #[serde(rename = "automationDelayTime")]
    pub delay_seconds: u32,
    pub actions: Vec<ActionInstance>,
}

impl Automation {
    /// Delay applied when none is configured.
    pub const DEFAULT_DELAY_SECONDS: u32 = 1;

    #[must_use]
    pub fn new(actions: Vec<ActionInstance>, delay_seconds: u32) -> Self {
        Self {
            delay_seconds,
            actions,
        }
    }

    /// Pause between two consecutive actions.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.delay_seconds))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Encode as the persisted JSON document.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only happens for non-finite floats.
    pub fn to_document(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Raw persisted form of an [`Automation`], before each action is decoded
/// against the registry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutomationDocument {
    #[serde(rename = "automationDelayTime", default = "default_delay")]
    pub delay_seconds: u32,
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}

fn default_delay() -> u32 {
    Automation::DEFAULT_DELAY_SECONDS
}

impl AutomationDocument {
    /// Parse a stored document. Blank input and a JSON `null` mean the slot
    /// holds no automation.
    ///
    /// # Errors
    ///
    /// Returns the parser error when the envelope itself is malformed.
    pub fn parse(raw: &str) -> serde_json::Result<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(Some)
    }
}

/// Outcome of loading an automation whose actions are decoded one by one.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAutomation {
    /// Actions that decoded cleanly, in stored order.
    pub automation: Automation,
    /// Raw documents of the actions that could not be decoded.
    pub failed: Vec<String>,
}

impl LoadedAutomation {
    /// Whether some stored actions were dropped while loading.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}
