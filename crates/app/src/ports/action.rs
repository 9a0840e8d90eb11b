//! Action port — the effect carried out for a registered action kind.
//!
//! Handlers live outside the core (see `gather-adapter-console`) and are
//! looked up by kind through the [`ActionRegistry`](crate::action_registry::ActionRegistry),
//! so the trait is object-safe.

use async_trait::async_trait;

use gather_domain::automation::ActionInstance;
use gather_domain::event::Event;
use gather_domain::id::ActorId;

/// What a handler can see about the event it acts on.
#[derive(Debug, Clone)]
pub struct ActionContext {
    event: Event,
}

impl ActionContext {
    #[must_use]
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Actors that joined the event.
    #[must_use]
    pub fn entrants(&self) -> &[ActorId] {
        self.event.entrants()
    }

    #[must_use]
    pub fn location(&self) -> Option<&serde_json::Value> {
        self.event.location()
    }
}

/// Executes one configured action.
///
/// Failures are reported to the executor, which logs them and moves on to
/// the next step.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn execute(&self, action: &ActionInstance, ctx: &ActionContext) -> anyhow::Result<()>;
}
