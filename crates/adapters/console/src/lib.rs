//! # gather-adapter-console
//!
//! Demo action kinds that deliver their output to a [`Console`]: the
//! tracing log plus a short in-memory transcript.
//!
//! ## Provided actions
//!
//! | Kind | Options | Behaviour |
//! |------|---------|-----------|
//! | `message_send` | `message: text` | Sends the message to every entrant |
//! | `title_show` | `title: text`, `subtitle: text?` | Shows a title (and subtitle) to every entrant |
//! | `countdown` | `seconds: int?` | Counts down from `seconds` (default 10), one line per second |
//!
//! ## Dependency rule
//!
//! Depends on `gather-app` (port traits) and `gather-domain` only.

mod actions;
mod console;

use std::sync::Arc;

use gather_app::action_registry::ActionRegistry;
use gather_domain::error::GatherError;

pub use actions::{CountdownAction, MessageSendAction, TitleShowAction};
pub use console::{Console, Delivery};

/// Register every console action kind, all writing to `console`.
///
/// # Errors
///
/// Returns [`GatherError::Validation`] if a schema is rejected by the registry.
pub fn register_all(registry: &mut ActionRegistry, console: &Console) -> Result<(), GatherError> {
    registry.register(
        MessageSendAction::KIND,
        MessageSendAction::schema(),
        Arc::new(MessageSendAction::new(console.clone())),
    )?;
    registry.register(
        TitleShowAction::KIND,
        TitleShowAction::schema(),
        Arc::new(TitleShowAction::new(console.clone())),
    )?;
    registry.register(
        CountdownAction::KIND,
        CountdownAction::schema(),
        Arc::new(CountdownAction::new(console.clone())),
    )?;
    Ok(())
}
