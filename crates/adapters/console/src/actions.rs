//! Console action handlers.

use std::time::Duration;

use async_trait::async_trait;

use gather_app::ports::{ActionContext, ActionHandler};
use gather_domain::automation::{ActionInstance, FieldSpec, FieldType, OptionsSchema};

use crate::console::Console;

/// Sends a chat message to every entrant.
pub struct MessageSendAction {
    console: Console,
}

impl MessageSendAction {
    pub const KIND: &'static str = "message_send";

    #[must_use]
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    #[must_use]
    pub fn schema() -> OptionsSchema {
        OptionsSchema::new([
            FieldSpec::required("message", FieldType::Text).describe("Message sent to entrants")
        ])
    }
}

#[async_trait]
impl ActionHandler for MessageSendAction {
    async fn execute(&self, action: &ActionInstance, ctx: &ActionContext) -> anyhow::Result<()> {
        let message = action
            .text("message")
            .ok_or_else(|| anyhow::anyhow!("`message` is not set"))?;
        self.console
            .deliver(ctx.event().id(), ctx.entrants(), message);
        Ok(())
    }
}

/// Shows a title, optionally with a subtitle, to every entrant.
pub struct TitleShowAction {
    console: Console,
}

impl TitleShowAction {
    pub const KIND: &'static str = "title_show";

    #[must_use]
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    #[must_use]
    pub fn schema() -> OptionsSchema {
        OptionsSchema::new([
            FieldSpec::required("title", FieldType::Text).describe("Main title line"),
            FieldSpec::nullable("subtitle", FieldType::Text).describe("Smaller line below the title"),
        ])
    }
}

#[async_trait]
impl ActionHandler for TitleShowAction {
    async fn execute(&self, action: &ActionInstance, ctx: &ActionContext) -> anyhow::Result<()> {
        let title = action
            .text("title")
            .ok_or_else(|| anyhow::anyhow!("`title` is not set"))?;
        let text = match action.text("subtitle") {
            Some(subtitle) => format!("{title} | {subtitle}"),
            None => title.to_string(),
        };
        self.console.deliver(ctx.event().id(), ctx.entrants(), &text);
        Ok(())
    }
}

/// Counts down to zero, one line per second, then announces the start.
pub struct CountdownAction {
    console: Console,
}

impl CountdownAction {
    pub const KIND: &'static str = "countdown";

    /// Used when `seconds` is left unset.
    pub const DEFAULT_SECONDS: i64 = 10;

    #[must_use]
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    #[must_use]
    pub fn schema() -> OptionsSchema {
        OptionsSchema::new([FieldSpec::nullable("seconds", FieldType::Int)
            .describe("Seconds to count down from (default 10)")])
    }
}

#[async_trait]
impl ActionHandler for CountdownAction {
    async fn execute(&self, action: &ActionInstance, ctx: &ActionContext) -> anyhow::Result<()> {
        let seconds = action.int("seconds").unwrap_or(Self::DEFAULT_SECONDS);
        if seconds <= 0 {
            anyhow::bail!("countdown needs a positive number of seconds, got {seconds}");
        }

        let event_id = ctx.event().id();
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        for remaining in (1..=seconds).rev() {
            interval.tick().await;
            self.console
                .deliver(event_id, ctx.entrants(), &remaining.to_string());
        }
        interval.tick().await;
        self.console.deliver(event_id, ctx.entrants(), "Go!");
        Ok(())
    }
}
