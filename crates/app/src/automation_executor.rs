//! Automation executor — runs an event's automation step by step.
//!
//! Steps run strictly in order with the automation's delay between two
//! consecutive steps. A failing or panicking step is logged and skipped;
//! the sequence always runs to completion. Each run happens on its own task so a slow
//! sequence never holds up the scanner or the caller.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;

use gather_domain::automation::{Automation, Slot};
use gather_domain::event::Event;

use crate::action_registry::ActionRegistry;
use crate::ports::{ActionContext, AutomationRepository};
use crate::services::automation_service::AutomationService;

/// Outcome counts of one automation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub executed: usize,
    pub failed: usize,
}

impl ExecutionReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.executed + self.failed
    }
}

/// Loads the automation bound to a slot and carries out its actions.
pub struct AutomationExecutor<A> {
    automations: Arc<AutomationService<A>>,
    registry: Arc<ActionRegistry>,
}

impl<A> Clone for AutomationExecutor<A> {
    fn clone(&self) -> Self {
        Self {
            automations: Arc::clone(&self.automations),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<A> AutomationExecutor<A>
where
    A: AutomationRepository + Send + Sync + 'static,
{
    pub fn new(automations: Arc<AutomationService<A>>, registry: Arc<ActionRegistry>) -> Self {
        Self {
            automations,
            registry,
        }
    }

    /// Load and execute the automation in `slot` of `event`.
    ///
    /// An empty slot or a failed load yields an empty report.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id()))]
    pub async fn run(&self, event: Event, slot: Slot) -> ExecutionReport {
        let loaded = match self.automations.load(event.id(), slot).await {
            Ok(Some(loaded)) => loaded,
            Ok(None) => {
                tracing::debug!("no automation configured");
                return ExecutionReport::default();
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load automation");
                return ExecutionReport::default();
            }
        };
        if loaded.is_partial() {
            tracing::warn!(
                skipped = loaded.failed.len(),
                "running automation with undecodable actions left out"
            );
        }
        self.execute(&loaded.automation, ActionContext::new(event))
            .await
    }

    /// Execute every action of `automation` in order, sleeping the
    /// automation's delay between two consecutive actions.
    pub async fn execute(&self, automation: &Automation, ctx: ActionContext) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for (index, action) in automation.actions.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(automation.delay()).await;
            }

            let Some(handler) = self.registry.handler(action.kind().as_str()) else {
                tracing::warn!(kind = %action.kind(), "no handler registered for action");
                report.failed += 1;
                continue;
            };
            match AssertUnwindSafe(handler.execute(action, &ctx))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {
                    tracing::debug!(%action, "action executed");
                    report.executed += 1;
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, %action, "action failed");
                    report.failed += 1;
                }
                Err(panic) => {
                    tracing::warn!(reason = panic_reason(&*panic), %action, "action panicked");
                    report.failed += 1;
                }
            }
        }
        tracing::info!(
            executed = report.executed,
            failed = report.failed,
            "automation finished"
        );
        report
    }

    /// Run the automation on a new task.
    pub fn spawn(&self, event: Event, slot: Slot) -> JoinHandle<ExecutionReport> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(event, slot).await })
    }
}

fn panic_reason(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}
