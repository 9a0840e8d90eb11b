//! Transition handler — turns scanner requests into status changes and
//! automation runs.
//!
//! A request is only applied when the event still holds the status the
//! request expects, so a request repeated by consecutive scans is applied
//! once. The automation is started only after the status change has been
//! persisted.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use gather_domain::error::GatherError;
use gather_domain::notification::Notification;

use crate::automation_executor::{AutomationExecutor, ExecutionReport};
use crate::ports::{AutomationRepository, EventRepository, NotificationPublisher};
use crate::services::event_manager::EventManager;

/// Subscriber applying requested transitions.
pub struct TransitionHandler<R, P, A> {
    manager: Arc<EventManager<R, P>>,
    executor: AutomationExecutor<A>,
}

impl<R, P, A> TransitionHandler<R, P, A>
where
    R: EventRepository + Send + Sync + 'static,
    P: NotificationPublisher + Send + Sync + 'static,
    A: AutomationRepository + Send + Sync + 'static,
{
    pub fn new(manager: Arc<EventManager<R, P>>, executor: AutomationExecutor<A>) -> Self {
        Self { manager, executor }
    }

    /// Apply one notification.
    ///
    /// Returns the handle of the started automation run, or `None` when
    /// the notification is not a request or is stale.
    ///
    /// # Errors
    ///
    /// Returns the error of looking up or moving the event; no automation
    /// is started in that case.
    #[tracing::instrument(skip(self), fields(event_id = %notification.event_id()))]
    pub async fn handle(
        &self,
        notification: &Notification,
    ) -> Result<Option<JoinHandle<ExecutionReport>>, GatherError> {
        let Some((expected, target, slot)) = notification.requested_transition() else {
            return Ok(None);
        };

        let current = self.manager.get_event(notification.event_id()).await?;
        if current.status() != expected {
            tracing::debug!(status = %current.status(), "ignoring stale transition request");
            return Ok(None);
        }

        let event = self.manager.change_status(current.id(), target).await?;
        Ok(Some(self.executor.spawn(event, slot)))
    }

    /// Handle notifications from `receiver` until the bus closes.
    pub async fn run(&self, mut receiver: broadcast::Receiver<Notification>) {
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    if let Err(err) = self.handle(&notification).await {
                        tracing::warn!(error = %err, %notification, "failed to apply transition");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "transition handler lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("notification bus closed, transition handler stopped");
    }

    /// Run [`run`](Self::run) on a background task.
    pub fn spawn(self: Arc<Self>, receiver: broadcast::Receiver<Notification>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(receiver).await })
    }
}
