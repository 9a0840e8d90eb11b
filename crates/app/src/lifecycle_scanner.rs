//! Lifecycle scanner — periodically detects events whose transition is due.
//!
//! The scanner never changes an event itself. It inspects snapshots of the
//! upcoming and active buckets and publishes a request for each due
//! transition; the [`TransitionHandler`](crate::transition_handler::TransitionHandler)
//! applies them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use gather_domain::event::EventStatus;
use gather_domain::notification::Notification;
use gather_domain::time::{Timestamp, now};

use crate::ports::{EventRepository, NotificationPublisher};
use crate::services::event_manager::EventManager;

/// Periodic scan of the live buckets.
pub struct LifecycleScanner<R, P, Q> {
    manager: Arc<EventManager<R, P>>,
    publisher: Q,
}

impl<R, P, Q> LifecycleScanner<R, P, Q>
where
    R: EventRepository + Send + Sync + 'static,
    P: NotificationPublisher + Send + Sync + 'static,
    Q: NotificationPublisher + Send + Sync + 'static,
{
    pub fn new(manager: Arc<EventManager<R, P>>, publisher: Q) -> Self {
        Self { manager, publisher }
    }

    /// Publish a start request for every upcoming event that started before
    /// `now`, then an end request for every active event due to end.
    ///
    /// Returns what was published.
    pub async fn scan_at(&self, now: Timestamp) -> Vec<Notification> {
        let upcoming = self.manager.get_events(Some(EventStatus::Upcoming)).await;
        let active = self.manager.get_events(Some(EventStatus::Active)).await;

        let starts = upcoming
            .into_iter()
            .filter(|e| e.has_started(now))
            .map(|event| Notification::StartRequested { event });
        let ends = active
            .into_iter()
            .filter(|e| e.has_ended(now))
            .map(|event| Notification::EndRequested { event });
        let due: Vec<Notification> = starts.chain(ends).collect();

        for notification in &due {
            tracing::debug!(%notification, "transition due");
            if let Err(err) = self.publisher.publish(notification.clone()).await {
                tracing::warn!(error = %err, %notification, "failed to publish transition request");
            }
        }
        due
    }

    /// Scan against the current time.
    pub async fn tick(&self) -> Vec<Notification> {
        self.scan_at(now()).await
    }

    /// Scan every `period` on a background task until the task is aborted.
    ///
    /// Slow scans delay the next tick rather than bunching ticks up.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let due = self.tick().await;
                if !due.is_empty() {
                    tracing::debug!(count = due.len(), "scan published transition requests");
                }
            }
        })
    }
}
