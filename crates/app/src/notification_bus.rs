//! Notification bus — fans scanner requests and status changes out to
//! every subscriber over a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use gather_domain::error::GatherError;
use gather_domain::notification::Notification;

use crate::ports::NotificationPublisher;

/// Broadcast-backed [`NotificationPublisher`].
///
/// Subscribers only see notifications sent after they subscribed. A
/// notification sent while nobody listens is dropped; for transition
/// requests that means the next scan has to ask again.
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// `capacity` notifications are buffered per subscriber before it lags.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationPublisher for NotificationBus {
    fn publish(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        let is_request = notification.requested_transition().is_some();
        match self.sender.send(notification) {
            Ok(receivers) => tracing::trace!(receivers, "notification sent"),
            Err(broadcast::error::SendError(dropped)) if is_request => {
                tracing::warn!(notification = %dropped, "transition request dropped, no subscriber");
            }
            Err(broadcast::error::SendError(dropped)) => {
                tracing::debug!(notification = %dropped, "notification dropped, no subscriber");
            }
        }
        async { Ok(()) }
    }
}
