//! Notification port — publish/subscribe for lifecycle notifications.

use std::future::Future;

use gather_domain::error::GatherError;
use gather_domain::notification::Notification;

/// Publishes lifecycle notifications to interested subscribers.
pub trait NotificationPublisher {
    /// Publish a notification to all current subscribers.
    fn publish(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), GatherError>> + Send;
}

impl<T: NotificationPublisher + Send + Sync> NotificationPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        (**self).publish(notification)
    }
}
