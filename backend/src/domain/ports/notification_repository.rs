//! Port abstraction for in-app notifications.

use async_trait::async_trait;

use crate::domain::{Insertion, NewNotification, Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// No notification has the identifier.
        NotFound { id: NotificationId } => "notification {id} not found",
        /// The recipient or actor does not exist.
        MissingReference { message: String } => "notification references missing data: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

/// Notification storage. Delivery is out of scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification.
    async fn notify(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError>;

    /// Return the notification with the same recipient, kind, message, and
    /// actor, inserting it when absent.
    async fn get_or_create(
        &self,
        notification: &NewNotification,
    ) -> Result<Insertion<Notification>, NotificationRepositoryError>;

    /// The recipient's notifications, newest first.
    async fn list_for(
        &self,
        recipient: UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Number of unread notifications.
    async fn unread_count(&self, recipient: UserId) -> Result<u64, NotificationRepositoryError>;

    /// Mark one notification read. Already-read notifications keep their `read_at`.
    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, NotificationRepositoryError>;

    /// Mark every unread notification read and return how many changed.
    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, NotificationRepositoryError>;
}
