//! PostgreSQL-backed `NotificationRepository`.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Insertion, NewNotification, Notification, NotificationId, UserId};

use super::diesel_helpers::{StoreFailure, classify, convert_rows};
use super::models::{NewNotificationRow, NotificationRow, count_from_column};
use super::pool::{DbPool, PoolError};
use super::schema::user_notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    NotificationRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    match classify(error) {
        StoreFailure::ForeignKeyViolation { message, .. } => {
            NotificationRepositoryError::missing_reference(message)
        }
        other => other.into_port(
            NotificationRepositoryError::connection,
            NotificationRepositoryError::query,
        ),
    }
}

fn to_notification(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    Notification::try_from(row).map_err(|err| NotificationRepositoryError::query(err.to_string()))
}

fn new_row(notification: &NewNotification) -> NewNotificationRow<'_> {
    NewNotificationRow {
        id: Uuid::new_v4(),
        recipient_id: *notification.recipient.as_uuid(),
        actor_id: notification.actor.map(|id| *id.as_uuid()),
        notification_type: notification.kind.as_str(),
        message: &notification.message,
        link: &notification.link,
        is_read: notification.is_read,
        read_at: notification.is_read.then(Utc::now),
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn notify(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(user_notifications::table)
            .values(&new_row(notification))
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_notification(row)
    }

    async fn get_or_create(
        &self,
        notification: &NewNotification,
    ) -> Result<Insertion<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let existing: Option<NotificationRow> = user_notifications::table
                        .filter(
                            user_notifications::recipient_id
                                .eq(*notification.recipient.as_uuid()),
                        )
                        .filter(
                            user_notifications::notification_type.eq(notification.kind.as_str()),
                        )
                        .filter(user_notifications::message.eq(&notification.message))
                        .filter(
                            user_notifications::actor_id
                                .is_not_distinct_from(notification.actor.map(|id| *id.as_uuid())),
                        )
                        .order(user_notifications::created_at.asc())
                        .select(NotificationRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    if let Some(row) = existing {
                        return Ok(Insertion::Existing(row));
                    }
                    diesel::insert_into(user_notifications::table)
                        .values(&new_row(notification))
                        .returning(NotificationRow::as_returning())
                        .get_result(conn)
                        .await
                        .map(Insertion::Created)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        match outcome {
            Insertion::Created(row) => to_notification(row).map(Insertion::Created),
            Insertion::Existing(row) => to_notification(row).map(Insertion::Existing),
        }
    }

    async fn list_for(
        &self,
        recipient: UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NotificationRow> = user_notifications::table
            .filter(user_notifications::recipient_id.eq(*recipient.as_uuid()))
            .order((
                user_notifications::created_at.desc(),
                user_notifications::id.desc(),
            ))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, NotificationRepositoryError::query)
    }

    async fn unread_count(&self, recipient: UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = user_notifications::table
            .filter(user_notifications::recipient_id.eq(*recipient.as_uuid()))
            .filter(user_notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_from_column("user_notifications", count)
            .map_err(|err| NotificationRepositoryError::query(err.to_string()))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            user_notifications::table
                .find(*id.as_uuid())
                .filter(user_notifications::is_read.eq(false)),
        )
        .set((
            user_notifications::is_read.eq(true),
            user_notifications::read_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let row: Option<NotificationRow> = user_notifications::table
            .find(*id.as_uuid())
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let row = row.ok_or_else(|| NotificationRepositoryError::not_found(id))?;
        to_notification(row)
    }

    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changed = diesel::update(
            user_notifications::table
                .filter(user_notifications::recipient_id.eq(*recipient.as_uuid()))
                .filter(user_notifications::is_read.eq(false)),
        )
        .set((
            user_notifications::is_read.eq(true),
            user_notifications::read_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        u64::try_from(changed).map_err(|err| NotificationRepositoryError::query(err.to_string()))
    }
}
