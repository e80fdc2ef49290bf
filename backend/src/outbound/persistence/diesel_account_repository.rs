//! PostgreSQL-backed `AccountRepository`: sessions, activity logs, and
//! preferences.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{
    ActivityLogEntry, NewActivity, NewSession, SessionId, UserId, UserPreference, UserSession,
};

use super::diesel_helpers::{StoreFailure, classify, convert_rows, log_unmapped_reference};
use super::models::{ActivityRow, NewActivityRow, NewSessionRow, PreferenceRow, SessionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_activity_logs, user_preferences, user_sessions};

const SESSION_TOKEN_KEY: &str = "user_sessions_session_token_key";
const SESSION_USER_FKEY: &str = "user_sessions_user_id_fkey";
const ACTIVITY_USER_FKEY: &str = "user_activity_logs_user_id_fkey";
const PREFERENCE_USER_FKEY: &str = "user_preferences_user_id_fkey";

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure, user: UserId) -> AccountRepositoryError {
    if failure.violates(SESSION_TOKEN_KEY) {
        return AccountRepositoryError::duplicate_token();
    }
    if failure.violates(SESSION_USER_FKEY)
        || failure.violates(ACTIVITY_USER_FKEY)
        || failure.violates(PREFERENCE_USER_FKEY)
    {
        return AccountRepositoryError::user_not_found(user);
    }
    log_unmapped_reference(&failure);
    failure.into_port(
        AccountRepositoryError::connection,
        AccountRepositoryError::query,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    classify(error).into_port(
        AccountRepositoryError::connection,
        AccountRepositoryError::query,
    )
}

fn query_error(error: impl ToString) -> AccountRepositoryError {
    AccountRepositoryError::query(error.to_string())
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn open_session(
        &self,
        session: &NewSession,
    ) -> Result<UserSession, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: SessionRow = diesel::insert_into(user_sessions::table)
            .values(&NewSessionRow {
                id: Uuid::new_v4(),
                user_id: *session.user.as_uuid(),
                session_token: &session.token,
                ip_address: &session.ip_address,
                user_agent: &session.user_agent,
                expires_at: session.expires_at,
            })
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), session.user))?;
        Ok(UserSession::from(row))
    }

    async fn touch_session(&self, id: SessionId) -> Result<UserSession, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SessionRow> = diesel::update(user_sessions::table.find(*id.as_uuid()))
            .set(user_sessions::last_activity.eq(Utc::now()))
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserSession::from)
            .ok_or_else(|| AccountRepositoryError::session_not_found(id))
    }

    async fn close_session(&self, id: SessionId) -> Result<UserSession, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SessionRow> = diesel::update(user_sessions::table.find(*id.as_uuid()))
            .set(user_sessions::is_active.eq(false))
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserSession::from)
            .ok_or_else(|| AccountRepositoryError::session_not_found(id))
    }

    async fn active_sessions(
        &self,
        user: UserId,
    ) -> Result<Vec<UserSession>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SessionRow> = user_sessions::table
            .filter(user_sessions::user_id.eq(*user.as_uuid()))
            .filter(user_sessions::is_active.eq(true))
            .order(user_sessions::last_activity.desc())
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(UserSession::from).collect())
    }

    async fn record_activity(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityLogEntry, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: ActivityRow = diesel::insert_into(user_activity_logs::table)
            .values(&NewActivityRow {
                id: Uuid::new_v4(),
                user_id: *activity.user.as_uuid(),
                activity_type: activity.kind.as_str(),
                description: &activity.description,
                ip_address: activity.ip_address.as_deref(),
                metadata: &activity.metadata,
            })
            .returning(ActivityRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), activity.user))?;
        ActivityLogEntry::try_from(row).map_err(query_error)
    }

    async fn recent_activity(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<ActivityLogEntry>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ActivityRow> = user_activity_logs::table
            .filter(user_activity_logs::user_id.eq(*user.as_uuid()))
            .order((
                user_activity_logs::created_at.desc(),
                user_activity_logs::id.desc(),
            ))
            .limit(i64::from(limit))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, AccountRepositoryError::query)
    }

    async fn preferences(&self, user: UserId) -> Result<UserPreference, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(user_preferences::table)
            .values(&PreferenceRow::from(&UserPreference::defaults_for(user)))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), user))?;

        let row: PreferenceRow = user_preferences::table
            .find(*user.as_uuid())
            .select(PreferenceRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        UserPreference::try_from(row).map_err(query_error)
    }

    async fn save_preferences(
        &self,
        preferences: &UserPreference,
    ) -> Result<UserPreference, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: PreferenceRow = diesel::insert_into(user_preferences::table)
            .values(&PreferenceRow::from(preferences))
            .on_conflict(user_preferences::user_id)
            .do_update()
            .set((
                user_preferences::email_on_new_follower
                    .eq(excluded(user_preferences::email_on_new_follower)),
                user_preferences::email_on_comment.eq(excluded(user_preferences::email_on_comment)),
                user_preferences::email_on_mention.eq(excluded(user_preferences::email_on_mention)),
                user_preferences::email_newsletter.eq(excluded(user_preferences::email_newsletter)),
                user_preferences::theme.eq(excluded(user_preferences::theme)),
                user_preferences::language.eq(excluded(user_preferences::language)),
                user_preferences::articles_per_page
                    .eq(excluded(user_preferences::articles_per_page)),
                user_preferences::show_email.eq(excluded(user_preferences::show_email)),
                user_preferences::show_reading_list
                    .eq(excluded(user_preferences::show_reading_list)),
                user_preferences::allow_indexing.eq(excluded(user_preferences::allow_indexing)),
            ))
            .returning(PreferenceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err), preferences.user))?;
        UserPreference::try_from(row).map_err(query_error)
    }
}
