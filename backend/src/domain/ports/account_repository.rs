//! Port abstraction for sessions, activity logs, and preferences.

use async_trait::async_trait;

use crate::domain::{
    ActivityLogEntry, NewActivity, NewSession, SessionId, UserId, UserPreference, UserSession,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Another session already uses the token.
        DuplicateToken => "session token is already in use",
        /// No session has the identifier.
        SessionNotFound { id: SessionId } => "session {id} not found",
        /// The account does not exist.
        UserNotFound { id: UserId } => "user {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
    }
}

/// Account bookkeeping records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Record a new active session.
    async fn open_session(&self, session: &NewSession)
    -> Result<UserSession, AccountRepositoryError>;

    /// Stamp `last_activity` with the current time.
    async fn touch_session(&self, id: SessionId) -> Result<UserSession, AccountRepositoryError>;

    /// Deactivate a session.
    async fn close_session(&self, id: SessionId) -> Result<UserSession, AccountRepositoryError>;

    /// Active sessions of the user, most recent activity first.
    async fn active_sessions(
        &self,
        user: UserId,
    ) -> Result<Vec<UserSession>, AccountRepositoryError>;

    /// Append to the activity log.
    async fn record_activity(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityLogEntry, AccountRepositoryError>;

    /// At most `limit` log entries, newest first.
    async fn recent_activity(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<ActivityLogEntry>, AccountRepositoryError>;

    /// Stored preferences, created with defaults when absent.
    async fn preferences(&self, user: UserId) -> Result<UserPreference, AccountRepositoryError>;

    /// Replace the stored preferences.
    async fn save_preferences(
        &self,
        preferences: &UserPreference,
    ) -> Result<UserPreference, AccountRepositoryError>;
}
