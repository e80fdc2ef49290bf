//! Rows for users, sessions, activity logs, and preferences.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::RowConversionError;
use crate::domain::{
    ActivityLogEntry, EmailAddress, PasswordHash, SessionId, User, UserId, UserPreference,
    UserSession, Username,
};
use crate::outbound::persistence::schema::{
    user_activity_logs, user_preferences, user_sessions, users,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl TryFrom<UserRow> for User {
    type Error = RowConversionError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: Username::new(&row.username)
                .map_err(|err| RowConversionError::new("users", err))?,
            email: EmailAddress::new(&row.email)
                .map_err(|err| RowConversionError::new("users", err))?,
            password: PasswordHash::from_stored(row.password_hash),
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row struct for reading from the user_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_token: String,
    pub ip_address: String,
    pub user_agent: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Insertable struct for opening a session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_token: &'a str,
    pub ip_address: &'a str,
    pub user_agent: &'a str,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionRow> for UserSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: SessionId::from_uuid(row.id),
            user: UserId::from_uuid(row.user_id),
            token: row.session_token,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            is_active: row.is_active,
            created_at: row.created_at,
            last_activity: row.last_activity,
            expires_at: row.expires_at,
        }
    }
}

/// Row struct for reading from the user_activity_logs table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_activity_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ActivityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending to the activity log.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_activity_logs)]
pub(crate) struct NewActivityRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: &'a str,
    pub description: &'a str,
    pub ip_address: Option<&'a str>,
    pub metadata: &'a serde_json::Value,
}

impl TryFrom<ActivityRow> for ActivityLogEntry {
    type Error = RowConversionError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            user: UserId::from_uuid(row.user_id),
            kind: row
                .activity_type
                .parse()
                .map_err(|err| RowConversionError::new("user_activity_logs", err))?,
            description: row.description,
            ip_address: row.ip_address,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

/// Row struct for the user_preferences table, used for reads and writes.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PreferenceRow {
    pub user_id: Uuid,
    pub email_on_new_follower: bool,
    pub email_on_comment: bool,
    pub email_on_mention: bool,
    pub email_newsletter: bool,
    pub theme: String,
    pub language: String,
    pub articles_per_page: i32,
    pub show_email: bool,
    pub show_reading_list: bool,
    pub allow_indexing: bool,
}

impl From<&UserPreference> for PreferenceRow {
    fn from(prefs: &UserPreference) -> Self {
        Self {
            user_id: *prefs.user.as_uuid(),
            email_on_new_follower: prefs.email_on_new_follower,
            email_on_comment: prefs.email_on_comment,
            email_on_mention: prefs.email_on_mention,
            email_newsletter: prefs.email_newsletter,
            theme: prefs.theme.as_str().to_owned(),
            language: prefs.language.clone(),
            articles_per_page: i32::from(prefs.articles_per_page),
            show_email: prefs.show_email,
            show_reading_list: prefs.show_reading_list,
            allow_indexing: prefs.allow_indexing,
        }
    }
}

impl TryFrom<PreferenceRow> for UserPreference {
    type Error = RowConversionError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user: UserId::from_uuid(row.user_id),
            email_on_new_follower: row.email_on_new_follower,
            email_on_comment: row.email_on_comment,
            email_on_mention: row.email_on_mention,
            email_newsletter: row.email_newsletter,
            theme: row
                .theme
                .parse()
                .map_err(|err| RowConversionError::new("user_preferences", err))?,
            language: row.language,
            articles_per_page: u16::try_from(row.articles_per_page)
                .map_err(|err| RowConversionError::new("user_preferences", err))?,
            show_email: row.show_email,
            show_reading_list: row.show_reading_list,
            allow_indexing: row.allow_indexing,
        })
    }
}
