//! Session records, activity logs, and per-user preferences.
//!
//! These are plain records; no token generation or session security is
//! implemented here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ActivityId, SessionId, UnknownVariant, UserId};

/// Recorded user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Login,
    Logout,
    ArticleView,
    ArticleCreate,
    ArticleEdit,
    ArticleDelete,
    ProfileUpdate,
    PasswordChange,
}

impl ActivityKind {
    /// Every kind, in column-check order.
    pub const ALL: [Self; 8] = [
        Self::Login,
        Self::Logout,
        Self::ArticleView,
        Self::ArticleCreate,
        Self::ArticleEdit,
        Self::ArticleDelete,
        Self::ProfileUpdate,
        Self::PasswordChange,
    ];

    /// Stored text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::ArticleView => "article_view",
            Self::ArticleCreate => "article_create",
            Self::ArticleEdit => "article_edit",
            Self::ArticleDelete => "article_delete",
            Self::ProfileUpdate => "profile_update",
            Self::PasswordChange => "password_change",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "activity kind",
                value: s.to_owned(),
            })
    }
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    /// Stored text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            other => Err(UnknownVariant {
                kind: "theme",
                value: other.to_owned(),
            }),
        }
    }
}

/// A login session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: SessionId,
    pub user: UserId,
    pub token: String,
    pub ip_address: String,
    pub user_agent: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Data required to record a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user: UserId,
    pub token: String,
    pub ip_address: String,
    pub user_agent: String,
    pub expires_at: DateTime<Utc>,
}

/// One entry in a user's activity log.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogEntry {
    pub id: ActivityId,
    pub user: UserId,
    pub kind: ActivityKind,
    pub description: String,
    pub ip_address: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Data required to log an action.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user: UserId,
    pub kind: ActivityKind,
    pub description: String,
    pub ip_address: Option<String>,
    pub metadata: Value,
}

impl NewActivity {
    /// An activity without client address or metadata.
    pub fn new(user: UserId, kind: ActivityKind, description: impl Into<String>) -> Self {
        Self {
            user,
            kind,
            description: description.into(),
            ip_address: None,
            metadata: Value::Object(serde_json::Map::new()),
        }
    }
}

/// Per-user settings. [`UserPreference::defaults_for`] matches the column
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    pub user: UserId,
    pub email_on_new_follower: bool,
    pub email_on_comment: bool,
    pub email_on_mention: bool,
    pub email_newsletter: bool,
    pub theme: Theme,
    pub language: String,
    pub articles_per_page: u16,
    pub show_email: bool,
    pub show_reading_list: bool,
    pub allow_indexing: bool,
}

impl UserPreference {
    /// Default settings for `user`.
    pub fn defaults_for(user: UserId) -> Self {
        Self {
            user,
            email_on_new_follower: true,
            email_on_comment: true,
            email_on_mention: true,
            email_newsletter: false,
            theme: Theme::Auto,
            language: "en".to_owned(),
            articles_per_page: 10,
            show_email: false,
            show_reading_list: true,
            allow_indexing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ActivityKind::ArticleView, "article_view")]
    #[case(ActivityKind::PasswordChange, "password_change")]
    fn activity_kinds_use_snake_case(#[case] kind: ActivityKind, #[case] text: &str) {
        assert_eq!(kind.as_str(), text);
        assert_eq!(text.parse::<ActivityKind>(), Ok(kind));
    }

    #[test]
    fn every_activity_kind_round_trips() {
        for kind in ActivityKind::ALL {
            assert_eq!(kind.to_string().parse::<ActivityKind>(), Ok(kind));
        }
    }

    #[test]
    fn preferences_default_to_auto_theme() {
        let prefs = UserPreference::defaults_for(UserId::random());
        assert_eq!(prefs.theme, Theme::Auto);
        assert_eq!(prefs.articles_per_page, 10);
        assert!(!prefs.email_newsletter);
    }

    #[test]
    fn new_activity_has_empty_object_metadata() {
        let activity = NewActivity::new(UserId::random(), ActivityKind::Login, "signed in");
        assert_eq!(activity.metadata, serde_json::json!({}));
    }
}
