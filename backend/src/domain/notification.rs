//! In-app notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{NotificationId, UserId};

/// Raised when stored or supplied text names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Enumeration being parsed.
    pub kind: &'static str,
    /// Rejected text.
    pub value: String,
}

/// What caused a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Comment,
    Like,
    Mention,
    Rating,
    Reply,
}

impl NotificationKind {
    /// Every kind, in column-check order.
    pub const ALL: [Self; 6] = [
        Self::Follow,
        Self::Comment,
        Self::Like,
        Self::Mention,
        Self::Rating,
        Self::Reply,
    ];

    /// Stored text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Comment => "comment",
            Self::Like => "like",
            Self::Mention => "mention",
            Self::Rating => "rating",
            Self::Reply => "reply",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "notification kind",
                value: s.to_owned(),
            })
    }
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub actor: Option<UserId>,
    pub kind: NotificationKind,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Data required to notify a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: UserId,
    pub actor: Option<UserId>,
    pub kind: NotificationKind,
    pub message: String,
    pub link: String,
    /// Store as already read, stamping `read_at`.
    pub is_read: bool,
}

impl NewNotification {
    /// An unread notification without an actor or link.
    pub fn new(recipient: UserId, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            recipient,
            actor: None,
            kind,
            message: message.into(),
            link: String::new(),
            is_read: false,
        }
    }

    /// Attribute the notification to `actor`.
    #[must_use]
    pub const fn from_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Point the notification at an in-app link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Create the notification already read.
    #[must_use]
    pub const fn read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }
}
