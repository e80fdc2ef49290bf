//! Fixture record types.
//!
//! These types mirror the catalogue JSON and are independent of backend
//! domain types. The backend converts them into validated domain values at
//! the point of use.

use serde::{Deserialize, Serialize};

/// A demo account together with its profile bio.
///
/// # Example
///
/// ```
/// use example_data::UserSeed;
///
/// let user = UserSeed {
///     username: "ada".to_owned(),
///     email: "ada@example.com".to_owned(),
///     password: "correct-horse".to_owned(),
///     bio: "Analyst".to_owned(),
/// };
///
/// assert_eq!(user.username, "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSeed {
    /// Unique username.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Plain-text password, hashed by the backend before storage.
    pub password: String,
    /// Profile biography.
    #[serde(default)]
    pub bio: String,
}

/// One snapshot in an article's revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSeed {
    /// Version number, starting at 1.
    pub version: u32,
    /// Title at this revision.
    pub title: String,
    /// Description at this revision.
    pub description: String,
    /// Body at this revision.
    pub body: String,
    /// Username of the editor.
    pub edited_by: String,
    /// Free-form note describing the change.
    #[serde(default)]
    pub note: String,
}

/// A demo article with its taxonomy and revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSeed {
    /// Unique slug.
    pub slug: String,
    /// Current title.
    pub title: String,
    /// Current description.
    pub description: String,
    /// Current body.
    pub body: String,
    /// Username of the author.
    pub author: String,
    /// Category name, if any.
    #[serde(default)]
    pub category: Option<String>,
    /// Tag names.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the article is published.
    #[serde(default = "default_published")]
    pub is_published: bool,
    /// Whether the article is featured.
    #[serde(default)]
    pub featured: bool,
    /// Revision history, oldest first.
    #[serde(default)]
    pub revisions: Vec<RevisionSeed>,
}

const fn default_published() -> bool {
    true
}

/// A comment and its replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSeed {
    /// Username of the author.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// Replies, in posting order.
    #[serde(default)]
    pub replies: Vec<CommentSeed>,
}

/// A top-level comment attached to an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSeed {
    /// Slug of the article being discussed.
    pub article: String,
    /// The root comment.
    #[serde(flatten)]
    pub root: CommentSeed,
}

/// Notification categories understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKindSeed {
    /// Someone followed the recipient.
    Follow,
    /// Someone commented on the recipient's article.
    Comment,
    /// Someone liked the recipient's article.
    Like,
    /// Someone mentioned the recipient.
    Mention,
    /// Someone rated the recipient's article.
    Rating,
    /// Someone replied to the recipient's comment.
    Reply,
}

/// A notification delivered to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSeed {
    /// Username of the recipient.
    pub recipient: String,
    /// Notification category.
    pub kind: NotificationKindSeed,
    /// Message text.
    pub message: String,
    /// Username of the acting user, if any.
    #[serde(default)]
    pub actor: Option<String>,
    /// Relative link into the application.
    #[serde(default)]
    pub link: String,
    /// Whether the notification starts out read.
    #[serde(default)]
    pub is_read: bool,
}

/// A directed follow edge between two users' profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowSeed {
    /// Username doing the following.
    pub follower: String,
    /// Username being followed.
    pub followed: String,
}
