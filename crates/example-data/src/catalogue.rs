//! Seed catalogue loading and lookups.
//!
//! A catalogue bundles every fixture record needed to populate a fresh
//! database. It is loaded from JSON and validated eagerly, so a catalogue
//! value always has resolvable cross references.

use std::fs;

use camino::Utf8Path;
use serde::Deserialize;

use crate::error::CatalogueError;
use crate::seed::{ArticleSeed, CommentThreadSeed, FollowSeed, NotificationSeed, UserSeed};
use crate::validation::validate_references;

/// Current supported catalogue version.
const SUPPORTED_VERSION: u32 = 1;

const BUILTIN_JSON: &str = include_str!("../fixtures/collaboration.json");

/// A validated collection of fixture records.
///
/// # Example
///
/// ```
/// use example_data::SeedCatalogue;
///
/// let json = r#"{
///     "version": 1,
///     "users": [{"username": "ada", "email": "ada@example.com", "password": "pw"}],
///     "follows": [{"follower": "ada", "followed": "ada"}]
/// }"#;
///
/// let catalogue = SeedCatalogue::from_json(json).expect("valid catalogue");
/// assert_eq!(catalogue.follows().len(), 1);
/// assert!(catalogue.articles().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCatalogue {
    version: u32,
    users: Vec<UserSeed>,
    categories: Vec<String>,
    tags: Vec<String>,
    articles: Vec<ArticleSeed>,
    comments: Vec<CommentThreadSeed>,
    notifications: Vec<NotificationSeed>,
    follows: Vec<FollowSeed>,
}

impl SeedCatalogue {
    /// Returns the catalogue embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the embedded JSON fails validation,
    /// which indicates a packaging defect.
    pub fn builtin() -> Result<Self, CatalogueError> {
        Self::from_json(BUILTIN_JSON)
    }

    /// Parses and validates a catalogue from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if:
    /// - The JSON is malformed or a notification kind is unknown
    /// - The version is unsupported
    /// - Any record references an undefined user, article, category, or tag
    /// - Usernames or article slugs repeat
    /// - Revision numbers are out of sequence
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let raw: RawSeedCatalogue =
            serde_json::from_str(json).map_err(|e| CatalogueError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a catalogue from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Utf8Path) -> Result<Self, CatalogueError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogueError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawSeedCatalogue) -> Result<Self, CatalogueError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(CatalogueError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        let catalogue = Self {
            version: raw.version,
            users: raw.users,
            categories: raw.categories,
            tags: raw.tags,
            articles: raw.articles,
            comments: raw.comments,
            notifications: raw.notifications,
            follows: raw.follows,
        };
        validate_references(&catalogue)?;
        Ok(catalogue)
    }

    /// Returns the catalogue version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the demo accounts.
    #[must_use]
    pub fn users(&self) -> &[UserSeed] {
        &self.users
    }

    /// Returns category names in display order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns tag names.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the articles.
    #[must_use]
    pub fn articles(&self) -> &[ArticleSeed] {
        &self.articles
    }

    /// Returns the comment threads.
    #[must_use]
    pub fn comments(&self) -> &[CommentThreadSeed] {
        &self.comments
    }

    /// Returns the notifications.
    #[must_use]
    pub fn notifications(&self) -> &[NotificationSeed] {
        &self.notifications
    }

    /// Returns the follow edges.
    #[must_use]
    pub fn follows(&self) -> &[FollowSeed] {
        &self.follows
    }

    /// Finds a user by username.
    #[must_use]
    pub fn user(&self, username: &str) -> Option<&UserSeed> {
        self.users.iter().find(|user| user.username == username)
    }

    /// Finds an article by slug.
    #[must_use]
    pub fn article(&self, slug: &str) -> Option<&ArticleSeed> {
        self.articles.iter().find(|article| article.slug == slug)
    }

    /// Counts every comment in every thread, replies included.
    #[must_use]
    pub fn comment_count(&self) -> usize {
        fn count(replies: &[crate::seed::CommentSeed]) -> usize {
            replies
                .iter()
                .map(|reply| 1 + count(&reply.replies))
                .sum()
        }

        self.comments
            .iter()
            .map(|thread| 1 + count(&thread.root.replies))
            .sum()
    }
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedCatalogue {
    version: u32,
    users: Vec<UserSeed>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    articles: Vec<ArticleSeed>,
    #[serde(default)]
    comments: Vec<CommentThreadSeed>,
    #[serde(default)]
    notifications: Vec<NotificationSeed>,
    #[serde(default)]
    follows: Vec<FollowSeed>,
}
