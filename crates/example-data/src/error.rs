//! Error types for the example-data crate.
//!
//! Catalogue errors cover file I/O, JSON parsing, and the reference checks
//! run before seeding. They follow the project's error handling conventions
//! with `thiserror`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a seed catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// The catalogue file could not be read.
    #[error("failed to read catalogue file at '{path}': {message}")]
    IoError {
        /// Path to the catalogue file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The catalogue JSON is malformed or missing required fields.
    #[error("invalid catalogue JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The catalogue version is not supported.
    #[error("unsupported catalogue version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the catalogue.
        actual: u32,
    },

    /// Two users share a username.
    #[error("duplicate username '{username}' in catalogue")]
    DuplicateUsername {
        /// The repeated username.
        username: String,
    },

    /// Two articles share a slug.
    #[error("duplicate article slug '{slug}' in catalogue")]
    DuplicateArticleSlug {
        /// The repeated slug.
        slug: String,
    },

    /// A record references a username that the catalogue does not define.
    #[error("{context} references unknown user '{username}'")]
    UnknownUser {
        /// Where the reference was found.
        context: String,
        /// The missing username.
        username: String,
    },

    /// An article references a category the catalogue does not define.
    #[error("article '{slug}' references unknown category '{category}'")]
    UnknownCategory {
        /// Article slug.
        slug: String,
        /// The missing category name.
        category: String,
    },

    /// An article references a tag the catalogue does not define.
    #[error("article '{slug}' references unknown tag '{tag}'")]
    UnknownTag {
        /// Article slug.
        slug: String,
        /// The missing tag.
        tag: String,
    },

    /// A comment thread references an article the catalogue does not define.
    #[error("comment thread references unknown article '{slug}'")]
    UnknownArticle {
        /// The missing article slug.
        slug: String,
    },

    /// Revision versions must start at 1 and increase by one.
    #[error("article '{slug}' has out-of-sequence revision {version} (expected {expected})")]
    RevisionOutOfSequence {
        /// Article slug.
        slug: String,
        /// Version found.
        version: u32,
        /// Version expected at this position.
        expected: u32,
    },
}

/// Error returned when a dataset name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dataset '{name}' (expected one of: users, articles, comments, notifications, relationships)")]
pub struct DatasetParseError {
    /// The rejected name.
    pub name: String,
}
