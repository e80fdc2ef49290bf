//! URL slugs shared by articles, tags, and categories.
//!
//! Slugs are non-empty identifiers composed of lowercase ASCII letters,
//! digits, underscores, and single inner hyphens.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum slug length accepted by any slug column.
pub const SLUG_MAX: usize = 255;

/// Validation errors for [`Slug`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugValidationError {
    /// The slug, or the text it was derived from, produced nothing usable.
    #[error("slug must not be empty")]
    Empty,
    /// The slug exceeds [`SLUG_MAX`] characters.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The slug contains characters outside `[a-z0-9_-]` or stray hyphens.
    #[error(
        "slug may only contain lowercase letters, digits, underscores, and single inner hyphens"
    )]
    InvalidCharacters,
}

/// A validated URL slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate an existing slug.
    pub fn new(value: impl Into<String>) -> Result<Self, SlugValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SlugValidationError::Empty);
        }
        if value.len() > SLUG_MAX {
            return Err(SlugValidationError::TooLong { max: SLUG_MAX });
        }
        if !is_valid_slug(&value) {
            return Err(SlugValidationError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Derive a slug from display text.
    ///
    /// ASCII letters, digits, and underscores are kept (letters lowercased).
    /// Runs of whitespace and hyphens collapse to one hyphen. Other
    /// characters are dropped, then leading and trailing hyphens and
    /// underscores are stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// use conduit_backend::domain::Slug;
    ///
    /// let slug = Slug::slugify("Creative Writing").expect("slug");
    /// assert_eq!(slug.as_ref(), "creative-writing");
    /// ```
    pub fn slugify(text: &str) -> Result<Self, SlugValidationError> {
        let mut slug = String::with_capacity(text.len());
        let mut separator_pending = false;

        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                if separator_pending && !slug.is_empty() {
                    slug.push('-');
                }
                separator_pending = false;
                slug.push(ch.to_ascii_lowercase());
            } else if ch.is_whitespace() || ch == '-' {
                separator_pending = true;
            }
        }

        Self::new(slug.trim_matches(['-', '_']))
    }
}

/// Return `true` when `value` is a valid domain slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    let has_allowed_chars = value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-');

    has_allowed_chars
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
