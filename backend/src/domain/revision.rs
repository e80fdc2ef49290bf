//! Append-only article revision history.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{ArticleId, ProfileId, RevisionId};

/// Raised when a version number is zero, negative, or overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("revision version must be a positive integer, got {value}")]
pub struct InvalidVersionNumber {
    /// Rejected value.
    pub value: i64,
}

/// Positive, per-article revision counter.
///
/// # Examples
///
/// ```
/// use conduit_backend::domain::VersionNumber;
///
/// let first = VersionNumber::first();
/// assert_eq!(first.get(), 1);
/// assert_eq!(first.next().expect("no overflow").get(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber(u32);

impl VersionNumber {
    /// The first revision of an article.
    pub const fn first() -> Self {
        Self(1)
    }

    /// Validate a version number.
    pub const fn new(value: u32) -> Result<Self, InvalidVersionNumber> {
        if value == 0 {
            return Err(InvalidVersionNumber { value: 0 });
        }
        Ok(Self(value))
    }

    /// The version following this one.
    pub fn next(self) -> Result<Self, InvalidVersionNumber> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(InvalidVersionNumber {
                value: i64::from(self.0) + 1,
            })
    }

    /// Numeric value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i32> for VersionNumber {
    type Error = InvalidVersionNumber;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| InvalidVersionNumber {
                value: i64::from(value),
            })
            .and_then(Self::new)
    }
}

impl TryFrom<VersionNumber> for i32 {
    type Error = InvalidVersionNumber;

    fn try_from(value: VersionNumber) -> Result<Self, Self::Error> {
        Self::try_from(value.0).map_err(|_| InvalidVersionNumber {
            value: i64::from(value.0),
        })
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Article content captured at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionSnapshot {
    pub title: String,
    pub description: String,
    pub body: String,
}

impl RevisionSnapshot {
    /// Capture a snapshot.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            body: body.into(),
        }
    }
}

/// Stored revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRevision {
    pub id: RevisionId,
    pub article: ArticleId,
    pub version: VersionNumber,
    pub snapshot: RevisionSnapshot,
    /// `None` once the editing profile has been deleted.
    pub edited_by: Option<ProfileId>,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// A revision with an explicit version number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRevision {
    pub article: ArticleId,
    pub version: VersionNumber,
    pub snapshot: RevisionSnapshot,
    pub edited_by: Option<ProfileId>,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn non_positive_versions_are_rejected(#[case] raw: i32) {
        assert_eq!(
            VersionNumber::try_from(raw),
            Err(InvalidVersionNumber {
                value: i64::from(raw)
            })
        );
    }

    #[test]
    fn versions_order_numerically() {
        let first = VersionNumber::first();
        let third = VersionNumber::new(3).expect("positive");
        assert!(first < third);
    }

    #[test]
    fn next_detects_overflow() {
        let last = VersionNumber::new(u32::MAX).expect("positive");
        assert!(last.next().is_err());
    }

    #[test]
    fn versions_beyond_column_range_do_not_convert() {
        let big = VersionNumber::new(u32::MAX).expect("positive");
        assert!(i32::try_from(big).is_err());
        assert_eq!(i32::try_from(VersionNumber::first()), Ok(1));
    }

    #[test]
    fn display_prefixes_v() {
        assert_eq!(VersionNumber::first().to_string(), "v1");
    }
}
