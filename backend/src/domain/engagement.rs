//! Ratings, reading lists, and bookmark collections.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{ArticleId, CollectionId, ProfileId, RatingId, ReadingListEntryId};

/// Raised when a score falls outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("score must be between 1 and 5, got {value}")]
pub struct ScoreOutOfRange {
    /// Rejected value.
    pub value: i32,
}

/// Article rating from one to five stars.
///
/// # Examples
///
/// ```
/// use conduit_backend::domain::{Score, ScoreOutOfRange};
///
/// assert_eq!(Score::new(4).map(Score::get), Ok(4));
/// assert_eq!(Score::new(6), Err(ScoreOutOfRange { value: 6 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    /// Validate a score.
    pub fn new(value: i32) -> Result<Self, ScoreOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(ScoreOutOfRange { value })
    }

    /// Numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i16> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(i32::from(value))
    }
}

impl From<Score> for i16 {
    fn from(value: Score) -> Self {
        Self::from(value.0)
    }
}

/// Raised when a reading-list priority falls outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reading priority must be between 1 and 5, got {value}")]
pub struct PriorityOutOfRange {
    /// Rejected value.
    pub value: i32,
}

/// Reading-list priority; higher values are read first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadingPriority(u8);

impl ReadingPriority {
    /// Validate a priority.
    pub fn new(value: i32) -> Result<Self, PriorityOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(PriorityOutOfRange { value })
    }

    /// Numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for ReadingPriority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i16> for ReadingPriority {
    type Error = PriorityOutOfRange;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(i32::from(value))
    }
}

impl From<ReadingPriority> for i16 {
    fn from(value: ReadingPriority) -> Self {
        Self::from(value.0)
    }
}

/// Raised when a colour is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("colour must be '#' followed by six hex digits, got '{value}'")]
pub struct InvalidHexColour {
    /// Rejected text.
    pub value: String,
}

/// `#rrggbb` colour used to tint bookmark collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColour(String);

impl HexColour {
    const DEFAULT: &'static str = "#667eea";

    /// Validate a colour. Hex digits are lowercased.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidHexColour> {
        let raw = value.as_ref();
        let valid = raw.len() == 7
            && raw.starts_with('#')
            && raw.chars().skip(1).all(|ch| ch.is_ascii_hexdigit());
        if !valid {
            return Err(InvalidHexColour {
                value: raw.to_owned(),
            });
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }
}

impl Default for HexColour {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl AsRef<str> for HexColour {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HexColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColour {
    type Err = InvalidHexColour;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// One profile's rating of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRating {
    pub id: RatingId,
    pub article: ArticleId,
    pub profile: ProfileId,
    pub score: Score,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate of all ratings for an article.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub count: u64,
    /// `None` when the article has no ratings.
    pub average: Option<f64>,
}

impl RatingSummary {
    /// Summarise a set of scores.
    pub fn from_scores(scores: impl IntoIterator<Item = Score>) -> Self {
        let (count, total) = scores
            .into_iter()
            .fold((0_u64, 0_u64), |(count, total), score| {
                (count + 1, total + u64::from(score.get()))
            });
        let average = (count > 0).then(|| total as f64 / count as f64);
        Self { count, average }
    }
}

/// An article saved for later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingListEntry {
    pub id: ReadingListEntryId,
    pub profile: ProfileId,
    pub article: ArticleId,
    pub priority: ReadingPriority,
    pub notes: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Data required to queue an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReadingListEntry {
    pub profile: ProfileId,
    pub article: ArticleId,
    pub priority: ReadingPriority,
    pub notes: String,
}

impl NewReadingListEntry {
    /// Queue `article` at the default priority.
    pub fn new(profile: ProfileId, article: ArticleId) -> Self {
        Self {
            profile,
            article,
            priority: ReadingPriority::default(),
            notes: String::new(),
        }
    }

    /// Override the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: ReadingPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Named group of bookmarked articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkCollection {
    pub id: CollectionId,
    pub owner: ProfileId,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub colour: HexColour,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmarkCollection {
    pub owner: ProfileId,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub colour: HexColour,
}

impl NewBookmarkCollection {
    /// A private collection with the default colour.
    pub fn new(owner: ProfileId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            description: String::new(),
            is_public: false,
            colour: HexColour::default(),
        }
    }
}
