//! Profiles, the follow graph, and cached profile statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::{ProfileId, UserId, Username};

/// Maximum stored length of a profile image URL.
pub const IMAGE_URL_MAX: usize = 200;

/// Validation errors for [`ImageUrl`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageUrlError {
    /// The value is not an absolute URL.
    #[error("image URL is malformed: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
    },
    /// Only web URLs are accepted.
    #[error("image URL must use http or https, found '{scheme}'")]
    UnsupportedScheme {
        /// Rejected scheme.
        scheme: String,
    },
    /// The URL exceeds the column width.
    #[error("image URL must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Avatar URL, or empty when the profile has no image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Validate an image URL. Empty input yields [`ImageUrl::none`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, ImageUrlError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Ok(Self::none());
        }
        if trimmed.len() > IMAGE_URL_MAX {
            return Err(ImageUrlError::TooLong { max: IMAGE_URL_MAX });
        }
        let parsed = Url::parse(trimmed).map_err(|err| ImageUrlError::Malformed {
            message: err.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self(trimmed.to_owned())),
            other => Err(ImageUrlError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }

    /// The absent image.
    pub const fn none() -> Self {
        Self(String::new())
    }

    /// Reports whether no image is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ImageUrl> for String {
    fn from(value: ImageUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = ImageUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public identity attached one-to-one to a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    /// Denormalised from the owning account for display.
    pub username: Username,
    pub bio: String,
    pub image: ImageUrl,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub bio: String,
    pub image: ImageUrl,
}

/// A directed follow edge: `follower` follows `followed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FollowEdge {
    pub follower: ProfileId,
    pub followed: ProfileId,
}

/// Cached totals describing a profile's activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStatistics {
    pub profile_id: ProfileId,
    pub total_articles: u64,
    pub total_comments: u64,
    pub total_followers: u64,
    pub total_following: u64,
    pub total_article_views: u64,
    pub total_likes_received: u64,
    pub last_updated: DateTime<Utc>,
}

impl ProfileStatistics {
    /// All-zero statistics for a newly created profile.
    pub const fn empty(profile_id: ProfileId, now: DateTime<Utc>) -> Self {
        Self {
            profile_id,
            total_articles: 0,
            total_comments: 0,
            total_followers: 0,
            total_following: 0,
            total_article_views: 0,
            total_likes_received: 0,
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_image_is_none(#[case] input: &str) {
        let image = ImageUrl::new(input).expect("blank is allowed");
        assert!(image.is_empty());
    }

    #[test]
    fn accepts_https_avatar() {
        let url = "https://api.dicebear.com/7.x/avataaars/svg?seed=alice";
        let image = ImageUrl::new(url).expect("valid URL");
        assert_eq!(image.as_ref(), url);
    }

    #[rstest]
    #[case("not a url")]
    #[case("/relative/path.png")]
    fn rejects_malformed_urls(#[case] input: &str) {
        assert!(matches!(
            ImageUrl::new(input),
            Err(ImageUrlError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_non_web_schemes() {
        assert_eq!(
            ImageUrl::new("ftp://example.com/a.png"),
            Err(ImageUrlError::UnsupportedScheme {
                scheme: "ftp".to_owned()
            })
        );
    }

    #[test]
    fn rejects_overlong_urls() {
        let url = format!("https://example.com/{}", "a".repeat(IMAGE_URL_MAX));
        assert_eq!(
            ImageUrl::new(url),
            Err(ImageUrlError::TooLong { max: IMAGE_URL_MAX })
        );
    }
}
