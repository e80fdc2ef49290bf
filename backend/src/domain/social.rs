//! Follow requests, achievement badges, and blocking.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    BadgeId, BlockId, FollowRequestId, ProfileBadgeId, ProfileId, ProfileStatistics,
    UnknownVariant,
};

/// Maximum length of a follow request message.
pub const FOLLOW_REQUEST_MESSAGE_MAX: usize = 500;

/// Validation errors for social drafts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocialValidationError {
    /// A profile cannot ask to follow itself.
    #[error("a profile cannot send a follow request to itself")]
    SelfRequest,
    /// A profile cannot block itself.
    #[error("a profile cannot block itself")]
    SelfBlock,
    /// Follow request messages are capped.
    #[error("follow request message must be at most {max} characters")]
    MessageTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Badge names must contain text.
    #[error("badge name must not be empty")]
    EmptyBadgeName,
}

/// Lifecycle of a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FollowRequestStatus {
    /// Stored text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Status after answering a pending request.
    pub const fn from_response(accept: bool) -> Self {
        if accept {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

impl fmt::Display for FollowRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowRequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant {
                kind: "follow request status",
                value: other.to_owned(),
            }),
        }
    }
}

/// Stored follow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowRequest {
    pub id: FollowRequestId,
    pub from: ProfileId,
    pub to: ProfileId,
    pub message: String,
    pub status: FollowRequestStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Data required to ask to follow a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFollowRequest {
    pub from: ProfileId,
    pub to: ProfileId,
    pub message: String,
}

impl NewFollowRequest {
    /// Validate a follow request.
    pub fn new(
        from: ProfileId,
        to: ProfileId,
        message: impl Into<String>,
    ) -> Result<Self, SocialValidationError> {
        if from == to {
            return Err(SocialValidationError::SelfRequest);
        }
        let message = message.into();
        if message.chars().count() > FOLLOW_REQUEST_MESSAGE_MAX {
            return Err(SocialValidationError::MessageTooLong {
                max: FOLLOW_REQUEST_MESSAGE_MAX,
            });
        }
        Ok(Self { from, to, message })
    }
}

/// How hard a badge is to earn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    /// Stored text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl fmt::Display for BadgeRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeRarity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            other => Err(UnknownVariant {
                kind: "badge rarity",
                value: other.to_owned(),
            }),
        }
    }
}

/// Thresholds a profile must reach to earn a badge. Zero means no requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeRequirements {
    pub articles: u32,
    pub followers: u32,
    pub comments: u32,
}

/// Achievement definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirements: BadgeRequirements,
    pub rarity: BadgeRarity,
    pub is_active: bool,
    pub sort_order: i32,
}

impl Badge {
    /// Reports whether `stats` meets every threshold of an active badge.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use conduit_backend::domain::{
    ///     Badge, BadgeId, BadgeRarity, BadgeRequirements, ProfileId, ProfileStatistics,
    /// };
    ///
    /// let badge = Badge {
    ///     id: BadgeId::random(),
    ///     name: "Prolific".into(),
    ///     description: String::new(),
    ///     icon: String::new(),
    ///     requirements: BadgeRequirements { articles: 2, ..Default::default() },
    ///     rarity: BadgeRarity::Rare,
    ///     is_active: true,
    ///     sort_order: 0,
    /// };
    /// let mut stats = ProfileStatistics::empty(ProfileId::random(), Utc::now());
    /// assert!(!badge.is_earned_by(&stats));
    /// stats.total_articles = 2;
    /// assert!(badge.is_earned_by(&stats));
    /// ```
    pub fn is_earned_by(&self, stats: &ProfileStatistics) -> bool {
        let req = self.requirements;
        self.is_active
            && stats.total_articles >= u64::from(req.articles)
            && stats.total_followers >= u64::from(req.followers)
            && stats.total_comments >= u64::from(req.comments)
    }
}

/// Data required to define a badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBadge {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirements: BadgeRequirements,
    pub rarity: BadgeRarity,
    pub is_active: bool,
    pub sort_order: i32,
}

impl NewBadge {
    /// An active common badge with no requirements.
    pub fn new(name: impl Into<String>) -> Result<Self, SocialValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SocialValidationError::EmptyBadgeName);
        }
        Ok(Self {
            name,
            description: String::new(),
            icon: String::new(),
            requirements: BadgeRequirements::default(),
            rarity: BadgeRarity::default(),
            is_active: true,
            sort_order: 0,
        })
    }
}

/// A badge earned by a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBadge {
    pub id: ProfileBadgeId,
    pub profile: ProfileId,
    pub badge: BadgeId,
    pub earned_at: DateTime<Utc>,
    pub is_displayed: bool,
}

/// A block placed by one profile on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBlock {
    pub id: BlockId,
    pub blocker: ProfileId,
    pub blocked: ProfileId,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Data required to block a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub blocker: ProfileId,
    pub blocked: ProfileId,
    pub reason: String,
}

impl NewBlock {
    /// Validate a block.
    pub fn new(
        blocker: ProfileId,
        blocked: ProfileId,
        reason: impl Into<String>,
    ) -> Result<Self, SocialValidationError> {
        if blocker == blocked {
            return Err(SocialValidationError::SelfBlock);
        }
        Ok(Self {
            blocker,
            blocked,
            reason: reason.into(),
        })
    }
}
