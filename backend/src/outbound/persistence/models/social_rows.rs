//! Rows for notifications, follow requests, badges, and blocks.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::RowConversionError;
use crate::domain::{
    Badge, BadgeId, BadgeRequirements, BlockId, FollowRequest, FollowRequestId, Notification,
    NotificationId, ProfileBadge, ProfileBadgeId, ProfileId, UserBlock, UserId,
};
use crate::outbound::persistence::schema::{
    badges, follow_requests, profile_badges, user_blocks, user_notifications,
};

/// Row struct for reading from the user_notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub notification_type: String,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for notifying a user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub notification_type: &'a str,
    pub message: &'a str,
    pub link: &'a str,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RowConversionError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            recipient: UserId::from_uuid(row.recipient_id),
            actor: row.actor_id.map(UserId::from_uuid),
            kind: row
                .notification_type
                .parse()
                .map_err(|err| RowConversionError::new("user_notifications", err))?,
            message: row.message,
            link: row.link,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

/// Row struct for reading from the follow_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = follow_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FollowRequestRow {
    pub id: Uuid,
    pub from_profile_id: Uuid,
    pub to_profile_id: Uuid,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Insertable struct for sending follow requests; status defaults to pending.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follow_requests)]
pub(crate) struct NewFollowRequestRow<'a> {
    pub id: Uuid,
    pub from_profile_id: Uuid,
    pub to_profile_id: Uuid,
    pub message: &'a str,
}

impl TryFrom<FollowRequestRow> for FollowRequest {
    type Error = RowConversionError;

    fn try_from(row: FollowRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FollowRequestId::from_uuid(row.id),
            from: ProfileId::from_uuid(row.from_profile_id),
            to: ProfileId::from_uuid(row.to_profile_id),
            message: row.message,
            status: row
                .status
                .parse()
                .map_err(|err| RowConversionError::new("follow_requests", err))?,
            created_at: row.created_at,
            responded_at: row.responded_at,
        })
    }
}

/// Row struct for reading from the badges table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = badges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BadgeRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub required_articles: i32,
    pub required_followers: i32,
    pub required_comments: i32,
    pub rarity: String,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Insertable struct for defining badges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = badges)]
pub(crate) struct NewBadgeRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub icon: &'a str,
    pub required_articles: i32,
    pub required_followers: i32,
    pub required_comments: i32,
    pub rarity: &'a str,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Clamp a threshold into the signed column range.
pub(crate) fn threshold_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl TryFrom<BadgeRow> for Badge {
    type Error = RowConversionError;

    fn try_from(row: BadgeRow) -> Result<Self, Self::Error> {
        let threshold =
            |value: i32| u32::try_from(value).map_err(|err| RowConversionError::new("badges", err));
        Ok(Self {
            id: BadgeId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            icon: row.icon,
            requirements: BadgeRequirements {
                articles: threshold(row.required_articles)?,
                followers: threshold(row.required_followers)?,
                comments: threshold(row.required_comments)?,
            },
            rarity: row
                .rarity
                .parse()
                .map_err(|err| RowConversionError::new("badges", err))?,
            is_active: row.is_active,
            sort_order: row.sort_order,
        })
    }
}

/// Row struct for reading from the profile_badges table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profile_badges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileBadgeRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
    pub is_displayed: bool,
}

/// Insertable struct for awarding badges.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = profile_badges)]
pub(crate) struct NewProfileBadgeRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub badge_id: Uuid,
}

impl From<ProfileBadgeRow> for ProfileBadge {
    fn from(row: ProfileBadgeRow) -> Self {
        Self {
            id: ProfileBadgeId::from_uuid(row.id),
            profile: ProfileId::from_uuid(row.profile_id),
            badge: BadgeId::from_uuid(row.badge_id),
            earned_at: row.earned_at,
            is_displayed: row.is_displayed,
        }
    }
}

/// Row struct for reading from the user_blocks table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_blocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BlockRow {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for blocking a profile.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_blocks)]
pub(crate) struct NewBlockRow<'a> {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub reason: &'a str,
}

impl From<BlockRow> for UserBlock {
    fn from(row: BlockRow) -> Self {
        Self {
            id: BlockId::from_uuid(row.id),
            blocker: ProfileId::from_uuid(row.blocker_id),
            blocked: ProfileId::from_uuid(row.blocked_id),
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}
