//! Rows for profiles, articles, taxonomy, revisions, and comments.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::{RowConversionError, count_from_column};
use crate::domain::{
    Article, ArticleId, ArticleRevision, Category, CategoryId, Comment, CommentId, ImageUrl,
    Profile, ProfileId, ProfileStatistics, RevisionId, RevisionSnapshot, Slug, Tag, TagId, UserId,
    Username, VersionNumber,
};
use crate::outbound::persistence::schema::{
    article_revisions, article_tags, articles, categories, comments, profile_favorites,
    profile_follows, profile_statistics, profiles, tags,
};

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Combine with the owning account's username, selected by join.
    pub(crate) fn into_profile(self, username: &str) -> Result<Profile, RowConversionError> {
        Ok(Profile {
            id: ProfileId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            username: Username::new(username)
                .map_err(|err| RowConversionError::new("users", err))?,
            bio: self.bio,
            image: ImageUrl::new(&self.image)
                .map_err(|err| RowConversionError::new("profiles", err))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating profiles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: &'a str,
    pub image: &'a str,
}

/// Changeset for editable profile fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
pub(crate) struct ProfileChanges<'a> {
    pub bio: &'a str,
    pub image: &'a str,
}

/// A directed follow edge.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = profile_follows)]
pub(crate) struct FollowRow {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
}

/// A favourite link.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = profile_favorites)]
pub(crate) struct FavoriteRow {
    pub profile_id: Uuid,
    pub article_id: Uuid,
}

/// Row struct for the profile_statistics table, used for reads and writes.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = profile_statistics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StatisticsRow {
    pub profile_id: Uuid,
    pub total_articles: i64,
    pub total_comments: i64,
    pub total_followers: i64,
    pub total_following: i64,
    pub total_article_views: i64,
    pub total_likes_received: i64,
    pub last_updated: DateTime<Utc>,
}

impl StatisticsRow {
    /// All-zero totals stamped with `now`.
    pub(crate) const fn empty(profile_id: Uuid, now: DateTime<Utc>) -> Self {
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

impl TryFrom<StatisticsRow> for ProfileStatistics {
    type Error = RowConversionError;

    fn try_from(row: StatisticsRow) -> Result<Self, Self::Error> {
        let count = |value| count_from_column("profile_statistics", value);
        Ok(Self {
            profile_id: ProfileId::from_uuid(row.profile_id),
            total_articles: count(row.total_articles)?,
            total_comments: count(row.total_comments)?,
            total_followers: count(row.total_followers)?,
            total_following: count(row.total_following)?,
            total_article_views: count(row.total_article_views)?,
            total_likes_received: count(row.total_likes_received)?,
            last_updated: row.last_updated,
        })
    }
}

/// Row struct for reading from the categories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating categories.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub parent_id: Option<Uuid>,
    pub icon: &'a str,
    pub sort_order: i32,
    pub is_active: bool,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RowConversionError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            slug: Slug::new(row.slug).map_err(|err| RowConversionError::new("categories", err))?,
            description: row.description,
            icon: row.icon,
            sort_order: row.sort_order,
            parent: row.parent_id.map(CategoryId::from_uuid),
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

/// Row struct for reading from the tags table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub tag: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating tags.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tags)]
pub(crate) struct NewTagRow<'a> {
    pub id: Uuid,
    pub tag: &'a str,
    pub slug: &'a str,
}

impl TryFrom<TagRow> for Tag {
    type Error = RowConversionError;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TagId::from_uuid(row.id),
            name: row.tag,
            slug: Slug::new(row.slug).map_err(|err| RowConversionError::new("tags", err))?,
            created_at: row.created_at,
        })
    }
}

/// Row struct for reading from the articles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub view_count: i64,
    pub is_published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating articles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = articles)]
pub(crate) struct NewArticleRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub is_published: bool,
    pub featured: bool,
}

impl TryFrom<ArticleRow> for Article {
    type Error = RowConversionError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ArticleId::from_uuid(row.id),
            slug: Slug::new(row.slug).map_err(|err| RowConversionError::new("articles", err))?,
            title: row.title,
            description: row.description,
            body: row.body,
            author: ProfileId::from_uuid(row.author_id),
            category: row.category_id.map(CategoryId::from_uuid),
            view_count: count_from_column("articles", row.view_count)?,
            is_published: row.is_published,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Article to tag link.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = article_tags)]
pub(crate) struct ArticleTagRow {
    pub article_id: Uuid,
    pub tag_id: Uuid,
}

/// Row struct for reading from the article_revisions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = article_revisions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RevisionRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub title: String,
    pub description: String,
    pub body: String,
    pub edited_by: Option<Uuid>,
    pub revision_note: String,
    pub version_number: i32,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending revisions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = article_revisions)]
pub(crate) struct NewRevisionRow<'a> {
    pub id: Uuid,
    pub article_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub edited_by: Option<Uuid>,
    pub revision_note: &'a str,
    pub version_number: i32,
}

impl TryFrom<RevisionRow> for ArticleRevision {
    type Error = RowConversionError;

    fn try_from(row: RevisionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RevisionId::from_uuid(row.id),
            article: ArticleId::from_uuid(row.article_id),
            version: VersionNumber::try_from(row.version_number)
                .map_err(|err| RowConversionError::new("article_revisions", err))?,
            snapshot: RevisionSnapshot {
                title: row.title,
                description: row.description,
                body: row.body,
            },
            edited_by: row.edited_by.map(ProfileId::from_uuid),
            note: row.revision_note,
            created_at: row.created_at,
        })
    }
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for posting comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: &'a str,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            article: ArticleId::from_uuid(row.article_id),
            author: ProfileId::from_uuid(row.author_id),
            parent: row.parent_id.map(CommentId::from_uuid),
            body: row.body,
            is_edited: row.is_edited,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
