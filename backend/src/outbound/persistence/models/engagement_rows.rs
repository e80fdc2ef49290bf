//! Rows for ratings, bookmark collections, and the reading list.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::RowConversionError;
use crate::domain::{
    ArticleId, ArticleRating, BookmarkCollection, CollectionId, HexColour, ProfileId, RatingId,
    ReadingListEntry, ReadingListEntryId, ReadingPriority, Score,
};
use crate::outbound::persistence::schema::{
    article_ratings, bookmark_collection_articles, bookmark_collections, reading_list_entries,
};

/// Row struct for reading from the article_ratings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = article_ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub profile_id: Uuid,
    pub score: i16,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for rating an article.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = article_ratings)]
pub(crate) struct NewRatingRow<'a> {
    pub id: Uuid,
    pub article_id: Uuid,
    pub profile_id: Uuid,
    pub score: i16,
    pub review: &'a str,
}

impl TryFrom<RatingRow> for ArticleRating {
    type Error = RowConversionError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RatingId::from_uuid(row.id),
            article: ArticleId::from_uuid(row.article_id),
            profile: ProfileId::from_uuid(row.profile_id),
            score: Score::try_from(row.score)
                .map_err(|err| RowConversionError::new("article_ratings", err))?,
            review: row.review,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row struct for reading from the bookmark_collections table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookmark_collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CollectionRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating collections.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookmark_collections)]
pub(crate) struct NewCollectionRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub is_public: bool,
    pub color: &'a str,
}

impl TryFrom<CollectionRow> for BookmarkCollection {
    type Error = RowConversionError;

    fn try_from(row: CollectionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CollectionId::from_uuid(row.id),
            owner: ProfileId::from_uuid(row.owner_id),
            name: row.name,
            description: row.description,
            is_public: row.is_public,
            colour: HexColour::new(&row.color)
                .map_err(|err| RowConversionError::new("bookmark_collections", err))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Article filed in a collection; `added_at` defaults to `now()`.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = bookmark_collection_articles)]
pub(crate) struct CollectionArticleRow {
    pub collection_id: Uuid,
    pub article_id: Uuid,
}

/// Row struct for reading from the reading_list_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reading_list_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReadingListRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub article_id: Uuid,
    pub priority: i16,
    pub notes: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for queueing articles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reading_list_entries)]
pub(crate) struct NewReadingListRow<'a> {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub article_id: Uuid,
    pub priority: i16,
    pub notes: &'a str,
}

impl TryFrom<ReadingListRow> for ReadingListEntry {
    type Error = RowConversionError;

    fn try_from(row: ReadingListRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReadingListEntryId::from_uuid(row.id),
            profile: ProfileId::from_uuid(row.profile_id),
            article: ArticleId::from_uuid(row.article_id),
            priority: ReadingPriority::try_from(row.priority)
                .map_err(|err| RowConversionError::new("reading_list_entries", err))?,
            notes: row.notes,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}
