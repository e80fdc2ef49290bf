//! PostgreSQL-backed `EngagementRepository`: ratings, the reading list, and
//! bookmark collections.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{EngagementRepository, EngagementRepositoryError};
use crate::domain::{
    Article, ArticleId, ArticleRating, BookmarkCollection, CollectionId, Insertion,
    NewBookmarkCollection, NewReadingListEntry, ProfileId, RatingSummary, ReadingListEntry,
    ReadingListEntryId, Score,
};

use super::diesel_helpers::{StoreFailure, classify, convert_rows, log_unmapped_reference};
use super::models::{
    ArticleRow, CollectionArticleRow, CollectionRow, NewCollectionRow, NewRatingRow,
    NewReadingListRow, RatingRow, ReadingListRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    article_ratings, articles, bookmark_collection_articles, bookmark_collections,
    reading_list_entries,
};

const COLLECTION_FKEY: &str = "bookmark_collection_articles_collection_id_fkey";

/// Diesel-backed implementation of the `EngagementRepository` port.
#[derive(Clone)]
pub struct DieselEngagementRepository {
    pool: DbPool,
}

impl DieselEngagementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EngagementRepositoryError {
    EngagementRepositoryError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure) -> EngagementRepositoryError {
    match failure {
        StoreFailure::ForeignKeyViolation { message, .. } => {
            EngagementRepositoryError::missing_reference(message)
        }
        other => other.into_port(
            EngagementRepositoryError::connection,
            EngagementRepositoryError::query,
        ),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> EngagementRepositoryError {
    map_failure(classify(error))
}

fn query_error(error: impl ToString) -> EngagementRepositoryError {
    EngagementRepositoryError::query(error.to_string())
}

#[async_trait]
impl EngagementRepository for DieselEngagementRepository {
    async fn rate(
        &self,
        article: ArticleId,
        profile: ProfileId,
        score: Score,
        review: &str,
    ) -> Result<ArticleRating, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: RatingRow = diesel::insert_into(article_ratings::table)
            .values(&NewRatingRow {
                id: Uuid::new_v4(),
                article_id: *article.as_uuid(),
                profile_id: *profile.as_uuid(),
                score: i16::from(score),
                review,
            })
            .on_conflict((article_ratings::article_id, article_ratings::profile_id))
            .do_update()
            .set((
                article_ratings::score.eq(excluded(article_ratings::score)),
                article_ratings::review.eq(excluded(article_ratings::review)),
            ))
            .returning(RatingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        ArticleRating::try_from(row).map_err(query_error)
    }

    async fn rating_for(
        &self,
        article: ArticleId,
        profile: ProfileId,
    ) -> Result<Option<ArticleRating>, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RatingRow> = article_ratings::table
            .filter(article_ratings::article_id.eq(*article.as_uuid()))
            .filter(article_ratings::profile_id.eq(*profile.as_uuid()))
            .select(RatingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(ArticleRating::try_from)
            .transpose()
            .map_err(query_error)
    }

    async fn rating_summary(
        &self,
        article: ArticleId,
    ) -> Result<RatingSummary, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let scores: Vec<i16> = article_ratings::table
            .filter(article_ratings::article_id.eq(*article.as_uuid()))
            .select(article_ratings::score)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let scores = scores
            .into_iter()
            .map(Score::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(RatingSummary::from_scores(scores))
    }

    async fn add_to_reading_list(
        &self,
        entry: &NewReadingListEntry,
    ) -> Result<Insertion<ReadingListEntry>, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<ReadingListRow> = diesel::insert_into(reading_list_entries::table)
            .values(&NewReadingListRow {
                id: Uuid::new_v4(),
                profile_id: *entry.profile.as_uuid(),
                article_id: *entry.article.as_uuid(),
                priority: i16::from(entry.priority),
                notes: &entry.notes,
            })
            .on_conflict((
                reading_list_entries::profile_id,
                reading_list_entries::article_id,
            ))
            .do_nothing()
            .returning(ReadingListRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let (created, row) = match inserted {
            Some(row) => (true, row),
            None => {
                let row = reading_list_entries::table
                    .filter(reading_list_entries::profile_id.eq(*entry.profile.as_uuid()))
                    .filter(reading_list_entries::article_id.eq(*entry.article.as_uuid()))
                    .select(ReadingListRow::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                (false, row)
            }
        };
        let entry = ReadingListEntry::try_from(row).map_err(query_error)?;
        Ok(Insertion::from_flag(created, entry))
    }

    async fn mark_read(
        &self,
        entry: ReadingListEntryId,
    ) -> Result<ReadingListEntry, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            reading_list_entries::table
                .find(*entry.as_uuid())
                .filter(reading_list_entries::is_read.eq(false)),
        )
        .set((
            reading_list_entries::is_read.eq(true),
            reading_list_entries::read_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let row: Option<ReadingListRow> = reading_list_entries::table
            .find(*entry.as_uuid())
            .select(ReadingListRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let row = row.ok_or_else(|| EngagementRepositoryError::entry_not_found(entry))?;
        ReadingListEntry::try_from(row).map_err(query_error)
    }

    async fn reading_list(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<ReadingListEntry>, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReadingListRow> = reading_list_entries::table
            .filter(reading_list_entries::profile_id.eq(*profile.as_uuid()))
            .order((
                reading_list_entries::priority.desc(),
                reading_list_entries::created_at.desc(),
            ))
            .select(ReadingListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, EngagementRepositoryError::query)
    }

    async fn remove_from_reading_list(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            reading_list_entries::table
                .filter(reading_list_entries::profile_id.eq(*profile.as_uuid()))
                .filter(reading_list_entries::article_id.eq(*article.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn create_collection(
        &self,
        collection: &NewBookmarkCollection,
    ) -> Result<BookmarkCollection, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: CollectionRow = diesel::insert_into(bookmark_collections::table)
            .values(&NewCollectionRow {
                id: Uuid::new_v4(),
                owner_id: *collection.owner.as_uuid(),
                name: &collection.name,
                description: &collection.description,
                is_public: collection.is_public,
                color: collection.colour.as_ref(),
            })
            .returning(CollectionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        BookmarkCollection::try_from(row).map_err(query_error)
    }

    async fn add_to_collection(
        &self,
        collection: CollectionId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(bookmark_collection_articles::table)
            .values(&CollectionArticleRow {
                collection_id: *collection.as_uuid(),
                article_id: *article.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| {
                let failure = classify(err);
                if failure.violates(COLLECTION_FKEY) {
                    EngagementRepositoryError::collection_not_found(collection)
                } else {
                    log_unmapped_reference(&failure);
                    map_failure(failure)
                }
            })?;
        Ok(inserted > 0)
    }

    async fn remove_from_collection(
        &self,
        collection: CollectionId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            bookmark_collection_articles::table
                .filter(bookmark_collection_articles::collection_id.eq(*collection.as_uuid()))
                .filter(bookmark_collection_articles::article_id.eq(*article.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn collections_for(
        &self,
        owner: ProfileId,
    ) -> Result<Vec<BookmarkCollection>, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CollectionRow> = bookmark_collections::table
            .filter(bookmark_collections::owner_id.eq(*owner.as_uuid()))
            .order(bookmark_collections::name.asc())
            .select(CollectionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, EngagementRepositoryError::query)
    }

    async fn collection_articles(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<Article>, EngagementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ArticleRow> = articles::table
            .inner_join(bookmark_collection_articles::table)
            .filter(bookmark_collection_articles::collection_id.eq(*collection.as_uuid()))
            .order(bookmark_collection_articles::added_at.desc())
            .select(ArticleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, EngagementRepositoryError::query)
    }
}
