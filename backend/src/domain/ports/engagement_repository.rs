//! Port abstraction for ratings, reading lists, and bookmark collections.

use async_trait::async_trait;

use crate::domain::{
    Article, ArticleId, ArticleRating, BookmarkCollection, CollectionId, Insertion,
    NewBookmarkCollection, NewReadingListEntry, ProfileId, RatingSummary, ReadingListEntry,
    ReadingListEntryId, Score,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by engagement repository adapters.
    pub enum EngagementRepositoryError {
        /// The reading-list entry does not exist.
        EntryNotFound { id: ReadingListEntryId } => "reading list entry {id} not found",
        /// The bookmark collection does not exist.
        CollectionNotFound { id: CollectionId } => "bookmark collection {id} not found",
        /// A referenced article or profile does not exist.
        MissingReference { message: String } => "engagement references missing data: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "engagement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "engagement repository query failed: {message}",
    }
}

/// Per-profile engagement with articles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Create or replace the profile's rating of the article.
    async fn rate(
        &self,
        article: ArticleId,
        profile: ProfileId,
        score: Score,
        review: &str,
    ) -> Result<ArticleRating, EngagementRepositoryError>;

    /// The profile's rating of the article, if any.
    async fn rating_for(
        &self,
        article: ArticleId,
        profile: ProfileId,
    ) -> Result<Option<ArticleRating>, EngagementRepositoryError>;

    /// Count and mean of every rating on the article.
    async fn rating_summary(
        &self,
        article: ArticleId,
    ) -> Result<RatingSummary, EngagementRepositoryError>;

    /// Queue an article; one entry per profile and article.
    async fn add_to_reading_list(
        &self,
        entry: &NewReadingListEntry,
    ) -> Result<Insertion<ReadingListEntry>, EngagementRepositoryError>;

    /// Mark an entry read, stamping `read_at`.
    async fn mark_read(
        &self,
        entry: ReadingListEntryId,
    ) -> Result<ReadingListEntry, EngagementRepositoryError>;

    /// The profile's queue, highest priority first, then newest first.
    async fn reading_list(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<ReadingListEntry>, EngagementRepositoryError>;

    /// Drop an article from the queue. Returns `false` when it was not queued.
    async fn remove_from_reading_list(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError>;

    /// Create a bookmark collection.
    async fn create_collection(
        &self,
        collection: &NewBookmarkCollection,
    ) -> Result<BookmarkCollection, EngagementRepositoryError>;

    /// Add an article. Returns `true` when it was not already present.
    async fn add_to_collection(
        &self,
        collection: CollectionId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError>;

    /// Remove an article. Returns `false` when it was not present.
    async fn remove_from_collection(
        &self,
        collection: CollectionId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError>;

    /// Collections owned by the profile, ordered by name.
    async fn collections_for(
        &self,
        owner: ProfileId,
    ) -> Result<Vec<BookmarkCollection>, EngagementRepositoryError>;

    /// Articles in the collection, most recently added first.
    async fn collection_articles(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<Article>, EngagementRepositoryError>;
}
