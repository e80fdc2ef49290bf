//! Port abstraction for append-only article revision history.

use async_trait::async_trait;

use crate::domain::{
    ArticleId, ArticleRevision, Insertion, NewRevision, ProfileId, RevisionSnapshot,
    VersionNumber,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by revision repository adapters.
    pub enum RevisionRepositoryError {
        /// The version is already taken, typically by a concurrent append.
        DuplicateVersion { article: ArticleId, version: u32 } =>
            "article {article} already has revision {version}",
        /// The article does not exist.
        ArticleNotFound { id: ArticleId } => "article {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "revision repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "revision repository query failed: {message}",
    }
}

/// Revision storage. Revisions are never updated or deleted individually.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevisionRepository: Send + Sync {
    /// Store a snapshot as the article's next version.
    ///
    /// The version is one more than the current maximum, allocated in the
    /// same transaction as the insert.
    async fn append(
        &self,
        article: ArticleId,
        snapshot: &RevisionSnapshot,
        edited_by: Option<ProfileId>,
        note: &str,
    ) -> Result<ArticleRevision, RevisionRepositoryError>;

    /// Return the revision at `revision.version`, inserting it when absent.
    async fn get_or_create(
        &self,
        revision: &NewRevision,
    ) -> Result<Insertion<ArticleRevision>, RevisionRepositoryError>;

    /// Full history, newest first.
    async fn list(&self, article: ArticleId)
    -> Result<Vec<ArticleRevision>, RevisionRepositoryError>;

    /// Fetch one version.
    async fn find(
        &self,
        article: ArticleId,
        version: VersionNumber,
    ) -> Result<Option<ArticleRevision>, RevisionRepositoryError>;

    /// Highest version, if any.
    async fn latest(
        &self,
        article: ArticleId,
    ) -> Result<Option<ArticleRevision>, RevisionRepositoryError>;
}
