//! Port abstraction for threaded comments.

use async_trait::async_trait;

use crate::domain::{
    ArticleId, Comment, CommentId, CommentValidationError, Insertion, NewComment,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        /// The parent comment does not exist.
        ParentNotFound { id: CommentId } => "parent comment {id} not found",
        /// The parent comment belongs to another article.
        ParentMismatch { parent: CommentId, article: ArticleId } =>
            "comment {parent} does not belong to article {article}",
        /// No comment has the identifier.
        NotFound { id: CommentId } => "comment {id} not found",
        /// An edit would leave the comment without text.
        EmptyBody => "comment body must not be empty",
        /// The article or author does not exist.
        MissingReference { message: String } => "comment references missing data: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
    }
}

impl From<CommentValidationError> for CommentRepositoryError {
    fn from(error: CommentValidationError) -> Self {
        match error {
            CommentValidationError::EmptyBody => Self::empty_body(),
        }
    }
}

/// Comment storage. Deleting a comment deletes its replies recursively.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Post a comment.
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Return the comment with the same article, author, parent, and body,
    /// inserting it when absent.
    async fn get_or_create(
        &self,
        comment: &NewComment,
    ) -> Result<Insertion<Comment>, CommentRepositoryError>;

    /// Replace the body and mark the comment edited. Blank bodies fail with
    /// `EmptyBody`.
    async fn edit(&self, id: CommentId, body: &str) -> Result<Comment, CommentRepositoryError>;

    /// Every comment on the article, oldest first.
    async fn list_for_article(
        &self,
        article: ArticleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Delete a comment and its replies. Returns `false` when nothing was deleted.
    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError>;
}
