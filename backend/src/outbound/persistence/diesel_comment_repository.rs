//! PostgreSQL-backed `CommentRepository`.
//!
//! Replies reference their parent through `comments.parent_id` with
//! `ON DELETE CASCADE`, so deleting any comment removes its whole subtree.
//! The same-article rule for replies is checked in the insert transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{
    ArticleId, Comment, CommentId, Insertion, NewComment, validate_comment_body,
};

use super::diesel_helpers::{StoreFailure, TxError, classify};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::comments;

const PARENT_FKEY: &str = "comments_parent_id_fkey";

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    CommentRepositoryError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure) -> CommentRepositoryError {
    match failure {
        StoreFailure::ForeignKeyViolation { message, .. } => {
            CommentRepositoryError::missing_reference(message)
        }
        other => other.into_port(
            CommentRepositoryError::connection,
            CommentRepositoryError::query,
        ),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_failure(classify(error))
}

fn map_insert_error(error: diesel::result::Error, comment: &NewComment) -> CommentRepositoryError {
    let failure = classify(error);
    match comment.parent {
        Some(parent) if failure.violates(PARENT_FKEY) => {
            CommentRepositoryError::parent_not_found(parent)
        }
        _ => map_failure(failure),
    }
}

/// Verify that the parent exists and belongs to the same article.
async fn check_parent(
    conn: &mut AsyncPgConnection,
    comment: &NewComment,
) -> Result<(), TxError<CommentRepositoryError>> {
    let Some(parent) = comment.parent else {
        return Ok(());
    };
    let parent_article: Option<Uuid> = comments::table
        .find(*parent.as_uuid())
        .select(comments::article_id)
        .first(conn)
        .await
        .optional()?;
    match parent_article {
        None => Err(TxError::Port(CommentRepositoryError::parent_not_found(
            parent,
        ))),
        Some(article) if article != *comment.article.as_uuid() => Err(TxError::Port(
            CommentRepositoryError::parent_mismatch(parent, comment.article),
        )),
        Some(_) => Ok(()),
    }
}

async fn insert_comment(
    conn: &mut AsyncPgConnection,
    comment: &NewComment,
) -> Result<CommentRow, TxError<CommentRepositoryError>> {
    diesel::insert_into(comments::table)
        .values(&NewCommentRow {
            id: Uuid::new_v4(),
            article_id: *comment.article.as_uuid(),
            author_id: *comment.author.as_uuid(),
            parent_id: comment.parent.map(|id| *id.as_uuid()),
            body: &comment.body,
        })
        .returning(CommentRow::as_returning())
        .get_result(conn)
        .await
        .map_err(|err| TxError::Port(map_insert_error(err, comment)))
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction::<_, TxError<CommentRepositoryError>, _>(|conn| {
                async move {
                    check_parent(conn, comment).await?;
                    insert_comment(conn, comment).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.resolve(map_diesel_error))?;
        Ok(Comment::from(row))
    }

    async fn get_or_create(
        &self,
        comment: &NewComment,
    ) -> Result<Insertion<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction::<_, TxError<CommentRepositoryError>, _>(|conn| {
                async move {
                    let existing: Option<CommentRow> = comments::table
                        .filter(comments::article_id.eq(*comment.article.as_uuid()))
                        .filter(comments::author_id.eq(*comment.author.as_uuid()))
                        .filter(
                            comments::parent_id
                                .is_not_distinct_from(comment.parent.map(|id| *id.as_uuid())),
                        )
                        .filter(comments::body.eq(&comment.body))
                        .order((comments::created_at.asc(), comments::id.asc()))
                        .select(CommentRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    if let Some(row) = existing {
                        return Ok(Insertion::Existing(row));
                    }
                    check_parent(conn, comment).await?;
                    insert_comment(conn, comment).await.map(Insertion::Created)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.resolve(map_diesel_error))?;
        Ok(outcome.map(Comment::from))
    }

    async fn edit(&self, id: CommentId, body: &str) -> Result<Comment, CommentRepositoryError> {
        validate_comment_body(body)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CommentRow> = diesel::update(comments::table.find(*id.as_uuid()))
            .set((comments::body.eq(body), comments::is_edited.eq(true)))
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Comment::from)
            .ok_or_else(|| CommentRepositoryError::not_found(id))
    }

    async fn list_for_article(
        &self,
        article: ArticleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::article_id.eq(*article.as_uuid()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(comments::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
