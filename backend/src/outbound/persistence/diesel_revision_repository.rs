//! PostgreSQL-backed `RevisionRepository`.
//!
//! `append` allocates `max(version_number) + 1` inside the insert's
//! transaction. Two concurrent appends can still race to the same number;
//! the loser hits `article_revisions_article_version_key` and gets
//! `DuplicateVersion`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RevisionRepository, RevisionRepositoryError};
use crate::domain::{
    ArticleId, ArticleRevision, Insertion, NewRevision, ProfileId, RevisionSnapshot,
    VersionNumber,
};

use super::diesel_helpers::{StoreFailure, TxError, classify, convert_rows};
use super::models::{NewRevisionRow, RevisionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{article_revisions, articles};

const VERSION_KEY: &str = "article_revisions_article_version_key";
const ARTICLE_FKEY: &str = "article_revisions_article_id_fkey";

/// Diesel-backed implementation of the `RevisionRepository` port.
#[derive(Clone)]
pub struct DieselRevisionRepository {
    pool: DbPool,
}

impl DieselRevisionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RevisionRepositoryError {
    RevisionRepositoryError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure) -> RevisionRepositoryError {
    failure.into_port(
        RevisionRepositoryError::connection,
        RevisionRepositoryError::query,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> RevisionRepositoryError {
    map_failure(classify(error))
}

/// Map insert failures for a specific `(article, version)` pair.
fn map_insert_error(
    error: diesel::result::Error,
    article: ArticleId,
    version: VersionNumber,
) -> RevisionRepositoryError {
    let failure = classify(error);
    if failure.violates(VERSION_KEY) {
        RevisionRepositoryError::duplicate_version(article, version.get())
    } else if failure.violates(ARTICLE_FKEY) {
        RevisionRepositoryError::article_not_found(article)
    } else {
        map_failure(failure)
    }
}

fn to_revision(row: RevisionRow) -> Result<ArticleRevision, RevisionRepositoryError> {
    ArticleRevision::try_from(row).map_err(|err| RevisionRepositoryError::query(err.to_string()))
}

fn version_column(version: VersionNumber) -> Result<i32, RevisionRepositoryError> {
    i32::try_from(version).map_err(|err| RevisionRepositoryError::query(err.to_string()))
}

fn new_row<'a>(
    article: ArticleId,
    version: i32,
    snapshot: &'a RevisionSnapshot,
    edited_by: Option<ProfileId>,
    note: &'a str,
) -> NewRevisionRow<'a> {
    NewRevisionRow {
        id: Uuid::new_v4(),
        article_id: *article.as_uuid(),
        title: &snapshot.title,
        description: &snapshot.description,
        body: &snapshot.body,
        edited_by: edited_by.map(|id| *id.as_uuid()),
        revision_note: note,
        version_number: version,
    }
}

#[async_trait]
impl RevisionRepository for DieselRevisionRepository {
    async fn append(
        &self,
        article: ArticleId,
        snapshot: &RevisionSnapshot,
        edited_by: Option<ProfileId>,
        note: &str,
    ) -> Result<ArticleRevision, RevisionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let article_id = *article.as_uuid();
        let row = conn
            .transaction::<_, TxError<RevisionRepositoryError>, _>(|conn| {
                async move {
                    let exists: bool = diesel::select(diesel::dsl::exists(
                        articles::table.filter(articles::id.eq(article_id)),
                    ))
                    .get_result(conn)
                    .await?;
                    if !exists {
                        return Err(TxError::Port(RevisionRepositoryError::article_not_found(
                            article,
                        )));
                    }

                    let current: Option<i32> = article_revisions::table
                        .filter(article_revisions::article_id.eq(article_id))
                        .select(diesel::dsl::max(article_revisions::version_number))
                        .first(conn)
                        .await?;
                    let version = match current {
                        None => VersionNumber::first(),
                        Some(value) => VersionNumber::try_from(value)
                            .and_then(VersionNumber::next)
                            .map_err(|err| {
                                TxError::Port(RevisionRepositoryError::query(err.to_string()))
                            })?,
                    };
                    let column = version_column(version).map_err(TxError::Port)?;

                    diesel::insert_into(article_revisions::table)
                        .values(&new_row(article, column, snapshot, edited_by, note))
                        .returning(RevisionRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| TxError::Port(map_insert_error(err, article, version)))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.resolve(map_diesel_error))?;
        to_revision(row)
    }

    async fn get_or_create(
        &self,
        revision: &NewRevision,
    ) -> Result<Insertion<ArticleRevision>, RevisionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let column = version_column(revision.version)?;
        let inserted: Option<RevisionRow> = diesel::insert_into(article_revisions::table)
            .values(&new_row(
                revision.article,
                column,
                &revision.snapshot,
                revision.edited_by,
                &revision.note,
            ))
            .on_conflict((
                article_revisions::article_id,
                article_revisions::version_number,
            ))
            .do_nothing()
            .returning(RevisionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_insert_error(err, revision.article, revision.version))?;

        if let Some(row) = inserted {
            return to_revision(row).map(Insertion::Created);
        }
        let row: RevisionRow = article_revisions::table
            .filter(article_revisions::article_id.eq(*revision.article.as_uuid()))
            .filter(article_revisions::version_number.eq(column))
            .select(RevisionRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_revision(row).map(Insertion::Existing)
    }

    async fn list(
        &self,
        article: ArticleId,
    ) -> Result<Vec<ArticleRevision>, RevisionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RevisionRow> = article_revisions::table
            .filter(article_revisions::article_id.eq(*article.as_uuid()))
            .order((
                article_revisions::created_at.desc(),
                article_revisions::version_number.desc(),
            ))
            .select(RevisionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, RevisionRepositoryError::query)
    }

    async fn find(
        &self,
        article: ArticleId,
        version: VersionNumber,
    ) -> Result<Option<ArticleRevision>, RevisionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = article_revisions::table
            .filter(article_revisions::article_id.eq(*article.as_uuid()))
            .filter(article_revisions::version_number.eq(version_column(version)?))
            .select(RevisionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_revision).transpose()
    }

    async fn latest(
        &self,
        article: ArticleId,
    ) -> Result<Option<ArticleRevision>, RevisionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = article_revisions::table
            .filter(article_revisions::article_id.eq(*article.as_uuid()))
            .order(article_revisions::version_number.desc())
            .select(RevisionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_revision).transpose()
    }
}
