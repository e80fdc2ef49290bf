//! PostgreSQL-backed `ArticleRepository`: articles, tag links, tags, and
//! categories.
//!
//! Article inserts and their tag links share one transaction. Deleting an
//! article relies on `ON DELETE CASCADE` for revisions, comments, ratings,
//! reading-list entries, favourites, and tag links.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError};
use crate::domain::{
    Article, ArticleId, Category, CategoryId, Insertion, NewArticle, NewCategory, NewTag,
    ProfileId, Slug, Tag, TagId,
};

use super::diesel_helpers::{
    StoreFailure, TxError, classify, convert_rows, log_unmapped_reference,
};
use super::models::{
    ArticleRow, ArticleTagRow, CategoryRow, NewArticleRow, NewCategoryRow, NewTagRow, TagRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{article_tags, articles, categories, tags};

const SLUG_KEY: &str = "articles_slug_key";
const CATEGORY_NAME_KEY: &str = "categories_name_key";
const TAG_LINK_ARTICLE_FKEY: &str = "article_tags_article_id_fkey";

/// Diesel-backed implementation of the `ArticleRepository` port.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticleRepositoryError {
    ArticleRepositoryError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure) -> ArticleRepositoryError {
    match failure {
        StoreFailure::ForeignKeyViolation { message, .. } => {
            ArticleRepositoryError::missing_reference(message)
        }
        other => other.into_port(
            ArticleRepositoryError::connection,
            ArticleRepositoryError::query,
        ),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ArticleRepositoryError {
    map_failure(classify(error))
}

fn map_article_write_error(
    error: diesel::result::Error,
    article: &NewArticle,
) -> ArticleRepositoryError {
    let failure = classify(error);
    if failure.violates(SLUG_KEY) {
        ArticleRepositoryError::duplicate_slug(article.slug.as_ref())
    } else {
        map_failure(failure)
    }
}

fn to_article(row: ArticleRow) -> Result<Article, ArticleRepositoryError> {
    Article::try_from(row).map_err(|err| ArticleRepositoryError::query(err.to_string()))
}

fn updated_article(
    row: Option<ArticleRow>,
    article: ArticleId,
) -> Result<Article, ArticleRepositoryError> {
    row.map(to_article)
        .transpose()?
        .ok_or_else(|| ArticleRepositoryError::not_found(article))
}

fn new_article_row(article: &NewArticle) -> NewArticleRow<'_> {
    NewArticleRow {
        id: Uuid::new_v4(),
        slug: article.slug.as_ref(),
        title: &article.title,
        description: &article.description,
        body: &article.body,
        author_id: *article.author.as_uuid(),
        category_id: article.category.map(|id| *id.as_uuid()),
        is_published: article.is_published,
        featured: article.featured,
    }
}

async fn link_tags(
    conn: &mut AsyncPgConnection,
    article: Uuid,
    tags: &[TagId],
) -> Result<(), diesel::result::Error> {
    if tags.is_empty() {
        return Ok(());
    }
    let links: Vec<ArticleTagRow> = tags
        .iter()
        .map(|tag| ArticleTagRow {
            article_id: article,
            tag_id: *tag.as_uuid(),
        })
        .collect();
    diesel::insert_into(article_tags::table)
        .values(&links)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn create(&self, article: &NewArticle) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    let row: ArticleRow = diesel::insert_into(articles::table)
                        .values(&new_article_row(article))
                        .returning(ArticleRow::as_returning())
                        .get_result(conn)
                        .await?;
                    link_tags(conn, row.id, &article.tags).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_article_write_error(err, article))?;
        to_article(row)
    }

    async fn get_or_create(
        &self,
        article: &NewArticle,
    ) -> Result<Insertion<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let inserted: Option<ArticleRow> = diesel::insert_into(articles::table)
                        .values(&new_article_row(article))
                        .on_conflict(articles::slug)
                        .do_nothing()
                        .returning(ArticleRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    if let Some(row) = inserted {
                        link_tags(conn, row.id, &article.tags).await?;
                        return Ok(Insertion::Created(row));
                    }
                    let row: ArticleRow = articles::table
                        .filter(articles::slug.eq(article.slug.as_ref()))
                        .select(ArticleRow::as_select())
                        .first(conn)
                        .await?;
                    Ok(Insertion::Existing(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_article_write_error(err, article))?;
        match outcome {
            Insertion::Created(row) => to_article(row).map(Insertion::Created),
            Insertion::Existing(row) => to_article(row).map(Insertion::Existing),
        }
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = articles::table
            .filter(articles::slug.eq(slug.as_ref()))
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_article).transpose()
    }

    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = articles::table
            .find(*id.as_uuid())
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_article).transpose()
    }

    async fn list_by_author(
        &self,
        author: ProfileId,
    ) -> Result<Vec<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ArticleRow> = articles::table
            .filter(articles::author_id.eq(*author.as_uuid()))
            .order((articles::created_at.desc(), articles::id.desc()))
            .select(ArticleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, ArticleRepositoryError::query)
    }

    async fn list_featured(&self) -> Result<Vec<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ArticleRow> = articles::table
            .filter(articles::is_published.eq(true))
            .filter(articles::featured.eq(true))
            .order((articles::created_at.desc(), articles::id.desc()))
            .select(ArticleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, ArticleRepositoryError::query)
    }

    async fn set_tags(
        &self,
        article: ArticleId,
        tags: &[TagId],
    ) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let article_id = *article.as_uuid();
        conn.transaction::<_, TxError<ArticleRepositoryError>, _>(|conn| {
            async move {
                let exists: bool = diesel::select(diesel::dsl::exists(
                    articles::table.filter(articles::id.eq(article_id)),
                ))
                .get_result(conn)
                .await?;
                if !exists {
                    return Err(TxError::Port(ArticleRepositoryError::not_found(article)));
                }
                diesel::delete(article_tags::table.filter(article_tags::article_id.eq(article_id)))
                    .execute(conn)
                    .await?;
                link_tags(conn, article_id, tags).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| {
            err.resolve(|err| {
                let failure = classify(err);
                if failure.violates(TAG_LINK_ARTICLE_FKEY) {
                    ArticleRepositoryError::not_found(article)
                } else {
                    map_failure(failure)
                }
            })
        })
    }

    async fn tags_for(&self, article: ArticleId) -> Result<Vec<Tag>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagRow> = tags::table
            .inner_join(article_tags::table)
            .filter(article_tags::article_id.eq(*article.as_uuid()))
            .order(tags::tag.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, ArticleRepositoryError::query)
    }

    async fn record_view(&self, article: ArticleId) -> Result<u64, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: Option<i64> = diesel::update(articles::table.find(*article.as_uuid()))
            .set(articles::view_count.eq(articles::view_count + 1))
            .returning(articles::view_count)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let count = count.ok_or_else(|| ArticleRepositoryError::not_found(article))?;
        u64::try_from(count).map_err(|err| ArticleRepositoryError::query(err.to_string()))
    }

    async fn set_published(
        &self,
        article: ArticleId,
        published: bool,
    ) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(articles::table.find(*article.as_uuid()))
            .set(articles::is_published.eq(published))
            .returning(ArticleRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        updated_article(row, article)
    }

    async fn set_featured(
        &self,
        article: ArticleId,
        featured: bool,
    ) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(articles::table.find(*article.as_uuid()))
            .set(articles::featured.eq(featured))
            .returning(ArticleRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        updated_article(row, article)
    }

    async fn delete(&self, article: ArticleId) -> Result<bool, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(articles::table.find(*article.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn get_or_create_tag(
        &self,
        tag: &NewTag,
    ) -> Result<Insertion<Tag>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<TagRow> = diesel::insert_into(tags::table)
            .values(&NewTagRow {
                id: Uuid::new_v4(),
                tag: &tag.name,
                slug: tag.slug.as_ref(),
            })
            .on_conflict(tags::slug)
            .do_nothing()
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let (created, row) = match inserted {
            Some(row) => (true, row),
            None => {
                let row = tags::table
                    .filter(tags::slug.eq(tag.slug.as_ref()))
                    .select(TagRow::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                (false, row)
            }
        };
        let tag = Tag::try_from(row).map_err(|err| ArticleRepositoryError::query(err.to_string()))?;
        Ok(Insertion::from_flag(created, tag))
    }

    async fn get_or_create_category(
        &self,
        category: &NewCategory,
    ) -> Result<Insertion<Category>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<CategoryRow> = diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                id: Uuid::new_v4(),
                name: &category.name,
                slug: category.slug.as_ref(),
                description: &category.description,
                parent_id: category.parent.map(|id| *id.as_uuid()),
                icon: &category.icon,
                sort_order: category.sort_order,
                is_active: category.is_active,
            })
            .on_conflict(categories::slug)
            .do_nothing()
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                let failure = classify(err);
                if failure.violates(CATEGORY_NAME_KEY) {
                    ArticleRepositoryError::duplicate_category(category.name.as_str())
                } else {
                    log_unmapped_reference(&failure);
                    map_failure(failure)
                }
            })?;
        let (created, row) = match inserted {
            Some(row) => (true, row),
            None => {
                let row = categories::table
                    .filter(categories::slug.eq(category.slug.as_ref()))
                    .select(CategoryRow::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                (false, row)
            }
        };
        let category =
            Category::try_from(row).map_err(|err| ArticleRepositoryError::query(err.to_string()))?;
        Ok(Insertion::from_flag(created, category))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .order((categories::sort_order.asc(), categories::name.asc()))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, ArticleRepositoryError::query)
    }

    async fn subcategories(
        &self,
        parent: CategoryId,
    ) -> Result<Vec<Category>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::parent_id.eq(*parent.as_uuid()))
            .order((categories::sort_order.asc(), categories::name.asc()))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, ArticleRepositoryError::query)
    }
}
