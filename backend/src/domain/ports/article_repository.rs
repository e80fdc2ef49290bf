//! Port abstraction for articles, tags, and categories.

use async_trait::async_trait;

use crate::domain::{
    Article, ArticleId, Category, CategoryId, Insertion, NewArticle, NewCategory, NewTag,
    ProfileId, Slug, Tag, TagId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by article repository adapters.
    pub enum ArticleRepositoryError {
        /// Another article already uses the slug.
        DuplicateSlug { slug: String } => "article slug '{slug}' already exists",
        /// Another category already uses the name.
        DuplicateCategory { name: String } => "category '{name}' already exists",
        /// No article has the identifier.
        NotFound { id: ArticleId } => "article {id} not found",
        /// A referenced author, category, or tag does not exist.
        MissingReference { message: String } => "article references missing data: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "article repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "article repository query failed: {message}",
    }
}

/// Article and taxonomy storage.
///
/// Deleting an article removes its revisions, comments, ratings,
/// reading-list entries, favourites, and tag links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert an article and link its tags in one transaction.
    async fn create(&self, article: &NewArticle) -> Result<Article, ArticleRepositoryError>;

    /// Return the article with `article.slug`, inserting it when absent.
    ///
    /// Tags are linked only when the article is created.
    async fn get_or_create(
        &self,
        article: &NewArticle,
    ) -> Result<Insertion<Article>, ArticleRepositoryError>;

    /// Fetch an article by slug.
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Article>, ArticleRepositoryError>;

    /// Fetch an article by identifier.
    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>, ArticleRepositoryError>;

    /// Articles written by `author`, newest first.
    async fn list_by_author(
        &self,
        author: ProfileId,
    ) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Published featured articles, newest first.
    async fn list_featured(&self) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Replace the article's tag set.
    async fn set_tags(&self, article: ArticleId, tags: &[TagId])
    -> Result<(), ArticleRepositoryError>;

    /// Tags linked to the article, ordered by name.
    async fn tags_for(&self, article: ArticleId) -> Result<Vec<Tag>, ArticleRepositoryError>;

    /// Increment the view counter and return the new value.
    async fn record_view(&self, article: ArticleId) -> Result<u64, ArticleRepositoryError>;

    /// Publish or unpublish.
    async fn set_published(
        &self,
        article: ArticleId,
        published: bool,
    ) -> Result<Article, ArticleRepositoryError>;

    /// Feature or unfeature.
    async fn set_featured(
        &self,
        article: ArticleId,
        featured: bool,
    ) -> Result<Article, ArticleRepositoryError>;

    /// Delete an article. Returns `false` when nothing was deleted.
    async fn delete(&self, article: ArticleId) -> Result<bool, ArticleRepositoryError>;

    /// Return the tag with `tag.slug`, inserting it when absent.
    async fn get_or_create_tag(&self, tag: &NewTag)
    -> Result<Insertion<Tag>, ArticleRepositoryError>;

    /// Return the category with `category.slug`, inserting it when absent.
    async fn get_or_create_category(
        &self,
        category: &NewCategory,
    ) -> Result<Insertion<Category>, ArticleRepositoryError>;

    /// Every category ordered by sort order, then name.
    async fn list_categories(&self) -> Result<Vec<Category>, ArticleRepositoryError>;

    /// Direct children of `parent`, ordered by sort order, then name.
    async fn subcategories(
        &self,
        parent: CategoryId,
    ) -> Result<Vec<Category>, ArticleRepositoryError>;
}
