//! Articles and their taxonomy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{ArticleId, CategoryId, ProfileId, Slug, SlugValidationError, TagId};

/// Maximum length of an article title.
pub const TITLE_MAX: usize = 255;
/// Maximum length of a category name.
pub const CATEGORY_NAME_MAX: usize = 100;

/// Validation errors for article and taxonomy drafts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleValidationError {
    /// Titles must contain text.
    #[error("article title must not be empty")]
    EmptyTitle,
    /// Titles must fit the column.
    #[error("article title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Taxonomy names must contain text.
    #[error("name must not be empty")]
    EmptyName,
    /// Category names must fit the column.
    #[error("category name must be at most {max} characters")]
    NameTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The derived or supplied slug is invalid.
    #[error(transparent)]
    Slug(#[from] SlugValidationError),
}

/// A published or draft article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author: ProfileId,
    pub category: Option<CategoryId>,
    pub view_count: u64,
    pub is_published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an article.
///
/// `tags` are linked in the same transaction as the article insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author: ProfileId,
    pub category: Option<CategoryId>,
    pub tags: Vec<TagId>,
    pub is_published: bool,
    pub featured: bool,
}

impl NewArticle {
    /// Start a published, unfeatured article without taxonomy.
    pub fn new(
        slug: Slug,
        title: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        author: ProfileId,
    ) -> Result<Self, ArticleValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(ArticleValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self {
            slug,
            title,
            description: description.into(),
            body: body.into(),
            author,
            category: None,
            tags: Vec::new(),
            is_published: true,
            featured: false,
        })
    }

    /// File the article under a category.
    #[must_use]
    pub fn with_category(mut self, category: Option<CategoryId>) -> Self {
        self.category = category;
        self
    }

    /// Attach tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = tags;
        self
    }

    /// Set publication and featured flags.
    #[must_use]
    pub const fn with_flags(mut self, is_published: bool, featured: bool) -> Self {
        self.is_published = is_published;
        self.featured = featured;
        self
    }
}

/// Free-form label attached to articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    /// Display text.
    pub name: String,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub slug: Slug,
}

impl NewTag {
    /// Build a tag whose slug is derived from its display text.
    pub fn new(name: impl Into<String>) -> Result<Self, ArticleValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ArticleValidationError::EmptyName);
        }
        let slug = Slug::slugify(&name)?;
        Ok(Self { name, slug })
    }
}

/// Node in the category hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub icon: String,
    /// Position when listing; ties are broken by name.
    pub sort_order: i32,
    pub parent: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub icon: String,
    pub sort_order: i32,
    pub parent: Option<CategoryId>,
    pub is_active: bool,
}

impl NewCategory {
    /// Build an active top-level category whose slug is derived from `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use conduit_backend::domain::NewCategory;
    ///
    /// let category = NewCategory::new("Creative Writing", 2).expect("valid category");
    /// assert_eq!(category.slug.as_ref(), "creative-writing");
    /// assert_eq!(category.description, "Articles about Creative Writing");
    /// ```
    pub fn new(name: impl Into<String>, sort_order: i32) -> Result<Self, ArticleValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ArticleValidationError::EmptyName);
        }
        if name.chars().count() > CATEGORY_NAME_MAX {
            return Err(ArticleValidationError::NameTooLong {
                max: CATEGORY_NAME_MAX,
            });
        }
        let slug = Slug::slugify(&name)?;
        let description = format!("Articles about {name}");
        Ok(Self {
            name,
            slug,
            description,
            icon: String::new(),
            sort_order,
            parent: None,
            is_active: true,
        })
    }

    /// Nest the category under `parent`.
    #[must_use]
    pub const fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn slug() -> Slug {
        Slug::new("a-title").expect("valid slug")
    }

    #[test]
    fn new_article_defaults_to_published() {
        let draft = NewArticle::new(slug(), "A title", "desc", "body", ProfileId::random())
            .expect("valid article");

        assert!(draft.is_published);
        assert!(!draft.featured);
        assert!(draft.tags.is_empty());
    }

    #[rstest]
    #[case("", ArticleValidationError::EmptyTitle)]
    #[case("   ", ArticleValidationError::EmptyTitle)]
    fn new_article_rejects_blank_titles(
        #[case] title: &str,
        #[case] expected: ArticleValidationError,
    ) {
        let result = NewArticle::new(slug(), title, "d", "b", ProfileId::random());
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn new_article_rejects_long_titles() {
        let title = "t".repeat(TITLE_MAX + 1);
        let result = NewArticle::new(slug(), title, "d", "b", ProfileId::random());
        assert_eq!(
            result,
            Err(ArticleValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[test]
    fn tag_slug_is_derived() {
        let tag = NewTag::new("real-time").expect("valid tag");
        assert_eq!(tag.slug.as_ref(), "real-time");
    }

    #[test]
    fn tag_without_alphanumerics_is_rejected() {
        assert_eq!(
            NewTag::new("!!!"),
            Err(ArticleValidationError::Slug(SlugValidationError::Empty))
        );
    }

    #[test]
    fn subcategory_records_parent() {
        let parent = CategoryId::random();
        let child = NewCategory::new("Rust", 0)
            .expect("valid category")
            .with_parent(parent);
        assert_eq!(child.parent, Some(parent));
    }
}
