//! Profile, article, revision, and comment ports over the in-memory tables.

use async_trait::async_trait;

use super::{InMemoryStore, State};
use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, CommentRepository, CommentRepositoryError,
    ProfileRepository, ProfileRepositoryError, RevisionRepository, RevisionRepositoryError,
};
use crate::domain::{
    Article, ArticleId, ArticleRevision, Category, CategoryId, Comment, CommentId, FollowEdge,
    Insertion, NewArticle, NewCategory, NewComment, NewRevision, NewTag, Profile, ProfileDraft,
    ProfileId, ProfileStatistics, RevisionId, RevisionSnapshot, Slug, Tag, TagId, UserId,
    Username, VersionNumber, validate_comment_body,
};

fn sorted_by_username(mut profiles: Vec<Profile>) -> Vec<Profile> {
    profiles.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
    profiles
}

fn newest_first(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    articles
}

impl State {
    fn profile_or_not_found(&self, id: ProfileId) -> Result<(), ProfileRepositoryError> {
        if self.profile_exists(id) {
            Ok(())
        } else {
            Err(ProfileRepositoryError::not_found(id))
        }
    }

    fn compute_statistics(&mut self, profile: ProfileId) -> ProfileStatistics {
        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        let now = self.now();
        let authored: Vec<&Article> = self
            .articles
            .iter()
            .filter(|article| article.author == profile)
            .collect();
        let likes = self
            .favorites
            .iter()
            .filter(|(_, article)| authored.iter().any(|a| a.id == *article))
            .count();
        let mut stats = ProfileStatistics::empty(profile, now);
        stats.total_articles = count(authored.len());
        stats.total_article_views = authored.iter().map(|a| a.view_count).sum();
        stats.total_likes_received = count(likes);
        stats.total_comments = count(
            self.comments
                .iter()
                .filter(|comment| comment.author == profile)
                .count(),
        );
        stats.total_followers = count(
            self.follows
                .iter()
                .filter(|edge| edge.followed == profile)
                .count(),
        );
        stats.total_following = count(
            self.follows
                .iter()
                .filter(|edge| edge.follower == profile)
                .count(),
        );
        stats
    }

    fn check_article_references(
        &self,
        author: ProfileId,
        category: Option<CategoryId>,
        tags: &[TagId],
    ) -> Result<(), ArticleRepositoryError> {
        if !self.profile_exists(author) {
            return Err(ArticleRepositoryError::missing_reference(format!(
                "author profile {author}"
            )));
        }
        if let Some(category) = category {
            if !self.categories.iter().any(|c| c.id == category) {
                return Err(ArticleRepositoryError::missing_reference(format!(
                    "category {category}"
                )));
            }
        }
        self.check_tags(tags)
    }

    fn check_tags(&self, tags: &[TagId]) -> Result<(), ArticleRepositoryError> {
        match tags.iter().find(|id| !self.tags.iter().any(|t| t.id == **id)) {
            Some(missing) => Err(ArticleRepositoryError::missing_reference(format!(
                "tag {missing}"
            ))),
            None => Ok(()),
        }
    }

    fn link_tags(&mut self, article: ArticleId, tags: &[TagId]) {
        for tag in tags {
            if !self.article_tags.contains(&(article, *tag)) {
                self.article_tags.push((article, *tag));
            }
        }
    }

    fn insert_article(&mut self, draft: &NewArticle) -> Result<Article, ArticleRepositoryError> {
        if self.articles.iter().any(|a| a.slug == draft.slug) {
            return Err(ArticleRepositoryError::duplicate_slug(draft.slug.as_ref()));
        }
        self.check_article_references(draft.author, draft.category, &draft.tags)?;
        let now = self.now();
        let article = Article {
            id: ArticleId::random(),
            slug: draft.slug.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            body: draft.body.clone(),
            author: draft.author,
            category: draft.category,
            view_count: 0,
            is_published: draft.is_published,
            featured: draft.featured,
            created_at: now,
            updated_at: now,
        };
        self.articles.push(article.clone());
        self.link_tags(article.id, &draft.tags);
        Ok(article)
    }

    fn update_article(
        &mut self,
        id: ArticleId,
        change: impl FnOnce(&mut Article),
    ) -> Result<Article, ArticleRepositoryError> {
        let now = self.now();
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ArticleRepositoryError::not_found(id))?;
        change(article);
        article.updated_at = now;
        Ok(article.clone())
    }

    fn insert_revision(
        &mut self,
        article: ArticleId,
        version: VersionNumber,
        snapshot: &RevisionSnapshot,
        edited_by: Option<ProfileId>,
        note: &str,
    ) -> Result<ArticleRevision, RevisionRepositoryError> {
        if !self.article_exists(article) {
            return Err(RevisionRepositoryError::article_not_found(article));
        }
        if let Some(editor) = edited_by.filter(|id| !self.profile_exists(*id)) {
            return Err(RevisionRepositoryError::query(format!(
                "editor profile {editor} does not exist"
            )));
        }
        if self
            .revisions
            .iter()
            .any(|r| r.article == article && r.version == version)
        {
            return Err(RevisionRepositoryError::duplicate_version(
                article,
                version.get(),
            ));
        }
        let revision = ArticleRevision {
            id: RevisionId::random(),
            article,
            version,
            snapshot: snapshot.clone(),
            edited_by,
            note: note.to_owned(),
            created_at: self.now(),
        };
        self.revisions.push(revision.clone());
        Ok(revision)
    }

    fn insert_comment(&mut self, draft: &NewComment) -> Result<Comment, CommentRepositoryError> {
        if !self.article_exists(draft.article) {
            return Err(CommentRepositoryError::missing_reference(format!(
                "article {}",
                draft.article
            )));
        }
        if !self.profile_exists(draft.author) {
            return Err(CommentRepositoryError::missing_reference(format!(
                "author profile {}",
                draft.author
            )));
        }
        if let Some(parent) = draft.parent {
            let stored = self
                .comments
                .iter()
                .find(|c| c.id == parent)
                .ok_or_else(|| CommentRepositoryError::parent_not_found(parent))?;
            if stored.article != draft.article {
                return Err(CommentRepositoryError::parent_mismatch(
                    parent,
                    draft.article,
                ));
            }
        }
        let now = self.now();
        let comment = Comment {
            id: CommentId::random(),
            article: draft.article,
            author: draft.author,
            parent: draft.parent,
            body: draft.body.clone(),
            is_edited: false,
            created_at: now,
            updated_at: now,
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_or_create_for_user(
        &self,
        user: UserId,
        draft: &ProfileDraft,
    ) -> Result<Insertion<Profile>, ProfileRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.profiles.iter().find(|p| p.user_id == user) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        let username = state
            .users
            .iter()
            .find(|u| u.id == user)
            .map(|u| u.username.clone())
            .ok_or_else(|| ProfileRepositoryError::user_not_found(user))?;
        let now = state.now();
        let profile = Profile {
            id: ProfileId::random(),
            user_id: user,
            username,
            bio: draft.bio.clone(),
            image: draft.image.clone(),
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(profile.clone());
        Ok(Insertion::Created(profile))
    }

    async fn find_by_id(&self, id: ProfileId) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self.lock().profile(id).cloned())
    }

    async fn find_by_user_id(
        &self,
        user: UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.user_id == user)
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| &p.username == username)
            .cloned())
    }

    async fn update(
        &self,
        id: ProfileId,
        draft: &ProfileDraft,
    ) -> Result<Profile, ProfileRepositoryError> {
        let mut state = self.lock();
        let now = state.now();
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileRepositoryError::not_found(id))?;
        profile.bio.clone_from(&draft.bio);
        profile.image = draft.image.clone();
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn follow(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<Insertion<FollowEdge>, ProfileRepositoryError> {
        let mut state = self.lock();
        state.profile_or_not_found(follower)?;
        state.profile_or_not_found(followed)?;
        let edge = FollowEdge { follower, followed };
        if state.follows.contains(&edge) {
            return Ok(Insertion::Existing(edge));
        }
        state.follows.push(edge);
        Ok(Insertion::Created(edge))
    }

    async fn unfollow(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut state = self.lock();
        let before = state.follows.len();
        state
            .follows
            .retain(|edge| !(edge.follower == follower && edge.followed == followed));
        Ok(state.follows.len() < before)
    }

    async fn is_following(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<bool, ProfileRepositoryError> {
        Ok(self
            .lock()
            .follows
            .contains(&FollowEdge { follower, followed }))
    }

    async fn is_followed_by(
        &self,
        profile: ProfileId,
        other: ProfileId,
    ) -> Result<bool, ProfileRepositoryError> {
        self.is_following(other, profile).await
    }

    async fn followers(&self, profile: ProfileId) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let state = self.lock();
        let found = state
            .follows
            .iter()
            .filter(|edge| edge.followed == profile)
            .filter_map(|edge| state.profile(edge.follower).cloned())
            .collect();
        Ok(sorted_by_username(found))
    }

    async fn following(&self, profile: ProfileId) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let state = self.lock();
        let found = state
            .follows
            .iter()
            .filter(|edge| edge.follower == profile)
            .filter_map(|edge| state.profile(edge.followed).cloned())
            .collect();
        Ok(sorted_by_username(found))
    }

    async fn favorite(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut state = self.lock();
        state.profile_or_not_found(profile)?;
        if !state.article_exists(article) {
            return Err(ProfileRepositoryError::article_not_found(article));
        }
        if state.favorites.contains(&(profile, article)) {
            return Ok(false);
        }
        state.favorites.push((profile, article));
        Ok(true)
    }

    async fn unfavorite(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut state = self.lock();
        let before = state.favorites.len();
        state.favorites.retain(|pair| *pair != (profile, article));
        Ok(state.favorites.len() < before)
    }

    async fn has_favorited(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError> {
        Ok(self.lock().favorites.contains(&(profile, article)))
    }

    async fn favorites_count(&self, article: ArticleId) -> Result<u64, ProfileRepositoryError> {
        let count = self
            .lock()
            .favorites
            .iter()
            .filter(|(_, favorite)| *favorite == article)
            .count();
        u64::try_from(count).map_err(|err| ProfileRepositoryError::query(err.to_string()))
    }

    async fn statistics(
        &self,
        profile: ProfileId,
    ) -> Result<ProfileStatistics, ProfileRepositoryError> {
        let mut state = self.lock();
        state.profile_or_not_found(profile)?;
        if let Some(stats) = state.statistics.get(&profile) {
            return Ok(stats.clone());
        }
        let stats = ProfileStatistics::empty(profile, state.now());
        state.statistics.insert(profile, stats.clone());
        Ok(stats)
    }

    async fn refresh_statistics(
        &self,
        profile: ProfileId,
    ) -> Result<ProfileStatistics, ProfileRepositoryError> {
        let mut state = self.lock();
        state.profile_or_not_found(profile)?;
        let stats = state.compute_statistics(profile);
        state.statistics.insert(profile, stats.clone());
        Ok(stats)
    }
}

#[async_trait]
impl ArticleRepository for InMemoryStore {
    async fn create(&self, article: &NewArticle) -> Result<Article, ArticleRepositoryError> {
        self.lock().insert_article(article)
    }

    async fn get_or_create(
        &self,
        article: &NewArticle,
    ) -> Result<Insertion<Article>, ArticleRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.articles.iter().find(|a| a.slug == article.slug) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.insert_article(article).map(Insertion::Created)
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Article>, ArticleRepositoryError> {
        Ok(self
            .lock()
            .articles
            .iter()
            .find(|a| &a.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>, ArticleRepositoryError> {
        Ok(self.lock().articles.iter().find(|a| a.id == id).cloned())
    }

    async fn list_by_author(
        &self,
        author: ProfileId,
    ) -> Result<Vec<Article>, ArticleRepositoryError> {
        let state = self.lock();
        Ok(newest_first(
            state
                .articles
                .iter()
                .filter(|a| a.author == author)
                .cloned()
                .collect(),
        ))
    }

    async fn list_featured(&self) -> Result<Vec<Article>, ArticleRepositoryError> {
        let state = self.lock();
        Ok(newest_first(
            state
                .articles
                .iter()
                .filter(|a| a.is_published && a.featured)
                .cloned()
                .collect(),
        ))
    }

    async fn set_tags(
        &self,
        article: ArticleId,
        tags: &[TagId],
    ) -> Result<(), ArticleRepositoryError> {
        let mut state = self.lock();
        if !state.article_exists(article) {
            return Err(ArticleRepositoryError::not_found(article));
        }
        state.check_tags(tags)?;
        state.article_tags.retain(|(linked, _)| *linked != article);
        state.link_tags(article, tags);
        Ok(())
    }

    async fn tags_for(&self, article: ArticleId) -> Result<Vec<Tag>, ArticleRepositoryError> {
        let state = self.lock();
        let mut tags: Vec<Tag> = state
            .tags
            .iter()
            .filter(|tag| state.article_tags.contains(&(article, tag.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn record_view(&self, article: ArticleId) -> Result<u64, ArticleRepositoryError> {
        let mut state = self.lock();
        let stored = state
            .articles
            .iter_mut()
            .find(|a| a.id == article)
            .ok_or_else(|| ArticleRepositoryError::not_found(article))?;
        stored.view_count += 1;
        Ok(stored.view_count)
    }

    async fn set_published(
        &self,
        article: ArticleId,
        published: bool,
    ) -> Result<Article, ArticleRepositoryError> {
        self.lock()
            .update_article(article, |a| a.is_published = published)
    }

    async fn set_featured(
        &self,
        article: ArticleId,
        featured: bool,
    ) -> Result<Article, ArticleRepositoryError> {
        self.lock().update_article(article, |a| a.featured = featured)
    }

    async fn delete(&self, article: ArticleId) -> Result<bool, ArticleRepositoryError> {
        Ok(self.lock().remove_article(article))
    }

    async fn get_or_create_tag(
        &self,
        tag: &NewTag,
    ) -> Result<Insertion<Tag>, ArticleRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.tags.iter().find(|t| t.slug == tag.slug) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        let stored = Tag {
            id: TagId::random(),
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            created_at: state.now(),
        };
        state.tags.push(stored.clone());
        Ok(Insertion::Created(stored))
    }

    async fn get_or_create_category(
        &self,
        category: &NewCategory,
    ) -> Result<Insertion<Category>, ArticleRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.categories.iter().find(|c| c.slug == category.slug) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        if state.categories.iter().any(|c| c.name == category.name) {
            return Err(ArticleRepositoryError::duplicate_category(
                category.name.as_str(),
            ));
        }
        if let Some(parent) = category.parent {
            if !state.categories.iter().any(|c| c.id == parent) {
                return Err(ArticleRepositoryError::missing_reference(format!(
                    "parent category {parent}"
                )));
            }
        }
        let stored = Category {
            id: CategoryId::random(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            sort_order: category.sort_order,
            parent: category.parent,
            is_active: category.is_active,
            created_at: state.now(),
        };
        state.categories.push(stored.clone());
        Ok(Insertion::Created(stored))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ArticleRepositoryError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(categories)
    }

    async fn subcategories(
        &self,
        parent: CategoryId,
    ) -> Result<Vec<Category>, ArticleRepositoryError> {
        let mut categories: Vec<Category> = self
            .lock()
            .categories
            .iter()
            .filter(|c| c.parent == Some(parent))
            .cloned()
            .collect();
        categories.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(categories)
    }
}

#[async_trait]
impl RevisionRepository for InMemoryStore {
    async fn append(
        &self,
        article: ArticleId,
        snapshot: &RevisionSnapshot,
        edited_by: Option<ProfileId>,
        note: &str,
    ) -> Result<ArticleRevision, RevisionRepositoryError> {
        let mut state = self.lock();
        let current = state
            .revisions
            .iter()
            .filter(|r| r.article == article)
            .map(|r| r.version)
            .max();
        let version = match current {
            Some(latest) => latest
                .next()
                .map_err(|err| RevisionRepositoryError::query(err.to_string()))?,
            None => VersionNumber::first(),
        };
        state.insert_revision(article, version, snapshot, edited_by, note)
    }

    async fn get_or_create(
        &self,
        revision: &NewRevision,
    ) -> Result<Insertion<ArticleRevision>, RevisionRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .revisions
            .iter()
            .find(|r| r.article == revision.article && r.version == revision.version)
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state
            .insert_revision(
                revision.article,
                revision.version,
                &revision.snapshot,
                revision.edited_by,
                &revision.note,
            )
            .map(Insertion::Created)
    }

    async fn list(
        &self,
        article: ArticleId,
    ) -> Result<Vec<ArticleRevision>, RevisionRepositoryError> {
        let mut revisions: Vec<ArticleRevision> = self
            .lock()
            .revisions
            .iter()
            .filter(|r| r.article == article)
            .cloned()
            .collect();
        revisions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.version.cmp(&a.version))
        });
        Ok(revisions)
    }

    async fn find(
        &self,
        article: ArticleId,
        version: VersionNumber,
    ) -> Result<Option<ArticleRevision>, RevisionRepositoryError> {
        Ok(self
            .lock()
            .revisions
            .iter()
            .find(|r| r.article == article && r.version == version)
            .cloned())
    }

    async fn latest(
        &self,
        article: ArticleId,
    ) -> Result<Option<ArticleRevision>, RevisionRepositoryError> {
        Ok(self
            .lock()
            .revisions
            .iter()
            .filter(|r| r.article == article)
            .max_by_key(|r| r.version)
            .cloned())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        self.lock().insert_comment(comment)
    }

    async fn get_or_create(
        &self,
        comment: &NewComment,
    ) -> Result<Insertion<Comment>, CommentRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.comments.iter().find(|c| {
            c.article == comment.article
                && c.author == comment.author
                && c.parent == comment.parent
                && c.body == comment.body
        }) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.insert_comment(comment).map(Insertion::Created)
    }

    async fn edit(&self, id: CommentId, body: &str) -> Result<Comment, CommentRepositoryError> {
        validate_comment_body(body)?;
        let mut state = self.lock();
        let now = state.now();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommentRepositoryError::not_found(id))?;
        body.clone_into(&mut comment.body);
        comment.is_edited = true;
        comment.updated_at = now;
        Ok(comment.clone())
    }

    async fn list_for_article(
        &self,
        article: ArticleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.article == article)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(comments)
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError> {
        Ok(self.lock().remove_comment(id))
    }
}
