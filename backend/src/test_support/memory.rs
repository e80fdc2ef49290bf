//! In-memory adapter implementing every repository port.
//!
//! The store mirrors the PostgreSQL schema closely enough for behaviour
//! tests: natural keys are unique, deletes cascade the way the foreign keys
//! do, and timestamps are strictly increasing so "newest first" orderings
//! are deterministic.

mod accounts;
mod content;
mod engagement;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::domain::seeding::SeedRepositories;
use crate::domain::{
    ActivityLogEntry, Article, ArticleId, ArticleRating, ArticleRevision, Badge,
    BookmarkCollection, Category, CollectionId, Comment, CommentId, FollowEdge, FollowRequest,
    Notification, Profile, ProfileBadge, ProfileId, ProfileStatistics, ReadingListEntry, Tag,
    TagId, User, UserBlock, UserId, UserPreference, UserSession,
};

/// Shared in-memory tables. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    clock: Option<DateTime<Utc>>,
    users: Vec<User>,
    sessions: Vec<UserSession>,
    activities: Vec<ActivityLogEntry>,
    preferences: HashMap<UserId, UserPreference>,
    profiles: Vec<Profile>,
    follows: Vec<FollowEdge>,
    favorites: Vec<(ProfileId, ArticleId)>,
    statistics: HashMap<ProfileId, ProfileStatistics>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    articles: Vec<Article>,
    article_tags: Vec<(ArticleId, TagId)>,
    revisions: Vec<ArticleRevision>,
    comments: Vec<Comment>,
    ratings: Vec<ArticleRating>,
    reading_list: Vec<ReadingListEntry>,
    collections: Vec<BookmarkCollection>,
    collection_articles: Vec<(CollectionId, ArticleId, DateTime<Utc>)>,
    notifications: Vec<Notification>,
    follow_requests: Vec<FollowRequest>,
    badges: Vec<Badge>,
    profile_badges: Vec<ProfileBadge>,
    blocks: Vec<UserBlock>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every seeding port backed by this store.
    pub fn repositories(&self) -> SeedRepositories {
        SeedRepositories {
            users: Arc::new(self.clone()),
            profiles: Arc::new(self.clone()),
            articles: Arc::new(self.clone()),
            revisions: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
            notifications: Arc::new(self.clone()),
            accounts: Arc::new(self.clone()),
        }
    }

    /// Rows across every table, for idempotency checks.
    pub fn total_rows(&self) -> usize {
        let state = self.lock();
        state.users.len()
            + state.sessions.len()
            + state.activities.len()
            + state.preferences.len()
            + state.profiles.len()
            + state.follows.len()
            + state.favorites.len()
            + state.statistics.len()
            + state.categories.len()
            + state.tags.len()
            + state.articles.len()
            + state.article_tags.len()
            + state.revisions.len()
            + state.comments.len()
            + state.ratings.len()
            + state.reading_list.len()
            + state.collections.len()
            + state.collection_articles.len()
            + state.notifications.len()
            + state.follow_requests.len()
            + state.badges.len()
            + state.profile_badges.len()
            + state.blocks.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl State {
    /// A timestamp later than any issued before.
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn user_exists(&self, id: UserId) -> bool {
        self.users.iter().any(|user| user.id == id)
    }

    fn profile_exists(&self, id: ProfileId) -> bool {
        self.profiles.iter().any(|profile| profile.id == id)
    }

    fn article_exists(&self, id: ArticleId) -> bool {
        self.articles.iter().any(|article| article.id == id)
    }

    fn profile(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        let before = self.users.len();
        self.users.retain(|user| user.id != id);
        if self.users.len() == before {
            return false;
        }
        self.sessions.retain(|session| session.user != id);
        self.activities.retain(|entry| entry.user != id);
        self.preferences.remove(&id);
        self.notifications
            .retain(|note| note.recipient != id && note.actor != Some(id));
        let owned: Vec<ProfileId> = self
            .profiles
            .iter()
            .filter(|profile| profile.user_id == id)
            .map(|profile| profile.id)
            .collect();
        for profile in owned {
            self.remove_profile(profile);
        }
        true
    }

    fn remove_profile(&mut self, id: ProfileId) {
        self.profiles.retain(|profile| profile.id != id);
        self.follows
            .retain(|edge| edge.follower != id && edge.followed != id);
        self.favorites.retain(|(profile, _)| *profile != id);
        self.statistics.remove(&id);
        let authored: Vec<ArticleId> = self
            .articles
            .iter()
            .filter(|article| article.author == id)
            .map(|article| article.id)
            .collect();
        for article in authored {
            self.remove_article(article);
        }
        let written: Vec<CommentId> = self
            .comments
            .iter()
            .filter(|comment| comment.author == id)
            .map(|comment| comment.id)
            .collect();
        for comment in written {
            self.remove_comment(comment);
        }
        for revision in &mut self.revisions {
            if revision.edited_by == Some(id) {
                revision.edited_by = None;
            }
        }
        self.ratings.retain(|rating| rating.profile != id);
        self.reading_list.retain(|entry| entry.profile != id);
        let owned: Vec<CollectionId> = self
            .collections
            .iter()
            .filter(|collection| collection.owner == id)
            .map(|collection| collection.id)
            .collect();
        self.collections.retain(|collection| collection.owner != id);
        self.collection_articles
            .retain(|(collection, _, _)| !owned.contains(collection));
        self.follow_requests
            .retain(|request| request.from != id && request.to != id);
        self.profile_badges.retain(|earned| earned.profile != id);
        self.blocks
            .retain(|block| block.blocker != id && block.blocked != id);
    }

    fn remove_article(&mut self, id: ArticleId) -> bool {
        let before = self.articles.len();
        self.articles.retain(|article| article.id != id);
        if self.articles.len() == before {
            return false;
        }
        self.article_tags.retain(|(article, _)| *article != id);
        self.favorites.retain(|(_, article)| *article != id);
        self.revisions.retain(|revision| revision.article != id);
        self.comments.retain(|comment| comment.article != id);
        self.ratings.retain(|rating| rating.article != id);
        self.reading_list.retain(|entry| entry.article != id);
        self.collection_articles
            .retain(|(_, article, _)| *article != id);
        true
    }

    /// Remove a comment and every reply beneath it.
    fn remove_comment(&mut self, id: CommentId) -> bool {
        if !self.comments.iter().any(|comment| comment.id == id) {
            return false;
        }
        let mut doomed = vec![id];
        let mut cursor = 0;
        while let Some(&current) = doomed.get(cursor) {
            doomed.extend(
                self.comments
                    .iter()
                    .filter(|comment| comment.parent == Some(current))
                    .map(|comment| comment.id),
            );
            cursor += 1;
        }
        self.comments.retain(|comment| !doomed.contains(&comment.id));
        true
    }
}

#[cfg(test)]
mod tests;
