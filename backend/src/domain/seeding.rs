//! Collaboration demo seeding orchestration.
//!
//! Converts the fixture catalogue into validated domain values and applies
//! each selected dataset through the repository ports. Every write is a
//! get-or-create, so running the same plan twice reports only existing
//! records the second time.

use std::collections::HashMap;
use std::sync::Arc;

use example_data::{
    ArticleSeed, CommentSeed, Dataset, NotificationKindSeed, SeedCatalogue, SeedPlan, UserSeed,
};
use thiserror::Error;
use tracing::info;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, ArticleRepository, ArticleRepositoryError,
    CommentRepository, CommentRepositoryError, NotificationRepository,
    NotificationRepositoryError, ProfileRepository, ProfileRepositoryError, RevisionRepository,
    RevisionRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    ArticleId, CategoryId, CommentId, EmailAddress, ImageUrl, Insertion, NewArticle,
    NewCategory, NewComment, NewNotification, NewRevision, NewTag, NewUser, NotificationKind,
    PasswordHash, PasswordHashError, ProfileDraft, ProfileId, RevisionSnapshot, Slug, TagId,
    User, Username, VersionNumber,
};

/// Avatar service used for seeded profile images.
pub const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Errors raised while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A record depends on data from a dataset that has not been seeded.
    #[error("missing {detail}; seed the {dataset} dataset first")]
    MissingPrerequisite {
        /// Dataset that must be loaded first.
        dataset: Dataset,
        /// What could not be found.
        detail: String,
    },
    /// A fixture value failed domain validation.
    #[error("invalid {dataset} fixture: {message}")]
    InvalidFixture {
        /// Dataset containing the record.
        dataset: Dataset,
        /// Validation failure.
        message: String,
    },
    /// Hashing a fixture password failed.
    #[error(transparent)]
    Password(#[from] PasswordHashError),
    /// User persistence failed.
    #[error(transparent)]
    Users(#[from] UserPersistenceError),
    /// Profile persistence failed.
    #[error(transparent)]
    Profiles(#[from] ProfileRepositoryError),
    /// Article, tag, or category persistence failed.
    #[error(transparent)]
    Articles(#[from] ArticleRepositoryError),
    /// Revision persistence failed.
    #[error(transparent)]
    Revisions(#[from] RevisionRepositoryError),
    /// Comment persistence failed.
    #[error(transparent)]
    Comments(#[from] CommentRepositoryError),
    /// Notification persistence failed.
    #[error(transparent)]
    Notifications(#[from] NotificationRepositoryError),
    /// Preference persistence failed.
    #[error(transparent)]
    Accounts(#[from] AccountRepositoryError),
}

impl SeedError {
    fn invalid(dataset: Dataset, err: impl std::fmt::Display) -> Self {
        Self::InvalidFixture {
            dataset,
            message: err.to_string(),
        }
    }
}

/// Created and existing record counts for one dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    /// Records inserted by this run.
    pub created: usize,
    /// Records that were already present.
    pub existing: usize,
}

impl SeedCounts {
    fn tally<T>(&mut self, outcome: &Insertion<T>) {
        if outcome.is_created() {
            self.created += 1;
        } else {
            self.existing += 1;
        }
    }

    /// Records touched, whether new or not.
    pub const fn total(&self) -> usize {
        self.created + self.existing
    }
}

/// Per-dataset outcome of a seeding run, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    entries: Vec<(Dataset, SeedCounts)>,
}

impl SeedReport {
    fn record(&mut self, dataset: Dataset, counts: SeedCounts) {
        self.entries.push((dataset, counts));
    }

    /// Counts for `dataset`, if it was part of the run.
    pub fn counts(&self, dataset: Dataset) -> Option<SeedCounts> {
        self.entries
            .iter()
            .find(|(seeded, _)| *seeded == dataset)
            .map(|(_, counts)| *counts)
    }

    /// Datasets that ran, in order.
    pub fn datasets(&self) -> impl Iterator<Item = Dataset> + '_ {
        self.entries.iter().map(|(dataset, _)| *dataset)
    }

    /// Records created across every dataset.
    pub fn total_created(&self) -> usize {
        self.entries.iter().map(|(_, counts)| counts.created).sum()
    }
}

/// Ports the seeder writes through.
#[derive(Clone)]
pub struct SeedRepositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub revisions: Arc<dyn RevisionRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub accounts: Arc<dyn AccountRepository>,
}

/// Applies the collaboration catalogue through the repository ports.
#[derive(Clone)]
pub struct CollaborationSeeder {
    repos: SeedRepositories,
}

impl CollaborationSeeder {
    /// Create a seeder over the given adapters.
    pub const fn new(repos: SeedRepositories) -> Self {
        Self { repos }
    }

    /// Seed every dataset in `plan`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. [`SeedError::MissingPrerequisite`] names
    /// the dataset that has to be seeded before retrying.
    pub async fn run(
        &self,
        catalogue: &SeedCatalogue,
        plan: &SeedPlan,
    ) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        for &dataset in plan.datasets() {
            let counts = match dataset {
                Dataset::Users => self.seed_users(catalogue).await?,
                Dataset::Articles => self.seed_articles(catalogue).await?,
                Dataset::Comments => self.seed_comments(catalogue).await?,
                Dataset::Notifications => self.seed_notifications(catalogue).await?,
                Dataset::Relationships => self.seed_relationships(catalogue).await?,
            };
            info!(
                %dataset,
                created = counts.created,
                existing = counts.existing,
                "seeded dataset"
            );
            report.record(dataset, counts);
        }
        Ok(report)
    }

    async fn seed_users(&self, catalogue: &SeedCatalogue) -> Result<SeedCounts, SeedError> {
        let mut counts = SeedCounts::default();
        for seed in catalogue.users() {
            let user = self.seed_user(seed).await?;
            counts.tally(&user);
            let user = user.into_inner();

            let image = ImageUrl::new(format!("{AVATAR_BASE_URL}{}", user.username))
                .map_err(|err| SeedError::invalid(Dataset::Users, err))?;
            let draft = ProfileDraft {
                bio: seed.bio.clone(),
                image,
            };
            let profile = self
                .repos
                .profiles
                .get_or_create_for_user(user.id, &draft)
                .await?;
            counts.tally(&profile);

            self.repos.profiles.statistics(profile.value().id).await?;
            self.repos.accounts.preferences(user.id).await?;
        }
        Ok(counts)
    }

    async fn seed_user(&self, seed: &UserSeed) -> Result<Insertion<User>, SeedError> {
        let username =
            Username::new(&seed.username).map_err(|err| SeedError::invalid(Dataset::Users, err))?;
        // Skip hashing when the account is already present.
        if let Some(existing) = self.repos.users.find_by_username(&username).await? {
            return Ok(Insertion::Existing(existing));
        }
        let email =
            EmailAddress::new(&seed.email).map_err(|err| SeedError::invalid(Dataset::Users, err))?;
        let password = PasswordHash::hash(&seed.password)?;
        let new_user = NewUser::new(username, email, password);
        Ok(self.repos.users.get_or_create(&new_user).await?)
    }

    async fn seed_articles(&self, catalogue: &SeedCatalogue) -> Result<SeedCounts, SeedError> {
        let mut counts = SeedCounts::default();
        let mut profiles = ProfileCache::default();

        let mut categories: HashMap<&str, CategoryId> = HashMap::new();
        for (position, name) in catalogue.categories().iter().enumerate() {
            let order = i32::try_from(position)
                .map_err(|err| SeedError::invalid(Dataset::Articles, err))?;
            let draft = NewCategory::new(name.as_str(), order)
                .map_err(|err| SeedError::invalid(Dataset::Articles, err))?;
            let category = self.repos.articles.get_or_create_category(&draft).await?;
            counts.tally(&category);
            categories.insert(name.as_str(), category.value().id);
        }

        let mut tags: HashMap<&str, TagId> = HashMap::new();
        for name in catalogue.tags() {
            let draft = NewTag::new(name.as_str())
                .map_err(|err| SeedError::invalid(Dataset::Articles, err))?;
            let tag = self.repos.articles.get_or_create_tag(&draft).await?;
            counts.tally(&tag);
            tags.insert(name.as_str(), tag.value().id);
        }

        for seed in catalogue.articles() {
            let author = profiles.resolve(&self.repos, &seed.author).await?;
            let draft = article_draft(seed, author, &categories, &tags)?;
            let article = self.repos.articles.get_or_create(&draft).await?;
            counts.tally(&article);
            let article_id = article.value().id;

            for revision in &seed.revisions {
                let editor = profiles.resolve(&self.repos, &revision.edited_by).await?;
                let version = VersionNumber::new(revision.version)
                    .map_err(|err| SeedError::invalid(Dataset::Articles, err))?;
                let draft = NewRevision {
                    article: article_id,
                    version,
                    snapshot: RevisionSnapshot::new(
                        revision.title.as_str(),
                        revision.description.as_str(),
                        revision.body.as_str(),
                    ),
                    edited_by: Some(editor),
                    note: revision.note.clone(),
                };
                let stored = self.repos.revisions.get_or_create(&draft).await?;
                counts.tally(&stored);
            }
        }
        Ok(counts)
    }

    async fn seed_comments(&self, catalogue: &SeedCatalogue) -> Result<SeedCounts, SeedError> {
        let mut counts = SeedCounts::default();
        let mut profiles = ProfileCache::default();

        for thread in catalogue.comments() {
            let article = self.resolve_article(&thread.article).await?;
            // Depth-first so each reply is written after its parent.
            let mut pending: Vec<(Option<CommentId>, &CommentSeed)> = vec![(None, &thread.root)];
            while let Some((parent, seed)) = pending.pop() {
                let author = profiles.resolve(&self.repos, &seed.author).await?;
                let mut draft = NewComment::new(article, author, seed.body.as_str())
                    .map_err(|err| SeedError::invalid(Dataset::Comments, err))?;
                if let Some(parent) = parent {
                    draft = draft.replying_to(parent);
                }
                let comment = self.repos.comments.get_or_create(&draft).await?;
                counts.tally(&comment);
                let id = comment.value().id;
                pending.extend(seed.replies.iter().rev().map(|reply| (Some(id), reply)));
            }
        }
        Ok(counts)
    }

    async fn seed_notifications(
        &self,
        catalogue: &SeedCatalogue,
    ) -> Result<SeedCounts, SeedError> {
        let mut counts = SeedCounts::default();
        for seed in catalogue.notifications() {
            let recipient = self.resolve_user(&seed.recipient).await?;
            let kind = notification_kind(seed.kind);
            let mut draft = NewNotification::new(recipient.id, kind, seed.message.as_str())
                .with_link(seed.link.as_str())
                .read(seed.is_read);
            if let Some(actor) = &seed.actor {
                draft = draft.from_actor(self.resolve_user(actor).await?.id);
            }
            let notification = self.repos.notifications.get_or_create(&draft).await?;
            counts.tally(&notification);
        }
        Ok(counts)
    }

    async fn seed_relationships(
        &self,
        catalogue: &SeedCatalogue,
    ) -> Result<SeedCounts, SeedError> {
        let mut counts = SeedCounts::default();
        let mut profiles = ProfileCache::default();
        for seed in catalogue.follows() {
            let follower = profiles.resolve(&self.repos, &seed.follower).await?;
            let followed = profiles.resolve(&self.repos, &seed.followed).await?;
            let edge = self.repos.profiles.follow(follower, followed).await?;
            counts.tally(&edge);
        }
        Ok(counts)
    }

    async fn resolve_user(&self, username: &str) -> Result<User, SeedError> {
        let parsed = parse_username(username)?;
        self.repos
            .users
            .find_by_username(&parsed)
            .await?
            .ok_or_else(|| missing_user(username))
    }

    async fn resolve_article(&self, slug: &str) -> Result<ArticleId, SeedError> {
        let parsed = Slug::new(slug).map_err(|err| SeedError::invalid(Dataset::Comments, err))?;
        self.repos
            .articles
            .find_by_slug(&parsed)
            .await?
            .map(|article| article.id)
            .ok_or_else(|| SeedError::MissingPrerequisite {
                dataset: Dataset::Articles,
                detail: format!("article '{slug}'"),
            })
    }
}

/// Username to profile lookups shared across one dataset.
#[derive(Default)]
struct ProfileCache {
    resolved: HashMap<String, ProfileId>,
}

impl ProfileCache {
    async fn resolve(
        &mut self,
        repos: &SeedRepositories,
        username: &str,
    ) -> Result<ProfileId, SeedError> {
        if let Some(id) = self.resolved.get(username) {
            return Ok(*id);
        }
        let parsed = parse_username(username)?;
        let profile = repos
            .profiles
            .find_by_username(&parsed)
            .await?
            .ok_or_else(|| missing_user(username))?;
        self.resolved.insert(username.to_owned(), profile.id);
        Ok(profile.id)
    }
}

fn parse_username(username: &str) -> Result<Username, SeedError> {
    Username::new(username).map_err(|err| SeedError::invalid(Dataset::Users, err))
}

fn missing_user(username: &str) -> SeedError {
    SeedError::MissingPrerequisite {
        dataset: Dataset::Users,
        detail: format!("user '{username}'"),
    }
}

fn article_draft(
    seed: &ArticleSeed,
    author: ProfileId,
    categories: &HashMap<&str, CategoryId>,
    tags: &HashMap<&str, TagId>,
) -> Result<NewArticle, SeedError> {
    let slug = Slug::new(seed.slug.as_str())
        .map_err(|err| SeedError::invalid(Dataset::Articles, err))?;
    let category = seed
        .category
        .as_deref()
        .and_then(|name| categories.get(name).copied());
    let tag_ids = seed
        .tags
        .iter()
        .filter_map(|name| tags.get(name.as_str()).copied())
        .collect();
    let draft = NewArticle::new(
        slug,
        seed.title.as_str(),
        seed.description.as_str(),
        seed.body.as_str(),
        author,
    )
    .map_err(|err| SeedError::invalid(Dataset::Articles, err))?;
    Ok(draft
        .with_category(category)
        .with_tags(tag_ids)
        .with_flags(seed.is_published, seed.featured))
}

const fn notification_kind(kind: NotificationKindSeed) -> NotificationKind {
    match kind {
        NotificationKindSeed::Follow => NotificationKind::Follow,
        NotificationKindSeed::Comment => NotificationKind::Comment,
        NotificationKindSeed::Like => NotificationKind::Like,
        NotificationKindSeed::Mention => NotificationKind::Mention,
        NotificationKindSeed::Rating => NotificationKind::Rating,
        NotificationKindSeed::Reply => NotificationKind::Reply,
    }
}

#[cfg(test)]
mod tests;
