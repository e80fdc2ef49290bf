//! Integration tests for the Diesel adapters against embedded PostgreSQL.
//!
//! Each test clones a fresh database from the migrated template. Tests are
//! synchronous and drive the async adapters through a per-test Tokio runtime,
//! matching how the BDD suites run their steps.

use chrono::{Duration, Utc};
use conduit_backend::domain::ports::{
    AccountRepository, AccountRepositoryError, ArticleRepository, ArticleRepositoryError,
    CommentRepository, CommentRepositoryError, EngagementRepository, NotificationRepository,
    ProfileRepository, RevisionRepository, SocialRepository, SocialRepositoryError,
    UserPersistenceError, UserRepository,
};
use conduit_backend::domain::{
    ArticleId, EmailAddress, FollowRequestStatus, ImageUrl, NewArticle, NewComment,
    NewFollowRequest, NewNotification, NewReadingListEntry, NewSession, NewUser,
    NotificationKind, PasswordHash, ProfileDraft, ProfileId, ReadingPriority, RevisionSnapshot,
    Score, SessionId, Slug, UserId, Username,
};
use conduit_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselArticleRepository, DieselCommentRepository,
    DieselEngagementRepository, DieselNotificationRepository, DieselProfileRepository, DieselRevisionRepository,
    DieselSocialRepository, DieselUserRepository, PoolConfig,
};
use conduit_backend::seeding::{SeedSettings, diesel_repositories, seed_catalogue};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::shared_cluster;
use support::embedded_postgres::{count_rows, drop_table};
use support::{handle_cluster_setup_failure, provision_template_database};

struct Harness {
    runtime: Runtime,
    pool: DbPool,
    database_url: String,
    _database: TemporaryDatabase,
}

impl Harness {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn users(&self) -> DieselUserRepository {
        DieselUserRepository::new(self.pool.clone())
    }

    fn profiles(&self) -> DieselProfileRepository {
        DieselProfileRepository::new(self.pool.clone())
    }

    fn articles(&self) -> DieselArticleRepository {
        DieselArticleRepository::new(self.pool.clone())
    }

    fn engagement(&self) -> DieselEngagementRepository {
        DieselEngagementRepository::new(self.pool.clone())
    }

    fn rows(&self, table: &str) -> i64 {
        count_rows(&self.database_url, table).expect("count rows")
    }

    /// Register a user with a profile.
    fn member(&self, name: &str) -> (UserId, ProfileId) {
        self.block_on(async {
            let user = self
                .users()
                .create_user(&new_user(name))
                .await
                .expect("create user");
            let draft = ProfileDraft {
                bio: format!("{name} writes here"),
                image: ImageUrl::none(),
            };
            let profile = self
                .profiles()
                .get_or_create_for_user(user.id, &draft)
                .await
                .expect("create profile")
                .into_inner();
            (user.id, profile.id)
        })
    }

    fn article(&self, author: ProfileId, slug: &str) -> ArticleId {
        let draft = NewArticle::new(
            Slug::new(slug).expect("slug"),
            "A title",
            "A description",
            "A body",
            author,
        )
        .expect("article draft");
        self.block_on(self.articles().create(&draft))
            .expect("create article")
            .id
    }
}

fn new_user(name: &str) -> NewUser {
    NewUser::new(
        Username::new(name).expect("username"),
        EmailAddress::new(format!("{name}@example.com")).expect("email"),
        PasswordHash::unusable(),
    )
}

fn setup_harness() -> Result<Harness, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = database.url().to_string();
    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(Harness {
        runtime,
        pool,
        database_url,
        _database: database,
    })
}

#[fixture]
fn harness() -> Option<Harness> {
    match setup_harness() {
        Ok(harness) => Some(harness),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn get_or_create_user_is_idempotent(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: get_or_create_user_is_idempotent skipped");
        return;
    };
    let draft = new_user("alice");

    let first = h.block_on(h.users().get_or_create(&draft)).expect("first");
    let second = h.block_on(h.users().get_or_create(&draft)).expect("second");

    assert!(first.is_created());
    assert!(!second.is_created());
    assert_eq!(first.value().id, second.value().id);
    assert_eq!(h.rows("users"), 1);
}

#[rstest]
fn duplicate_usernames_are_reported(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_usernames_are_reported skipped");
        return;
    };
    h.member("alice");
    let clash = NewUser::new(
        Username::new("alice").expect("username"),
        EmailAddress::new("other@example.com").expect("email"),
        PasswordHash::unusable(),
    );

    let result = h.block_on(h.users().create_user(&clash));

    assert_eq!(result, Err(UserPersistenceError::duplicate_username("alice")));
}

#[rstest]
fn duplicate_slugs_are_reported(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_slugs_are_reported skipped");
        return;
    };
    let (_, author) = h.member("alice");
    h.article(author, "intro");
    let draft = NewArticle::new(Slug::new("intro").expect("slug"), "Again", "d", "b", author)
        .expect("draft");

    let result = h.block_on(h.articles().create(&draft));

    assert_eq!(result, Err(ArticleRepositoryError::duplicate_slug("intro")));
}

#[rstest]
fn revisions_number_sequentially(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: revisions_number_sequentially skipped");
        return;
    };
    let (_, author) = h.member("alice");
    let article = h.article(author, "versions");
    let revisions = DieselRevisionRepository::new(h.pool.clone());
    let snapshot = RevisionSnapshot::new("t", "d", "b");

    let versions: Vec<u32> = h.block_on(async {
        let mut versions = Vec::new();
        for note in ["draft", "edit", "final"] {
            let revision = revisions
                .append(article, &snapshot, Some(author), note)
                .await
                .expect("append");
            versions.push(revision.version.get());
        }
        versions
    });

    assert_eq!(versions, vec![1, 2, 3]);
    let latest = h.block_on(revisions.latest(article)).expect("latest");
    assert_eq!(latest.map(|r| r.note), Some("final".to_owned()));
}

#[rstest]
fn deleting_a_user_cascades(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_a_user_cascades skipped");
        return;
    };
    let (alice, author) = h.member("alice");
    let (_, reader) = h.member("bob");
    let article = h.article(author, "cascade");
    let comments = DieselCommentRepository::new(h.pool.clone());
    h.block_on(async {
        let comment = NewComment::new(article, reader, "nice").expect("comment");
        comments.create(&comment).await.expect("comment");
        h.profiles().follow(reader, author).await.expect("follow");
    });

    assert!(h.block_on(h.users().delete(alice)).expect("delete"));

    assert_eq!(h.rows("articles"), 0);
    assert_eq!(h.rows("comments"), 0);
    assert_eq!(h.rows("follows"), 0);
    assert_eq!(h.rows("profiles"), 1);
}

#[rstest]
fn accepting_a_follow_request_records_the_edge(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: accepting_a_follow_request_records_the_edge skipped");
        return;
    };
    let (_, asker) = h.member("alice");
    let (_, target) = h.member("bob");
    let social = DieselSocialRepository::new(h.pool.clone());
    let request = NewFollowRequest::new(asker, target, "hello").expect("request");

    let sent = h
        .block_on(social.send_follow_request(&request))
        .expect("send")
        .into_inner();
    let accepted = h.block_on(social.respond(sent.id, true)).expect("accept");
    let again = h.block_on(social.respond(sent.id, false));

    assert_eq!(accepted.status, FollowRequestStatus::Accepted);
    assert!(accepted.responded_at.is_some());
    assert!(
        h.block_on(h.profiles().is_following(asker, target))
            .expect("edge")
    );
    assert_eq!(
        again,
        Err(SocialRepositoryError::already_resolved(sent.id, "accepted"))
    );
}

#[rstest]
fn session_tokens_are_unique(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: session_tokens_are_unique skipped");
        return;
    };
    let (user, _) = h.member("alice");
    let accounts = DieselAccountRepository::new(h.pool.clone());
    let session = NewSession {
        user,
        token: "token-1".to_owned(),
        ip_address: "127.0.0.1".to_owned(),
        user_agent: "tests".to_owned(),
        expires_at: Utc::now() + Duration::hours(1),
    };

    h.block_on(accounts.open_session(&session)).expect("open");
    let duplicate = h.block_on(accounts.open_session(&session));
    let missing = SessionId::random();
    let touched = h.block_on(accounts.touch_session(missing));

    assert_eq!(duplicate, Err(AccountRepositoryError::duplicate_token()));
    assert_eq!(touched, Err(AccountRepositoryError::session_not_found(missing)));
}

#[rstest]
fn marking_read_keeps_the_first_timestamp(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: marking_read_keeps_the_first_timestamp skipped");
        return;
    };
    let (user, _) = h.member("alice");
    let notifications = DieselNotificationRepository::new(h.pool.clone());
    let draft = NewNotification::new(user, NotificationKind::Follow, "bob followed you");

    let (first, second, unread) = h.block_on(async {
        let stored = notifications.notify(&draft).await.expect("notify");
        let first = notifications.mark_read(stored.id).await.expect("first");
        let second = notifications.mark_read(stored.id).await.expect("second");
        let unread = notifications.unread_count(user).await.expect("count");
        (first, second, unread)
    });

    assert!(first.read_at.is_some());
    assert_eq!(first.read_at, second.read_at);
    assert_eq!(unread, 0);
}

#[rstest]
fn seeding_twice_creates_nothing_new(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: seeding_twice_creates_nothing_new skipped");
        return;
    };
    let settings = SeedSettings::default();

    let first = h
        .block_on(seed_catalogue(diesel_repositories(&h.pool), &settings))
        .expect("first run");
    let users = h.rows("users");
    let follows = h.rows("follows");
    let second = h
        .block_on(seed_catalogue(diesel_repositories(&h.pool), &settings))
        .expect("second run");

    assert!(first.total_created() > 0);
    assert_eq!(second.total_created(), 0);
    assert_eq!(users, 5);
    assert_eq!(follows, 16);
    assert_eq!(h.rows("users"), users);
    assert_eq!(h.rows("follows"), follows);
}

#[rstest]
fn missing_tables_surface_as_query_errors(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: missing_tables_surface_as_query_errors skipped");
        return;
    };
    drop_table(&h.database_url, "articles").expect("drop articles");

    let result = h.block_on(h.articles().list_featured());

    assert!(
        matches!(result, Err(ArticleRepositoryError::Query { .. })),
        "expected a query error, got {result:?}"
    );
}

#[rstest]
fn unfollowing_removes_only_that_direction(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: unfollowing_removes_only_that_direction skipped");
        return;
    };
    let (_, alice) = h.member("alice");
    let (_, bob) = h.member("bob");
    let profiles = h.profiles();

    let (forward, backward, removed, after, reverse) = h.block_on(async {
        profiles.follow(alice, bob).await.expect("a follows b");
        profiles.follow(bob, alice).await.expect("b follows a");
        let forward = profiles.is_following(alice, bob).await.expect("a->b");
        let backward = profiles.is_following(bob, alice).await.expect("b->a");
        let removed = profiles.unfollow(alice, bob).await.expect("unfollow");
        let after = profiles.is_following(alice, bob).await.expect("a->b after");
        let reverse = profiles.is_following(bob, alice).await.expect("b->a after");
        (forward, backward, removed, after, reverse)
    });

    assert!(forward && backward && removed);
    assert!(!after);
    assert!(reverse);
    assert_eq!(h.rows("follows"), 1);
}

#[rstest]
fn reading_list_entries_are_unique_and_prioritised(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: reading_list_entries_are_unique_and_prioritised skipped");
        return;
    };
    let (_, reader) = h.member("alice");
    let first = h.article(reader, "first");
    let second = h.article(reader, "second");
    let urgent = ReadingPriority::new(5).expect("priority");
    let engagement = h.engagement();

    let (queued, again, order) = h.block_on(async {
        let queued = engagement
            .add_to_reading_list(&NewReadingListEntry::new(reader, first))
            .await
            .expect("queue first");
        let again = engagement
            .add_to_reading_list(&NewReadingListEntry::new(reader, first))
            .await
            .expect("queue first again");
        engagement
            .add_to_reading_list(&NewReadingListEntry::new(reader, second).with_priority(urgent))
            .await
            .expect("queue second");
        let order: Vec<ArticleId> = engagement
            .reading_list(reader)
            .await
            .expect("list")
            .into_iter()
            .map(|entry| entry.article)
            .collect();
        (queued, again, order)
    });

    assert!(queued.is_created());
    assert!(!again.is_created());
    assert_eq!(again.value().id, queued.value().id);
    assert_eq!(order, vec![second, first]);
    assert_eq!(h.rows("reading_list_entries"), 2);
}

#[rstest]
fn ratings_upsert_per_profile_and_article(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: ratings_upsert_per_profile_and_article skipped");
        return;
    };
    let (_, author) = h.member("alice");
    let (_, reader) = h.member("bob");
    let rated = h.article(author, "rated");
    let engagement = h.engagement();

    let (first, second, summary) = h.block_on(async {
        let first = engagement
            .rate(rated, reader, Score::new(2).expect("score"), "meh")
            .await
            .expect("first rating");
        let second = engagement
            .rate(rated, reader, Score::new(5).expect("score"), "better")
            .await
            .expect("second rating");
        let summary = engagement.rating_summary(rated).await.expect("summary");
        (first, second, summary)
    });

    assert_eq!(first.id, second.id);
    assert_eq!(second.review, "better");
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, Some(5.0));
    assert_eq!(h.rows("article_ratings"), 1);
}

#[rstest]
fn blank_comment_edits_are_rejected(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: blank_comment_edits_are_rejected skipped");
        return;
    };
    let (_, author) = h.member("alice");
    let article = h.article(author, "edits");
    let comments = DieselCommentRepository::new(h.pool.clone());
    let draft = NewComment::new(article, author, "original").expect("comment");

    let stored = h.block_on(comments.create(&draft)).expect("create");
    let result = h.block_on(comments.edit(stored.id, "  "));

    assert_eq!(result, Err(CommentRepositoryError::empty_body()));
    let listed = h.block_on(comments.list_for_article(article)).expect("list");
    assert_eq!(listed.first().map(|c| c.body.as_str()), Some("original"));
}

#[rstest]
fn tagging_a_missing_article_is_not_found(harness: Option<Harness>) {
    let Some(h) = harness else {
        eprintln!("SKIP-TEST-CLUSTER: tagging_a_missing_article_is_not_found skipped");
        return;
    };
    let missing = ArticleId::random();

    let result = h.block_on(h.articles().set_tags(missing, &[]));

    assert_eq!(result, Err(ArticleRepositoryError::not_found(missing)));
}
