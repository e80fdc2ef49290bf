//! Unit tests for seeding orchestration against mocked ports.

use example_data::{Dataset, SeedCatalogue, SeedPlan};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAccountRepository, MockArticleRepository, MockCommentRepository,
    MockNotificationRepository, MockProfileRepository, MockRevisionRepository,
    MockUserRepository,
};

#[fixture]
fn catalogue() -> SeedCatalogue {
    SeedCatalogue::builtin().expect("built-in catalogue is valid")
}

struct Mocks {
    users: MockUserRepository,
    profiles: MockProfileRepository,
    articles: MockArticleRepository,
}

impl Mocks {
    fn new() -> Self {
        Self {
            users: MockUserRepository::new(),
            profiles: MockProfileRepository::new(),
            articles: MockArticleRepository::new(),
        }
    }

    fn into_seeder(self) -> CollaborationSeeder {
        CollaborationSeeder::new(SeedRepositories {
            users: Arc::new(self.users),
            profiles: Arc::new(self.profiles),
            articles: Arc::new(self.articles),
            revisions: Arc::new(MockRevisionRepository::new()),
            comments: Arc::new(MockCommentRepository::new()),
            notifications: Arc::new(MockNotificationRepository::new()),
            accounts: Arc::new(MockAccountRepository::new()),
        })
    }
}

#[rstest]
#[tokio::test]
async fn relationships_without_profiles_name_the_users_dataset(catalogue: SeedCatalogue) {
    let mut mocks = Mocks::new();
    mocks
        .profiles
        .expect_find_by_username()
        .times(1)
        .returning(|_| Ok(None));
    mocks.profiles.expect_follow().times(0);

    let plan = SeedPlan::new(Some(Dataset::Relationships), false);
    let error = mocks
        .into_seeder()
        .run(&catalogue, &plan)
        .await
        .expect_err("profiles are missing");

    assert!(matches!(
        error,
        SeedError::MissingPrerequisite {
            dataset: Dataset::Users,
            ..
        }
    ));
    assert!(error.to_string().contains("seed the users dataset first"));
}

#[rstest]
#[tokio::test]
async fn comments_without_articles_name_the_articles_dataset(catalogue: SeedCatalogue) {
    let mut mocks = Mocks::new();
    mocks
        .articles
        .expect_find_by_slug()
        .times(1)
        .returning(|_| Ok(None));

    let plan = SeedPlan::new(Some(Dataset::Comments), false);
    let error = mocks
        .into_seeder()
        .run(&catalogue, &plan)
        .await
        .expect_err("articles are missing");

    match error {
        SeedError::MissingPrerequisite { dataset, detail } => {
            assert_eq!(dataset, Dataset::Articles);
            assert!(detail.starts_with("article '"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[tokio::test]
async fn repository_failures_abort_the_run(catalogue: SeedCatalogue) {
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_username()
        .times(1)
        .returning(|_| Err(UserPersistenceError::connection("pool exhausted")));
    mocks.users.expect_get_or_create().times(0);

    let plan = SeedPlan::new(Some(Dataset::Users), false);
    let error = mocks
        .into_seeder()
        .run(&catalogue, &plan)
        .await
        .expect_err("connection failure");

    assert!(matches!(
        error,
        SeedError::Users(UserPersistenceError::Connection { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn empty_catalogue_touches_nothing() {
    let plan = SeedPlan::new(Some(Dataset::Relationships), false);
    let empty = SeedCatalogue::from_json(r#"{"version": 1, "users": []}"#).expect("empty catalogue");

    let report = Mocks::new()
        .into_seeder()
        .run(&empty, &plan)
        .await
        .expect("nothing to seed");

    assert_eq!(report.counts(Dataset::Relationships), Some(SeedCounts::default()));
    assert_eq!(report.total_created(), 0);
}

#[test]
fn counts_tally_insertions() {
    let mut counts = SeedCounts::default();
    counts.tally(&Insertion::Created(()));
    counts.tally(&Insertion::Existing(()));
    counts.tally(&Insertion::Existing(()));

    assert_eq!(counts.created, 1);
    assert_eq!(counts.existing, 2);
    assert_eq!(counts.total(), 3);
}

#[rstest]
#[case(NotificationKindSeed::Follow, NotificationKind::Follow)]
#[case(NotificationKindSeed::Mention, NotificationKind::Mention)]
#[case(NotificationKindSeed::Reply, NotificationKind::Reply)]
fn fixture_kinds_map_to_domain_kinds(
    #[case] seed: NotificationKindSeed,
    #[case] expected: NotificationKind,
) {
    assert_eq!(notification_kind(seed), expected);
}
