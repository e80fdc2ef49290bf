//! Behaviour-driven tests for seeding the collaboration catalogue.
//!
//! Scenarios run against the in-memory adapter, so they need no database and
//! exercise the same ports the Diesel adapters implement.

use conduit_backend::domain::Username;
use conduit_backend::domain::ports::{ArticleRepository, ProfileRepository, UserRepository};
use conduit_backend::domain::seeding::{SeedError, SeedReport};
use conduit_backend::seeding::{SeedRunError, SeedSettings, seed_catalogue};
use conduit_backend::test_support::{InMemoryStore, init_test_tracing};
use example_data::{Dataset, SeedCatalogue};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::{Builder, Runtime};

#[derive(Default, ScenarioState)]
struct SeedingWorld {
    store: Slot<InMemoryStore>,
    rows_before: Slot<usize>,
    last_result: Slot<Result<SeedReport, String>>,
    last_error: Slot<Option<Dataset>>,
}

fn runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn catalogue_usernames() -> Vec<Username> {
    SeedCatalogue::builtin()
        .expect("built-in catalogue")
        .users()
        .iter()
        .map(|seed| Username::new(&seed.username).expect("catalogue username"))
        .collect()
}

impl SeedingWorld {
    fn store(&self) -> InMemoryStore {
        self.store.get().expect("store should be created")
    }

    fn seed(&self, settings: &SeedSettings) {
        let store = self.store();
        self.rows_before.set(store.total_rows());
        let result = runtime().block_on(seed_catalogue(store.repositories(), settings));
        let missing = match &result {
            Err(SeedRunError::Seed(SeedError::MissingPrerequisite { dataset, .. })) => {
                Some(*dataset)
            }
            _ => None,
        };
        self.last_error.set(missing);
        self.last_result.set(result.map_err(|err| err.to_string()));
    }

    fn report(&self) -> SeedReport {
        self.last_result
            .get()
            .expect("seeding should have run")
            .expect("seeding should succeed")
    }
}

fn only(dataset: &str) -> SeedSettings {
    SeedSettings {
        only: Some(dataset.to_owned()),
        ..SeedSettings::default()
    }
}

#[fixture]
fn world() -> SeedingWorld {
    init_test_tracing();
    SeedingWorld::default()
}

// ============================================================================
// Given steps
// ============================================================================

#[given("an empty store")]
fn an_empty_store(world: &SeedingWorld) {
    world.store.set(InMemoryStore::new());
}

#[given("the full catalogue has already been seeded")]
fn the_catalogue_has_been_seeded(world: &SeedingWorld) {
    world.seed(&SeedSettings::default());
    world.report();
}

#[given("only the \"{dataset}\" dataset has been seeded")]
fn only_dataset_has_been_seeded(world: &SeedingWorld, dataset: String) {
    world.seed(&only(&dataset));
    world.report();
}

// ============================================================================
// When steps
// ============================================================================

#[when("the full catalogue is seeded")]
fn the_full_catalogue_is_seeded(world: &SeedingWorld) {
    world.seed(&SeedSettings::default());
}

#[when("only the \"{dataset}\" dataset is seeded")]
fn only_dataset_is_seeded(world: &SeedingWorld, dataset: String) {
    world.seed(&only(&dataset));
}

#[when("the catalogue is seeded skipping users")]
fn seeded_skipping_users(world: &SeedingWorld) {
    world.seed(&SeedSettings {
        skip_users: true,
        ..SeedSettings::default()
    });
}

// ============================================================================
// Then steps
// ============================================================================

#[then("{count:usize} catalogue users are stored")]
fn catalogue_users_are_stored(world: &SeedingWorld, count: usize) {
    let store = world.store();
    let found = runtime().block_on(async {
        let mut found = 0;
        for username in catalogue_usernames() {
            if UserRepository::find_by_username(&store, &username)
                .await
                .expect("lookup")
                .is_some()
            {
                found += 1;
            }
        }
        found
    });
    assert_eq!(found, count);
}

#[then("{count:usize} follow edges are stored")]
fn follow_edges_are_stored(world: &SeedingWorld, count: usize) {
    let store = world.store();
    let edges = runtime().block_on(async {
        let mut edges = 0;
        for username in catalogue_usernames() {
            let profile = ProfileRepository::find_by_username(&store, &username)
                .await
                .expect("lookup")
                .expect("profile exists");
            edges += store.following(profile.id).await.expect("following").len();
        }
        edges
    });
    assert_eq!(edges, count);
}

#[then("{count:usize} articles are stored")]
fn articles_are_stored(world: &SeedingWorld, count: usize) {
    let store = world.store();
    let articles = runtime().block_on(async {
        let mut articles = 0;
        for username in catalogue_usernames() {
            let profile = ProfileRepository::find_by_username(&store, &username)
                .await
                .expect("lookup")
                .expect("profile exists");
            articles += store
                .list_by_author(profile.id)
                .await
                .expect("articles")
                .len();
        }
        articles
    });
    assert_eq!(articles, count);
}

#[then("the run created new records")]
fn the_run_created_records(world: &SeedingWorld) {
    assert!(world.report().total_created() > 0);
}

#[then("the run created no records")]
fn the_run_created_nothing(world: &SeedingWorld) {
    assert_eq!(world.report().total_created(), 0);
}

#[then("the stored row count is unchanged")]
fn the_row_count_is_unchanged(world: &SeedingWorld) {
    let before = world.rows_before.get().expect("row count recorded");
    assert_eq!(world.store().total_rows(), before);
}

#[then("seeding fails asking for the \"{dataset}\" dataset")]
fn seeding_fails_asking_for(world: &SeedingWorld, dataset: String) {
    let result = world.last_result.get().expect("seeding should have run");
    assert!(result.is_err(), "expected failure, got {result:?}");
    let missing = world.last_error.get().flatten().expect("missing prerequisite");
    assert_eq!(missing.as_str(), dataset);
}

#[then("the report has no users entry")]
fn the_report_has_no_users(world: &SeedingWorld) {
    assert_eq!(world.report().counts(Dataset::Users), None);
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(
    path = "tests/features/collaboration_seeding.feature",
    name = "Seeding an empty store loads the whole catalogue"
)]
fn seeding_loads_the_catalogue(world: SeedingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/collaboration_seeding.feature",
    name = "Re-running the seed creates nothing"
)]
fn reseeding_creates_nothing(world: SeedingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/collaboration_seeding.feature",
    name = "Seeding articles before users fails"
)]
fn articles_before_users_fails(world: SeedingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/collaboration_seeding.feature",
    name = "Skipping users after a user seed"
)]
fn skipping_users_after_user_seed(world: SeedingWorld) {
    let _ = world;
}
