//! Behavioural tests for the example-data crate.
//!
//! Scenarios cover loading the built-in catalogue, rejecting invalid
//! catalogues, and building seed plans from dataset names.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use example_data::{CatalogueError, Dataset, DatasetParseError, SeedCatalogue, SeedPlan};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};

const DANGLING_AUTHOR_JSON: &str = r#"{
    "version": 1,
    "users": [{"username": "alice", "email": "alice@example.com", "password": "pw"}],
    "articles": [{
        "slug": "orphan",
        "title": "Orphan",
        "description": "No author",
        "body": "Body",
        "author": "mallory"
    }]
}"#;

#[derive(Default, ScenarioState)]
struct World {
    json_input: Slot<String>,
    catalogue_result: Slot<Result<SeedCatalogue, CatalogueError>>,
    dataset_result: Slot<Result<Dataset, DatasetParseError>>,
    plan: Slot<SeedPlan>,
}

impl World {
    fn catalogue(&self) -> SeedCatalogue {
        self.catalogue_result
            .get()
            .expect("catalogue result should be set")
            .expect("catalogue should be valid")
    }

    fn catalogue_result(&self) -> Result<SeedCatalogue, CatalogueError> {
        self.catalogue_result
            .get()
            .expect("catalogue result should be set")
    }

    fn plan_names(&self) -> Vec<&'static str> {
        self.plan
            .get()
            .expect("plan should be built")
            .datasets()
            .iter()
            .map(|dataset| dataset.as_str())
            .collect()
    }
}

#[fixture]
fn world() -> World {
    World::default()
}

// ============================================================================
// Given steps
// ============================================================================

#[given("the built-in catalogue")]
fn the_builtin_catalogue(world: &World) {
    world.catalogue_result.set(SeedCatalogue::builtin());
}

#[given("catalogue JSON whose article author is not a user")]
fn catalogue_json_with_dangling_author(world: &World) {
    world.json_input.set(DANGLING_AUTHOR_JSON.to_owned());
}

#[given("malformed JSON")]
fn malformed_json(world: &World) {
    world.json_input.set("{ \"version\": 1, ".to_owned());
}

#[given("the dataset name \"{name}\"")]
fn the_dataset_name(world: &World, name: String) {
    world.dataset_result.set(name.parse::<Dataset>());
}

// ============================================================================
// When steps
// ============================================================================

#[when("the catalogue is parsed")]
fn the_catalogue_is_parsed(world: &World) {
    let json = world.json_input.get().expect("JSON input should be set");
    world.catalogue_result.set(SeedCatalogue::from_json(&json));
}

#[when("a seed plan is built for only that dataset while skipping users")]
fn a_plan_for_only_that_dataset(world: &World) {
    let dataset = world
        .dataset_result
        .get()
        .expect("dataset should be parsed")
        .expect("dataset name should be valid");
    world.plan.set(SeedPlan::new(Some(dataset), true));
}

#[when("a seed plan is built skipping users")]
fn a_plan_skipping_users(world: &World) {
    world.plan.set(SeedPlan::new(None, true));
}

// ============================================================================
// Then steps
// ============================================================================

#[then("the catalogue holds {users:usize} users and {articles:usize} articles")]
fn the_catalogue_holds(world: &World, users: usize, articles: usize) {
    let catalogue = world.catalogue();
    assert_eq!(catalogue.users().len(), users);
    assert_eq!(catalogue.articles().len(), articles);
}

#[then("every article revision history starts at version 1")]
fn revision_history_starts_at_one(world: &World) {
    for article in world.catalogue().articles() {
        let first = article
            .revisions
            .first()
            .expect("every demo article has history");
        assert_eq!(first.version, 1, "article {}", article.slug);
    }
}

#[then("parsing fails with an unknown user error")]
fn parsing_fails_with_unknown_user(world: &World) {
    match world.catalogue_result() {
        Err(CatalogueError::UnknownUser { username, .. }) => assert_eq!(username, "mallory"),
        other => panic!("Expected UnknownUser, got: {other:?}"),
    }
}

#[then("parsing fails with a parse error")]
fn parsing_fails_with_parse_error(world: &World) {
    match world.catalogue_result() {
        Err(CatalogueError::ParseError { .. }) => {}
        other => panic!("Expected ParseError, got: {other:?}"),
    }
}

#[then("the plan contains only \"{name}\"")]
fn the_plan_contains_only(world: &World, name: String) {
    assert_eq!(world.plan_names(), vec![name.as_str()]);
}

#[then("the plan is \"{names}\"")]
fn the_plan_is(world: &World, names: String) {
    let expected: Vec<&str> = names.split(',').collect();
    assert_eq!(world.plan_names(), expected);
}

#[then("the dataset name is rejected")]
fn the_dataset_name_is_rejected(world: &World) {
    let result = world.dataset_result.get().expect("dataset should be parsed");
    assert!(result.is_err(), "expected rejection, got {result:?}");
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(path = "tests/features/example_data.feature", name = "Built-in catalogue loads")]
fn builtin_catalogue_loads(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/example_data.feature",
    name = "Dangling author is rejected"
)]
fn dangling_author_is_rejected(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/example_data.feature",
    name = "Malformed JSON is rejected"
)]
fn malformed_json_is_rejected(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/example_data.feature",
    name = "Only one dataset is selected"
)]
fn only_one_dataset_is_selected(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/example_data.feature",
    name = "Skipping users keeps the remaining datasets in order"
)]
fn skipping_users_keeps_order(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/example_data.feature",
    name = "Unknown dataset names are rejected"
)]
fn unknown_dataset_names_are_rejected(world: World) {
    let _ = world;
}
