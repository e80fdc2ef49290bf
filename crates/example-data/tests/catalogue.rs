//! Integration tests for loading catalogues from disk.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use camino::Utf8PathBuf;
use example_data::{NotificationKindSeed, SeedCatalogue};
use rstest::{fixture, rstest};

#[fixture]
fn fixture_path() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/collaboration.json")
}

#[rstest]
fn file_catalogue_matches_builtin(fixture_path: Utf8PathBuf) {
    let from_file = SeedCatalogue::from_file(&fixture_path).expect("fixture file loads");
    let builtin = SeedCatalogue::builtin().expect("builtin catalogue");

    assert_eq!(from_file, builtin);
}

#[rstest]
fn follow_graph_is_directed(fixture_path: Utf8PathBuf) {
    let catalogue = SeedCatalogue::from_file(&fixture_path).expect("fixture file loads");
    let follows = catalogue.follows();

    let has_edge = |follower: &str, followed: &str| {
        follows
            .iter()
            .any(|edge| edge.follower == follower && edge.followed == followed)
    };

    assert!(has_edge("alice", "bob"));
    assert!(
        follows
            .iter()
            .all(|edge| edge.follower != edge.followed),
        "demo graph has no self edges"
    );
}

#[rstest]
fn notifications_cover_several_kinds(fixture_path: Utf8PathBuf) {
    let catalogue = SeedCatalogue::from_file(&fixture_path).expect("fixture file loads");
    let kinds = catalogue
        .notifications()
        .iter()
        .map(|notification| notification.kind);

    assert!(kinds.clone().any(|kind| kind == NotificationKindSeed::Follow));
    assert!(kinds.clone().any(|kind| kind == NotificationKindSeed::Comment));
    assert!(kinds.into_iter().count() > 2);
}

#[rstest]
fn threads_reference_known_articles(fixture_path: Utf8PathBuf) {
    let catalogue = SeedCatalogue::from_file(&fixture_path).expect("fixture file loads");

    for thread in catalogue.comments() {
        assert!(
            catalogue.article(&thread.article).is_some(),
            "thread on {} resolves",
            thread.article
        );
    }
}
