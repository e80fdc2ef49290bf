//! Behaviour-driven tests for follow requests and blocking.

use std::collections::HashMap;

use conduit_backend::domain::ports::{
    ProfileRepository, SocialRepository, SocialRepositoryError, UserRepository,
};
use conduit_backend::domain::{
    EmailAddress, FollowRequest, ImageUrl, NewBlock, NewFollowRequest, NewUser, PasswordHash,
    ProfileDraft, ProfileId, Username,
};
use conduit_backend::test_support::InMemoryStore;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::{Builder, Runtime};

#[derive(Default, ScenarioState)]
struct SocialWorld {
    store: Slot<InMemoryStore>,
    members: Slot<HashMap<String, ProfileId>>,
    request: Slot<FollowRequest>,
}

fn runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

impl SocialWorld {
    fn store(&self) -> InMemoryStore {
        self.store.get().expect("store should be created")
    }

    fn profile(&self, name: &str) -> ProfileId {
        self.members
            .get()
            .and_then(|members| members.get(name).copied())
            .unwrap_or_else(|| panic!("member {name} should exist"))
    }

    fn request(&self) -> FollowRequest {
        self.request.get().expect("a request should have been sent")
    }
}

async fn register(store: &InMemoryStore, name: &str) -> ProfileId {
    let user = NewUser::new(
        Username::new(name).expect("username"),
        EmailAddress::new(format!("{name}@example.com")).expect("email"),
        PasswordHash::unusable(),
    );
    let user = store.create_user(&user).await.expect("user");
    let draft = ProfileDraft {
        bio: String::new(),
        image: ImageUrl::none(),
    };
    store
        .get_or_create_for_user(user.id, &draft)
        .await
        .expect("profile")
        .into_inner()
        .id
}

#[fixture]
fn world() -> SocialWorld {
    SocialWorld::default()
}

// ============================================================================
// Given steps
// ============================================================================

#[given("members \"{first}\" and \"{second}\"")]
fn members(world: &SocialWorld, first: String, second: String) {
    let store = InMemoryStore::new();
    let members = runtime().block_on(async {
        let mut members = HashMap::new();
        for name in [first, second] {
            let profile = register(&store, &name).await;
            members.insert(name, profile);
        }
        members
    });
    world.store.set(store);
    world.members.set(members);
}

// ============================================================================
// When steps
// ============================================================================

#[when("\"{asker}\" asks to follow \"{target}\"")]
fn asks_to_follow(world: &SocialWorld, asker: String, target: String) {
    let draft = NewFollowRequest::new(world.profile(&asker), world.profile(&target), "")
        .expect("follow request");
    let sent = runtime()
        .block_on(world.store().send_follow_request(&draft))
        .expect("send request");
    assert!(sent.is_created());
    world.request.set(sent.into_inner());
}

#[when("\"{target}\" accepts the request")]
fn accepts_the_request(world: &SocialWorld, target: String) {
    let request = world.request();
    assert_eq!(request.to, world.profile(&target));
    let answered = runtime()
        .block_on(world.store().respond(request.id, true))
        .expect("accept");
    world.request.set(answered);
}

#[when("\"{target}\" rejects the request")]
fn rejects_the_request(world: &SocialWorld, target: String) {
    let request = world.request();
    assert_eq!(request.to, world.profile(&target));
    let answered = runtime()
        .block_on(world.store().respond(request.id, false))
        .expect("reject");
    world.request.set(answered);
}

#[when("\"{blocker}\" blocks \"{blocked}\"")]
fn blocks(world: &SocialWorld, blocker: String, blocked: String) {
    let block = NewBlock::new(world.profile(&blocker), world.profile(&blocked), "spam")
        .expect("block");
    runtime()
        .block_on(world.store().block(&block))
        .expect("block");
}

// ============================================================================
// Then steps
// ============================================================================

fn following(world: &SocialWorld, follower: &str, followed: &str) -> bool {
    runtime()
        .block_on(
            world
                .store()
                .is_following(world.profile(follower), world.profile(followed)),
        )
        .expect("follow lookup")
}

fn blocked(world: &SocialWorld, blocker: &str, target: &str) -> bool {
    runtime()
        .block_on(
            world
                .store()
                .is_blocked(world.profile(blocker), world.profile(target)),
        )
        .expect("block lookup")
}

#[then("\"{follower}\" follows \"{followed}\"")]
fn follows(world: &SocialWorld, follower: String, followed: String) {
    assert!(following(world, &follower, &followed));
}

#[then("\"{follower}\" does not follow \"{followed}\"")]
fn does_not_follow(world: &SocialWorld, follower: String, followed: String) {
    assert!(!following(world, &follower, &followed));
}

#[then("the request can no longer be answered")]
fn the_request_is_resolved(world: &SocialWorld) {
    let request = world.request();
    let result = runtime().block_on(world.store().respond(request.id, false));
    assert_eq!(
        result,
        Err(SocialRepositoryError::already_resolved(
            request.id,
            request.status.as_str()
        ))
    );
}

#[then("\"{member}\" has no pending requests")]
fn has_no_pending_requests(world: &SocialWorld, member: String) {
    let pending = runtime()
        .block_on(world.store().pending_for(world.profile(&member)))
        .expect("pending requests");
    assert!(pending.is_empty(), "unexpected requests: {pending:?}");
}

#[then("\"{blocker}\" has blocked \"{target}\"")]
fn has_blocked(world: &SocialWorld, blocker: String, target: String) {
    assert!(blocked(world, &blocker, &target));
}

#[then("\"{blocker}\" has not blocked \"{target}\"")]
fn has_not_blocked(world: &SocialWorld, blocker: String, target: String) {
    assert!(!blocked(world, &blocker, &target));
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(
    path = "tests/features/social_graph.feature",
    name = "Accepting a follow request creates the follow"
)]
fn accepting_creates_the_follow(world: SocialWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/social_graph.feature",
    name = "Rejecting a follow request leaves no follow"
)]
fn rejecting_leaves_no_follow(world: SocialWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/social_graph.feature",
    name = "Blocking is directional"
)]
fn blocking_is_directional(world: SocialWorld) {
    let _ = world;
}
