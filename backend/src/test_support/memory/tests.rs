//! Behavioural checks for the in-memory adapter.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, CommentRepository, CommentRepositoryError,
    EngagementRepository, ProfileRepository, RevisionRepository, SocialRepository,
    SocialRepositoryError, UserRepository,
};
use crate::domain::{
    EmailAddress, FollowRequestStatus, ImageUrl, NewArticle, NewBookmarkCollection, NewComment,
    NewFollowRequest, NewReadingListEntry, NewUser, PasswordHash, ProfileDraft, ReadingPriority,
    RevisionSnapshot, Score, Slug, Username, VersionNumber,
};

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn member(store: &InMemoryStore, name: &str) -> (UserId, ProfileId) {
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
    let profile = store
        .get_or_create_for_user(user.id, &draft)
        .await
        .expect("profile")
        .into_inner();
    (user.id, profile.id)
}

async fn article(store: &InMemoryStore, author: ProfileId, slug: &str) -> ArticleId {
    let draft = NewArticle::new(
        Slug::new(slug).expect("slug"),
        "Title",
        "Description",
        "Body",
        author,
    )
    .expect("draft");
    ArticleRepository::create(store, &draft)
        .await
        .expect("article")
        .id
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_cascades_to_authored_content(store: InMemoryStore) {
    let (user, profile) = member(&store, "alice").await;
    let article_id = article(&store, profile, "first-post").await;
    let comment = NewComment::new(article_id, profile, "hello").expect("comment");
    CommentRepository::create(&store, &comment)
        .await
        .expect("comment");

    assert!(UserRepository::delete(&store, user).await.expect("delete"));

    assert_eq!(store.total_rows(), 0);
}

#[rstest]
#[tokio::test]
async fn deleting_a_comment_removes_its_replies(store: InMemoryStore) {
    let (_, profile) = member(&store, "alice").await;
    let article_id = article(&store, profile, "thread").await;
    let root = CommentRepository::create(
        &store,
        &NewComment::new(article_id, profile, "root").expect("root"),
    )
    .await
    .expect("root");
    let reply = CommentRepository::create(
        &store,
        &NewComment::new(article_id, profile, "reply")
            .expect("reply")
            .replying_to(root.id),
    )
    .await
    .expect("reply");
    CommentRepository::create(
        &store,
        &NewComment::new(article_id, profile, "nested")
            .expect("nested")
            .replying_to(reply.id),
    )
    .await
    .expect("nested");

    assert!(CommentRepository::delete(&store, root.id).await.expect("delete"));
    let remaining = store
        .list_for_article(article_id)
        .await
        .expect("list");
    assert!(remaining.is_empty());
}

#[rstest]
#[tokio::test]
async fn appended_revisions_number_sequentially(store: InMemoryStore) {
    let (_, profile) = member(&store, "alice").await;
    let article_id = article(&store, profile, "versions").await;
    let snapshot = RevisionSnapshot::new("t", "d", "b");

    for _ in 0..3 {
        store
            .append(article_id, &snapshot, Some(profile), "edit")
            .await
            .expect("append");
    }

    let history = RevisionRepository::list(&store, article_id)
        .await
        .expect("list");
    let versions: Vec<u32> = history.iter().map(|r| r.version.get()).collect();
    assert_eq!(versions, vec![3, 2, 1]);
    let latest = store.latest(article_id).await.expect("latest");
    assert_eq!(
        latest.map(|r| r.version),
        Some(VersionNumber::new(3).expect("version"))
    );
}

#[rstest]
#[tokio::test]
async fn follow_requests_resolve_once(store: InMemoryStore) {
    let (_, asker) = member(&store, "alice").await;
    let (_, target) = member(&store, "bob").await;
    let request = NewFollowRequest::new(asker, target, "hi").expect("request");
    let sent = store
        .send_follow_request(&request)
        .await
        .expect("send")
        .into_inner();

    let accepted = store.respond(sent.id, true).await.expect("accept");
    assert_eq!(accepted.status, FollowRequestStatus::Accepted);
    assert!(store.is_following(asker, target).await.expect("edge"));

    let again = store.respond(sent.id, false).await;
    assert_eq!(
        again,
        Err(SocialRepositoryError::already_resolved(sent.id, "accepted"))
    );
}

#[rstest]
fn timestamps_are_strictly_increasing(store: InMemoryStore) {
    let mut state = store.lock();
    let first = state.now();
    let second = state.now();
    assert!(second > first);
}

#[rstest]
#[tokio::test]
async fn following_is_directional_and_reversible(store: InMemoryStore) {
    let (_, alice) = member(&store, "alice").await;
    let (_, bob) = member(&store, "bob").await;

    assert!(store.follow(alice, bob).await.expect("follow").is_created());
    assert!(!store.follow(alice, bob).await.expect("again").is_created());
    assert!(store.is_following(alice, bob).await.expect("a->b"));
    assert!(!store.is_following(bob, alice).await.expect("b->a"));
    assert!(store.is_followed_by(bob, alice).await.expect("followed by"));

    assert!(store.unfollow(alice, bob).await.expect("unfollow"));
    assert!(!store.unfollow(alice, bob).await.expect("unfollow again"));
    assert!(!store.is_following(alice, bob).await.expect("a->b after"));
    assert!(store.followers(bob).await.expect("followers").is_empty());
}

#[rstest]
#[tokio::test]
async fn reading_list_holds_one_entry_per_article(store: InMemoryStore) {
    let (_, reader) = member(&store, "alice").await;
    let first = article(&store, reader, "first").await;
    let second = article(&store, reader, "second").await;
    let third = article(&store, reader, "third").await;
    let urgent = ReadingPriority::new(5).expect("priority");

    let queued = store
        .add_to_reading_list(&NewReadingListEntry::new(reader, first))
        .await
        .expect("first");
    let again = store
        .add_to_reading_list(&NewReadingListEntry::new(reader, first).with_priority(urgent))
        .await
        .expect("again");
    store
        .add_to_reading_list(&NewReadingListEntry::new(reader, second))
        .await
        .expect("second");
    store
        .add_to_reading_list(&NewReadingListEntry::new(reader, third).with_priority(urgent))
        .await
        .expect("third");

    assert!(queued.is_created());
    assert!(!again.is_created());
    assert_eq!(again.value().id, queued.value().id);
    let order: Vec<ArticleId> = store
        .reading_list(reader)
        .await
        .expect("list")
        .into_iter()
        .map(|entry| entry.article)
        .collect();
    assert_eq!(order, vec![third, second, first]);
}

#[rstest]
#[tokio::test]
async fn reading_an_entry_stamps_it_once(store: InMemoryStore) {
    let (_, reader) = member(&store, "alice").await;
    let queued = article(&store, reader, "later").await;
    let entry = store
        .add_to_reading_list(&NewReadingListEntry::new(reader, queued))
        .await
        .expect("queue")
        .into_inner();

    let first = EngagementRepository::mark_read(&store, entry.id)
        .await
        .expect("first");
    let second = EngagementRepository::mark_read(&store, entry.id)
        .await
        .expect("second");

    assert!(first.is_read);
    assert!(first.read_at.is_some());
    assert_eq!(first.read_at, second.read_at);
    assert!(
        store
            .remove_from_reading_list(reader, queued)
            .await
            .expect("remove")
    );
    assert!(store.reading_list(reader).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn rating_twice_replaces_the_score(store: InMemoryStore) {
    let (_, author) = member(&store, "alice").await;
    let (_, reader) = member(&store, "bob").await;
    let rated = article(&store, author, "rated").await;
    let low = Score::new(2).expect("score");
    let high = Score::new(5).expect("score");

    let first = store.rate(rated, reader, low, "meh").await.expect("first");
    let second = store.rate(rated, reader, high, "better").await.expect("second");

    assert_eq!(first.id, second.id);
    assert_eq!(second.score, high);
    let summary = store.rating_summary(rated).await.expect("summary");
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, Some(5.0));
    let stored = store.rating_for(rated, reader).await.expect("rating");
    assert_eq!(stored.map(|r| r.review), Some("better".to_owned()));
}

#[rstest]
#[tokio::test]
async fn collections_keep_articles_newest_first(store: InMemoryStore) {
    let (_, owner) = member(&store, "alice").await;
    let older = article(&store, owner, "older").await;
    let newer = article(&store, owner, "newer").await;
    let collection = store
        .create_collection(&NewBookmarkCollection::new(owner, "Favourites"))
        .await
        .expect("collection");

    assert!(store.add_to_collection(collection.id, older).await.expect("older"));
    assert!(store.add_to_collection(collection.id, newer).await.expect("newer"));
    assert!(!store.add_to_collection(collection.id, older).await.expect("dup"));

    let ids: Vec<ArticleId> = store
        .collection_articles(collection.id)
        .await
        .expect("articles")
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![newer, older]);
    assert!(
        store
            .remove_from_collection(collection.id, newer)
            .await
            .expect("remove")
    );
    let owned = store.collections_for(owner).await.expect("collections");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].name, "Favourites");
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn editing_to_a_blank_body_is_rejected(store: InMemoryStore, #[case] body: &str) {
    let (_, profile) = member(&store, "alice").await;
    let article_id = article(&store, profile, "edits").await;
    let comment = CommentRepository::create(
        &store,
        &NewComment::new(article_id, profile, "original").expect("comment"),
    )
    .await
    .expect("comment");

    let result = store.edit(comment.id, body).await;

    assert_eq!(result, Err(CommentRepositoryError::empty_body()));
    let stored = store.list_for_article(article_id).await.expect("list");
    assert_eq!(stored[0].body, "original");
    assert!(!stored[0].is_edited);
}

#[rstest]
#[tokio::test]
async fn tagging_a_missing_article_is_not_found(store: InMemoryStore) {
    let missing = ArticleId::random();

    let result = store.set_tags(missing, &[]).await;

    assert_eq!(result, Err(ArticleRepositoryError::not_found(missing)));
}
