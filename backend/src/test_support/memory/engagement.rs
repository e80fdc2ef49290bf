//! Engagement, notification, and social ports over the in-memory tables.

use async_trait::async_trait;

use super::{InMemoryStore, State};
use crate::domain::ports::{
    EngagementRepository, EngagementRepositoryError, NotificationRepository,
    NotificationRepositoryError, SocialRepository, SocialRepositoryError,
};
use crate::domain::{
    Article, ArticleId, ArticleRating, Badge, BadgeId, BlockId, BookmarkCollection,
    CollectionId, FollowEdge, FollowRequest, FollowRequestId, FollowRequestStatus, Insertion,
    NewBadge, NewBlock, NewBookmarkCollection, NewFollowRequest, NewNotification,
    NewReadingListEntry, Notification, NotificationId, ProfileBadge, ProfileBadgeId, ProfileId,
    RatingId, RatingSummary, ReadingListEntry, ReadingListEntryId, Score, UserBlock, UserId,
};

impl State {
    fn engagement_references(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<(), EngagementRepositoryError> {
        if !self.profile_exists(profile) {
            return Err(EngagementRepositoryError::missing_reference(format!(
                "profile {profile}"
            )));
        }
        if !self.article_exists(article) {
            return Err(EngagementRepositoryError::missing_reference(format!(
                "article {article}"
            )));
        }
        Ok(())
    }

    fn insert_notification(
        &mut self,
        draft: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let missing = std::iter::once(draft.recipient)
            .chain(draft.actor)
            .find(|user| !self.user_exists(*user));
        if let Some(user) = missing {
            return Err(NotificationRepositoryError::missing_reference(format!(
                "user {user}"
            )));
        }
        let now = self.now();
        let notification = Notification {
            id: NotificationId::random(),
            recipient: draft.recipient,
            actor: draft.actor,
            kind: draft.kind,
            message: draft.message.clone(),
            link: draft.link.clone(),
            is_read: draft.is_read,
            read_at: draft.is_read.then_some(now),
            created_at: now,
        };
        self.notifications.push(notification.clone());
        Ok(notification)
    }

    fn social_references(&self, profiles: &[ProfileId]) -> Result<(), SocialRepositoryError> {
        match profiles.iter().find(|id| !self.profile_exists(**id)) {
            Some(missing) => Err(SocialRepositoryError::missing_reference(format!(
                "profile {missing}"
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EngagementRepository for InMemoryStore {
    async fn rate(
        &self,
        article: ArticleId,
        profile: ProfileId,
        score: Score,
        review: &str,
    ) -> Result<ArticleRating, EngagementRepositoryError> {
        let mut state = self.lock();
        state.engagement_references(profile, article)?;
        let now = state.now();
        if let Some(existing) = state
            .ratings
            .iter_mut()
            .find(|r| r.article == article && r.profile == profile)
        {
            existing.score = score;
            review.clone_into(&mut existing.review);
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let rating = ArticleRating {
            id: RatingId::random(),
            article,
            profile,
            score,
            review: review.to_owned(),
            created_at: now,
            updated_at: now,
        };
        state.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn rating_for(
        &self,
        article: ArticleId,
        profile: ProfileId,
    ) -> Result<Option<ArticleRating>, EngagementRepositoryError> {
        Ok(self
            .lock()
            .ratings
            .iter()
            .find(|r| r.article == article && r.profile == profile)
            .cloned())
    }

    async fn rating_summary(
        &self,
        article: ArticleId,
    ) -> Result<RatingSummary, EngagementRepositoryError> {
        let state = self.lock();
        Ok(RatingSummary::from_scores(
            state
                .ratings
                .iter()
                .filter(|r| r.article == article)
                .map(|r| r.score),
        ))
    }

    async fn add_to_reading_list(
        &self,
        entry: &NewReadingListEntry,
    ) -> Result<Insertion<ReadingListEntry>, EngagementRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .reading_list
            .iter()
            .find(|e| e.profile == entry.profile && e.article == entry.article)
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.engagement_references(entry.profile, entry.article)?;
        let stored = ReadingListEntry {
            id: ReadingListEntryId::random(),
            profile: entry.profile,
            article: entry.article,
            priority: entry.priority,
            notes: entry.notes.clone(),
            is_read: false,
            read_at: None,
            created_at: state.now(),
        };
        state.reading_list.push(stored.clone());
        Ok(Insertion::Created(stored))
    }

    async fn mark_read(
        &self,
        entry: ReadingListEntryId,
    ) -> Result<ReadingListEntry, EngagementRepositoryError> {
        let mut state = self.lock();
        let now = state.now();
        let stored = state
            .reading_list
            .iter_mut()
            .find(|e| e.id == entry)
            .ok_or_else(|| EngagementRepositoryError::entry_not_found(entry))?;
        if !stored.is_read {
            stored.is_read = true;
            stored.read_at = Some(now);
        }
        Ok(stored.clone())
    }

    async fn reading_list(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<ReadingListEntry>, EngagementRepositoryError> {
        let mut entries: Vec<ReadingListEntry> = self
            .lock()
            .reading_list
            .iter()
            .filter(|e| e.profile == profile)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(entries)
    }

    async fn remove_from_reading_list(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut state = self.lock();
        let before = state.reading_list.len();
        state
            .reading_list
            .retain(|e| !(e.profile == profile && e.article == article));
        Ok(state.reading_list.len() < before)
    }

    async fn create_collection(
        &self,
        collection: &NewBookmarkCollection,
    ) -> Result<BookmarkCollection, EngagementRepositoryError> {
        let mut state = self.lock();
        if !state.profile_exists(collection.owner) {
            return Err(EngagementRepositoryError::missing_reference(format!(
                "profile {}",
                collection.owner
            )));
        }
        let now = state.now();
        let stored = BookmarkCollection {
            id: CollectionId::random(),
            owner: collection.owner,
            name: collection.name.clone(),
            description: collection.description.clone(),
            is_public: collection.is_public,
            colour: collection.colour.clone(),
            created_at: now,
            updated_at: now,
        };
        state.collections.push(stored.clone());
        Ok(stored)
    }

    async fn add_to_collection(
        &self,
        collection: CollectionId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut state = self.lock();
        if !state.collections.iter().any(|c| c.id == collection) {
            return Err(EngagementRepositoryError::collection_not_found(collection));
        }
        if !state.article_exists(article) {
            return Err(EngagementRepositoryError::missing_reference(format!(
                "article {article}"
            )));
        }
        if state
            .collection_articles
            .iter()
            .any(|(c, a, _)| *c == collection && *a == article)
        {
            return Ok(false);
        }
        let now = state.now();
        state.collection_articles.push((collection, article, now));
        Ok(true)
    }

    async fn remove_from_collection(
        &self,
        collection: CollectionId,
        article: ArticleId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut state = self.lock();
        let before = state.collection_articles.len();
        state
            .collection_articles
            .retain(|(c, a, _)| !(*c == collection && *a == article));
        Ok(state.collection_articles.len() < before)
    }

    async fn collections_for(
        &self,
        owner: ProfileId,
    ) -> Result<Vec<BookmarkCollection>, EngagementRepositoryError> {
        let mut collections: Vec<BookmarkCollection> = self
            .lock()
            .collections
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect();
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    async fn collection_articles(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<Article>, EngagementRepositoryError> {
        let state = self.lock();
        let mut links: Vec<_> = state
            .collection_articles
            .iter()
            .filter(|(c, _, _)| *c == collection)
            .collect();
        links.sort_by(|a, b| b.2.cmp(&a.2));
        Ok(links
            .into_iter()
            .filter_map(|(_, article, _)| state.articles.iter().find(|a| a.id == *article))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn notify(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        self.lock().insert_notification(notification)
    }

    async fn get_or_create(
        &self,
        notification: &NewNotification,
    ) -> Result<Insertion<Notification>, NotificationRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.notifications.iter().find(|n| {
            n.recipient == notification.recipient
                && n.kind == notification.kind
                && n.message == notification.message
                && n.actor == notification.actor
        }) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state
            .insert_notification(notification)
            .map(Insertion::Created)
    }

    async fn list_for(
        &self,
        recipient: UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut notifications: Vec<Notification> = self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notifications)
    }

    async fn unread_count(&self, recipient: UserId) -> Result<u64, NotificationRepositoryError> {
        let unread = self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .count();
        u64::try_from(unread).map_err(|err| NotificationRepositoryError::query(err.to_string()))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut state = self.lock();
        let now = state.now();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| NotificationRepositoryError::not_found(id))?;
        if !notification.is_read {
            notification.is_read = true;
            notification.read_at = Some(now);
        }
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, NotificationRepositoryError> {
        let mut state = self.lock();
        let now = state.now();
        let mut changed = 0_u64;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
        {
            notification.is_read = true;
            notification.read_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl SocialRepository for InMemoryStore {
    async fn send_follow_request(
        &self,
        request: &NewFollowRequest,
    ) -> Result<Insertion<FollowRequest>, SocialRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .follow_requests
            .iter()
            .find(|r| r.from == request.from && r.to == request.to)
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.social_references(&[request.from, request.to])?;
        let stored = FollowRequest {
            id: FollowRequestId::random(),
            from: request.from,
            to: request.to,
            message: request.message.clone(),
            status: FollowRequestStatus::Pending,
            created_at: state.now(),
            responded_at: None,
        };
        state.follow_requests.push(stored.clone());
        Ok(Insertion::Created(stored))
    }

    async fn respond(
        &self,
        id: FollowRequestId,
        accept: bool,
    ) -> Result<FollowRequest, SocialRepositoryError> {
        let mut state = self.lock();
        let now = state.now();
        let request = state
            .follow_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SocialRepositoryError::request_not_found(id))?;
        if request.status != FollowRequestStatus::Pending {
            return Err(SocialRepositoryError::already_resolved(
                id,
                request.status.as_str(),
            ));
        }
        request.status = FollowRequestStatus::from_response(accept);
        request.responded_at = Some(now);
        let resolved = request.clone();
        if accept {
            let edge = FollowEdge {
                follower: resolved.from,
                followed: resolved.to,
            };
            if !state.follows.contains(&edge) {
                state.follows.push(edge);
            }
        }
        Ok(resolved)
    }

    async fn pending_for(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<FollowRequest>, SocialRepositoryError> {
        let mut pending: Vec<FollowRequest> = self
            .lock()
            .follow_requests
            .iter()
            .filter(|r| r.to == profile && r.status == FollowRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn get_or_create_badge(
        &self,
        badge: &NewBadge,
    ) -> Result<Insertion<Badge>, SocialRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state.badges.iter().find(|b| b.name == badge.name) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        let stored = Badge {
            id: BadgeId::random(),
            name: badge.name.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
            requirements: badge.requirements,
            rarity: badge.rarity,
            is_active: badge.is_active,
            sort_order: badge.sort_order,
        };
        state.badges.push(stored.clone());
        Ok(Insertion::Created(stored))
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, SocialRepositoryError> {
        let mut badges: Vec<Badge> = self
            .lock()
            .badges
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect();
        badges.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(badges)
    }

    async fn award(
        &self,
        profile: ProfileId,
        badge: BadgeId,
    ) -> Result<Insertion<ProfileBadge>, SocialRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .profile_badges
            .iter()
            .find(|e| e.profile == profile && e.badge == badge)
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.social_references(&[profile])?;
        if !state.badges.iter().any(|b| b.id == badge) {
            return Err(SocialRepositoryError::missing_reference(format!(
                "badge {badge}"
            )));
        }
        let earned = ProfileBadge {
            id: ProfileBadgeId::random(),
            profile,
            badge,
            earned_at: state.now(),
            is_displayed: true,
        };
        state.profile_badges.push(earned.clone());
        Ok(Insertion::Created(earned))
    }

    async fn badges_for(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<ProfileBadge>, SocialRepositoryError> {
        let mut earned: Vec<ProfileBadge> = self
            .lock()
            .profile_badges
            .iter()
            .filter(|e| e.profile == profile)
            .cloned()
            .collect();
        earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(earned)
    }

    async fn block(&self, block: &NewBlock) -> Result<Insertion<UserBlock>, SocialRepositoryError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .blocks
            .iter()
            .find(|b| b.blocker == block.blocker && b.blocked == block.blocked)
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        state.social_references(&[block.blocker, block.blocked])?;
        let stored = UserBlock {
            id: BlockId::random(),
            blocker: block.blocker,
            blocked: block.blocked,
            reason: block.reason.clone(),
            created_at: state.now(),
        };
        state.blocks.push(stored.clone());
        Ok(Insertion::Created(stored))
    }

    async fn unblock(
        &self,
        blocker: ProfileId,
        blocked: ProfileId,
    ) -> Result<bool, SocialRepositoryError> {
        let mut state = self.lock();
        let before = state.blocks.len();
        state
            .blocks
            .retain(|b| !(b.blocker == blocker && b.blocked == blocked));
        Ok(state.blocks.len() < before)
    }

    async fn is_blocked(
        &self,
        blocker: ProfileId,
        blocked: ProfileId,
    ) -> Result<bool, SocialRepositoryError> {
        Ok(self
            .lock()
            .blocks
            .iter()
            .any(|b| b.blocker == blocker && b.blocked == blocked))
    }

    async fn blocked_by(&self, blocker: ProfileId) -> Result<Vec<UserBlock>, SocialRepositoryError> {
        let mut blocks: Vec<UserBlock> = self
            .lock()
            .blocks
            .iter()
            .filter(|b| b.blocker == blocker)
            .cloned()
            .collect();
        blocks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(blocks)
    }
}
