//! Port abstraction for follow requests, badges, and blocking.

use async_trait::async_trait;

use crate::domain::{
    Badge, BadgeId, FollowRequest, FollowRequestId, Insertion, NewBadge, NewBlock,
    NewFollowRequest, ProfileBadge, ProfileId, UserBlock,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by social repository adapters.
    pub enum SocialRepositoryError {
        /// No follow request has the identifier.
        RequestNotFound { id: FollowRequestId } => "follow request {id} not found",
        /// The request has already been accepted or rejected.
        AlreadyResolved { id: FollowRequestId, status: String } =>
            "follow request {id} is already {status}",
        /// A referenced profile or badge does not exist.
        MissingReference { message: String } => "social data references missing data: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "social repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "social repository query failed: {message}",
    }
}

/// Social features layered over profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialRepository: Send + Sync {
    /// Ask to follow a profile; one request per ordered pair.
    async fn send_follow_request(
        &self,
        request: &NewFollowRequest,
    ) -> Result<Insertion<FollowRequest>, SocialRepositoryError>;

    /// Accept or reject a pending request.
    ///
    /// Accepting also records the follow edge, in the same transaction.
    async fn respond(
        &self,
        id: FollowRequestId,
        accept: bool,
    ) -> Result<FollowRequest, SocialRepositoryError>;

    /// Pending requests addressed to the profile, newest first.
    async fn pending_for(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<FollowRequest>, SocialRepositoryError>;

    /// Return the badge named `badge.name`, inserting it when absent.
    async fn get_or_create_badge(
        &self,
        badge: &NewBadge,
    ) -> Result<Insertion<Badge>, SocialRepositoryError>;

    /// Active badges ordered by sort order, then name.
    async fn list_badges(&self) -> Result<Vec<Badge>, SocialRepositoryError>;

    /// Award a badge once per profile.
    async fn award(
        &self,
        profile: ProfileId,
        badge: BadgeId,
    ) -> Result<Insertion<ProfileBadge>, SocialRepositoryError>;

    /// Badges earned by the profile, most recent first.
    async fn badges_for(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<ProfileBadge>, SocialRepositoryError>;

    /// Block a profile; one block per ordered pair.
    async fn block(&self, block: &NewBlock) -> Result<Insertion<UserBlock>, SocialRepositoryError>;

    /// Lift a block. Returns `false` when none existed.
    async fn unblock(
        &self,
        blocker: ProfileId,
        blocked: ProfileId,
    ) -> Result<bool, SocialRepositoryError>;

    /// Reports whether `blocker` has blocked `blocked`.
    async fn is_blocked(
        &self,
        blocker: ProfileId,
        blocked: ProfileId,
    ) -> Result<bool, SocialRepositoryError>;

    /// Blocks placed by `blocker`, newest first.
    async fn blocked_by(&self, blocker: ProfileId)
    -> Result<Vec<UserBlock>, SocialRepositoryError>;
}
