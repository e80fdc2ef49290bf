//! Port abstraction for profiles, the follow graph, and favourites.

use async_trait::async_trait;

use crate::domain::{
    ArticleId, FollowEdge, Insertion, Profile, ProfileDraft, ProfileId, ProfileStatistics, UserId,
    Username,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// The owning account does not exist.
        UserNotFound { id: UserId } => "user {id} not found",
        /// No profile has the identifier.
        NotFound { id: ProfileId } => "profile {id} not found",
        /// No article has the identifier.
        ArticleNotFound { id: ArticleId } => "article {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "profile repository query failed: {message}",
    }
}

/// Profile storage and the directed follow relation.
///
/// `follow(a, b)` records that `a` follows `b` and says nothing about
/// whether `b` follows `a`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Return the profile owned by `user`, creating it from `draft` when absent.
    async fn get_or_create_for_user(
        &self,
        user: UserId,
        draft: &ProfileDraft,
    ) -> Result<Insertion<Profile>, ProfileRepositoryError>;

    /// Fetch a profile by identifier.
    async fn find_by_id(&self, id: ProfileId) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Fetch the profile owned by `user`.
    async fn find_by_user_id(
        &self,
        user: UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Fetch the profile of the account named `username`.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Replace the editable fields.
    async fn update(
        &self,
        id: ProfileId,
        draft: &ProfileDraft,
    ) -> Result<Profile, ProfileRepositoryError>;

    /// Record that `follower` follows `followed`. Idempotent.
    async fn follow(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<Insertion<FollowEdge>, ProfileRepositoryError>;

    /// Remove the edge. Returns `false` when it did not exist.
    async fn unfollow(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Reports whether `follower` follows `followed`.
    async fn is_following(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Reports whether `other` follows `profile`.
    async fn is_followed_by(
        &self,
        profile: ProfileId,
        other: ProfileId,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Profiles following `profile`, ordered by username.
    async fn followers(&self, profile: ProfileId) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Profiles that `profile` follows, ordered by username.
    async fn following(&self, profile: ProfileId) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Favourite an article. Returns `true` when the favourite is new.
    async fn favorite(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Remove a favourite. Returns `false` when it did not exist.
    async fn unfavorite(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Reports whether `profile` has favourited `article`.
    async fn has_favorited(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError>;

    /// Number of profiles that favourited `article`.
    async fn favorites_count(&self, article: ArticleId) -> Result<u64, ProfileRepositoryError>;

    /// Cached statistics, created as zeros when absent.
    async fn statistics(
        &self,
        profile: ProfileId,
    ) -> Result<ProfileStatistics, ProfileRepositoryError>;

    /// Recompute and store every total from live data.
    ///
    /// Likes received counts favourites on articles the profile authored.
    async fn refresh_statistics(
        &self,
        profile: ProfileId,
    ) -> Result<ProfileStatistics, ProfileRepositoryError>;
}
