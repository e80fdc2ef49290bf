//! PostgreSQL-backed `SocialRepository`: follow requests, badges, and
//! blocks.
//!
//! Responding to a follow request locks the row with `FOR UPDATE` so a
//! request resolves exactly once; acceptance inserts the follow edge in the
//! same transaction.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{SocialRepository, SocialRepositoryError};
use crate::domain::{
    Badge, BadgeId, FollowRequest, FollowRequestId, FollowRequestStatus, Insertion, NewBadge,
    NewBlock, NewFollowRequest, ProfileBadge, ProfileId, UserBlock,
};

use super::diesel_helpers::{StoreFailure, TxError, classify, convert_rows};
use super::models::{
    BadgeRow, BlockRow, FollowRequestRow, FollowRow, NewBadgeRow, NewBlockRow,
    NewFollowRequestRow, NewProfileBadgeRow, ProfileBadgeRow, threshold_column,
};
use super::pool::{DbPool, PoolError};
use super::schema::{badges, follow_requests, profile_badges, profile_follows, user_blocks};

/// Diesel-backed implementation of the `SocialRepository` port.
#[derive(Clone)]
pub struct DieselSocialRepository {
    pool: DbPool,
}

impl DieselSocialRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SocialRepositoryError {
    SocialRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> SocialRepositoryError {
    match classify(error) {
        StoreFailure::ForeignKeyViolation { message, .. } => {
            SocialRepositoryError::missing_reference(message)
        }
        other => other.into_port(
            SocialRepositoryError::connection,
            SocialRepositoryError::query,
        ),
    }
}

fn query_error(error: impl ToString) -> SocialRepositoryError {
    SocialRepositoryError::query(error.to_string())
}

#[async_trait]
impl SocialRepository for DieselSocialRepository {
    async fn send_follow_request(
        &self,
        request: &NewFollowRequest,
    ) -> Result<Insertion<FollowRequest>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<FollowRequestRow> = diesel::insert_into(follow_requests::table)
            .values(&NewFollowRequestRow {
                id: Uuid::new_v4(),
                from_profile_id: *request.from.as_uuid(),
                to_profile_id: *request.to.as_uuid(),
                message: &request.message,
            })
            .on_conflict((
                follow_requests::from_profile_id,
                follow_requests::to_profile_id,
            ))
            .do_nothing()
            .returning(FollowRequestRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let (created, row) = match inserted {
            Some(row) => (true, row),
            None => {
                let row = follow_requests::table
                    .filter(follow_requests::from_profile_id.eq(*request.from.as_uuid()))
                    .filter(follow_requests::to_profile_id.eq(*request.to.as_uuid()))
                    .select(FollowRequestRow::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                (false, row)
            }
        };
        let request = FollowRequest::try_from(row).map_err(query_error)?;
        Ok(Insertion::from_flag(created, request))
    }

    async fn respond(
        &self,
        id: FollowRequestId,
        accept: bool,
    ) -> Result<FollowRequest, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let status = FollowRequestStatus::from_response(accept);
        let row = conn
            .transaction::<_, TxError<SocialRepositoryError>, _>(|conn| {
                async move {
                    let current: Option<FollowRequestRow> = follow_requests::table
                        .find(*id.as_uuid())
                        .select(FollowRequestRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let current = current.ok_or_else(|| {
                        TxError::Port(SocialRepositoryError::request_not_found(id))
                    })?;
                    if current.status != FollowRequestStatus::Pending.as_str() {
                        return Err(TxError::Port(SocialRepositoryError::already_resolved(
                            id,
                            current.status,
                        )));
                    }

                    let updated: FollowRequestRow =
                        diesel::update(follow_requests::table.find(*id.as_uuid()))
                            .set((
                                follow_requests::status.eq(status.as_str()),
                                follow_requests::responded_at.eq(Some(Utc::now())),
                            ))
                            .returning(FollowRequestRow::as_returning())
                            .get_result(conn)
                            .await?;

                    if accept {
                        diesel::insert_into(profile_follows::table)
                            .values(&FollowRow {
                                follower_id: updated.from_profile_id,
                                followed_id: updated.to_profile_id,
                            })
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }
                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.resolve(map_diesel_error))?;
        FollowRequest::try_from(row).map_err(query_error)
    }

    async fn pending_for(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<FollowRequest>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FollowRequestRow> = follow_requests::table
            .filter(follow_requests::to_profile_id.eq(*profile.as_uuid()))
            .filter(follow_requests::status.eq(FollowRequestStatus::Pending.as_str()))
            .order(follow_requests::created_at.desc())
            .select(FollowRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, SocialRepositoryError::query)
    }

    async fn get_or_create_badge(
        &self,
        badge: &NewBadge,
    ) -> Result<Insertion<Badge>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<BadgeRow> = diesel::insert_into(badges::table)
            .values(&NewBadgeRow {
                id: Uuid::new_v4(),
                name: &badge.name,
                description: &badge.description,
                icon: &badge.icon,
                required_articles: threshold_column(badge.requirements.articles),
                required_followers: threshold_column(badge.requirements.followers),
                required_comments: threshold_column(badge.requirements.comments),
                rarity: badge.rarity.as_str(),
                is_active: badge.is_active,
                sort_order: badge.sort_order,
            })
            .on_conflict(badges::name)
            .do_nothing()
            .returning(BadgeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let (created, row) = match inserted {
            Some(row) => (true, row),
            None => {
                let row = badges::table
                    .filter(badges::name.eq(&badge.name))
                    .select(BadgeRow::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                (false, row)
            }
        };
        let badge = Badge::try_from(row).map_err(query_error)?;
        Ok(Insertion::from_flag(created, badge))
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BadgeRow> = badges::table
            .filter(badges::is_active.eq(true))
            .order((badges::sort_order.asc(), badges::name.asc()))
            .select(BadgeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows, SocialRepositoryError::query)
    }

    async fn award(
        &self,
        profile: ProfileId,
        badge: BadgeId,
    ) -> Result<Insertion<ProfileBadge>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<ProfileBadgeRow> = diesel::insert_into(profile_badges::table)
            .values(&NewProfileBadgeRow {
                id: Uuid::new_v4(),
                profile_id: *profile.as_uuid(),
                badge_id: *badge.as_uuid(),
            })
            .on_conflict((profile_badges::profile_id, profile_badges::badge_id))
            .do_nothing()
            .returning(ProfileBadgeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        if let Some(row) = inserted {
            return Ok(Insertion::Created(ProfileBadge::from(row)));
        }
        let row: ProfileBadgeRow = profile_badges::table
            .filter(profile_badges::profile_id.eq(*profile.as_uuid()))
            .filter(profile_badges::badge_id.eq(*badge.as_uuid()))
            .select(ProfileBadgeRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Insertion::Existing(ProfileBadge::from(row)))
    }

    async fn badges_for(
        &self,
        profile: ProfileId,
    ) -> Result<Vec<ProfileBadge>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProfileBadgeRow> = profile_badges::table
            .filter(profile_badges::profile_id.eq(*profile.as_uuid()))
            .order(profile_badges::earned_at.desc())
            .select(ProfileBadgeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(ProfileBadge::from).collect())
    }

    async fn block(&self, block: &NewBlock) -> Result<Insertion<UserBlock>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<BlockRow> = diesel::insert_into(user_blocks::table)
            .values(&NewBlockRow {
                id: Uuid::new_v4(),
                blocker_id: *block.blocker.as_uuid(),
                blocked_id: *block.blocked.as_uuid(),
                reason: &block.reason,
            })
            .on_conflict((user_blocks::blocker_id, user_blocks::blocked_id))
            .do_nothing()
            .returning(BlockRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        if let Some(row) = inserted {
            return Ok(Insertion::Created(UserBlock::from(row)));
        }
        let row: BlockRow = user_blocks::table
            .filter(user_blocks::blocker_id.eq(*block.blocker.as_uuid()))
            .filter(user_blocks::blocked_id.eq(*block.blocked.as_uuid()))
            .select(BlockRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Insertion::Existing(UserBlock::from(row)))
    }

    async fn unblock(
        &self,
        blocker: ProfileId,
        blocked: ProfileId,
    ) -> Result<bool, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            user_blocks::table
                .filter(user_blocks::blocker_id.eq(*blocker.as_uuid()))
                .filter(user_blocks::blocked_id.eq(*blocked.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn is_blocked(
        &self,
        blocker: ProfileId,
        blocked: ProfileId,
    ) -> Result<bool, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            user_blocks::table
                .filter(user_blocks::blocker_id.eq(*blocker.as_uuid()))
                .filter(user_blocks::blocked_id.eq(*blocked.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn blocked_by(&self, blocker: ProfileId) -> Result<Vec<UserBlock>, SocialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BlockRow> = user_blocks::table
            .filter(user_blocks::blocker_id.eq(*blocker.as_uuid()))
            .order(user_blocks::created_at.desc())
            .select(BlockRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(UserBlock::from).collect())
    }
}
