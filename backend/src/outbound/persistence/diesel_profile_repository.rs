//! PostgreSQL-backed `ProfileRepository`: profiles, the follow graph,
//! favourites, and cached statistics.
//!
//! Profiles are always read joined to `users` so the domain value carries
//! the owner's username. Follow and favourite links are composite-key rows
//! inserted with `ON CONFLICT DO NOTHING`, which makes both idempotent.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{
    ArticleId, FollowEdge, Insertion, Profile, ProfileDraft, ProfileId, ProfileStatistics, UserId,
    Username,
};

use super::diesel_helpers::{StoreFailure, classify, log_unmapped_reference};
use super::models::{
    FavoriteRow, FollowRow, NewProfileRow, ProfileChanges, ProfileRow, StatisticsRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    articles, comments, profile_favorites, profile_follows, profile_statistics, profiles, users,
};

const STATISTICS_PROFILE_FKEY: &str = "profile_statistics_profile_id_fkey";

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Lookup keys for a single joined profile read.
enum ProfileKey<'a> {
    Id(Uuid),
    User(Uuid),
    Username(&'a str),
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    ProfileRepositoryError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure) -> ProfileRepositoryError {
    log_unmapped_reference(&failure);
    failure.into_port(
        ProfileRepositoryError::connection,
        ProfileRepositoryError::query,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    map_failure(classify(error))
}

/// Map a failed link insert onto whichever side of the link is missing.
fn map_link_error(
    error: diesel::result::Error,
    profile_constraints: &[&str],
    profile: ProfileId,
    article: Option<ArticleId>,
) -> ProfileRepositoryError {
    let failure = classify(error);
    match failure.constraint() {
        Some(name) if profile_constraints.contains(&name) => {
            ProfileRepositoryError::not_found(profile)
        }
        Some(_) if matches!(failure, StoreFailure::ForeignKeyViolation { .. }) => match article {
            Some(article) => ProfileRepositoryError::article_not_found(article),
            None => map_failure(failure),
        },
        _ => map_failure(failure),
    }
}

fn to_profile((row, username): (ProfileRow, String)) -> Result<Profile, ProfileRepositoryError> {
    row.into_profile(&username)
        .map_err(|err| ProfileRepositoryError::query(err.to_string()))
}

fn to_profiles(rows: Vec<(ProfileRow, String)>) -> Result<Vec<Profile>, ProfileRepositoryError> {
    rows.into_iter().map(to_profile).collect()
}

async fn fetch_profile(
    conn: &mut AsyncPgConnection,
    key: ProfileKey<'_>,
) -> Result<Option<Profile>, ProfileRepositoryError> {
    let query = profiles::table
        .inner_join(users::table)
        .select((ProfileRow::as_select(), users::username))
        .into_boxed();
    let query = match key {
        ProfileKey::Id(id) => query.filter(profiles::id.eq(id)),
        ProfileKey::User(user) => query.filter(profiles::user_id.eq(user)),
        ProfileKey::Username(username) => query.filter(users::username.eq(username)),
    };
    let row = query
        .first::<(ProfileRow, String)>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    row.map(to_profile).transpose()
}

async fn require_profile(
    conn: &mut AsyncPgConnection,
    id: ProfileId,
) -> Result<Profile, ProfileRepositoryError> {
    fetch_profile(conn, ProfileKey::Id(*id.as_uuid()))
        .await?
        .ok_or_else(|| ProfileRepositoryError::not_found(id))
}

async fn compute_statistics(
    conn: &mut AsyncPgConnection,
    profile: Uuid,
) -> Result<StatisticsRow, diesel::result::Error> {
    let total_articles: i64 = articles::table
        .filter(articles::author_id.eq(profile))
        .count()
        .get_result(conn)
        .await?;
    let total_comments: i64 = comments::table
        .filter(comments::author_id.eq(profile))
        .count()
        .get_result(conn)
        .await?;
    let total_followers: i64 = profile_follows::table
        .filter(profile_follows::followed_id.eq(profile))
        .count()
        .get_result(conn)
        .await?;
    let total_following: i64 = profile_follows::table
        .filter(profile_follows::follower_id.eq(profile))
        .count()
        .get_result(conn)
        .await?;
    let views: Vec<i64> = articles::table
        .filter(articles::author_id.eq(profile))
        .select(articles::view_count)
        .load(conn)
        .await?;
    let total_likes_received: i64 = profile_favorites::table
        .inner_join(articles::table)
        .filter(articles::author_id.eq(profile))
        .count()
        .get_result(conn)
        .await?;

    Ok(StatisticsRow {
        profile_id: profile,
        total_articles,
        total_comments,
        total_followers,
        total_following,
        total_article_views: views.into_iter().sum(),
        total_likes_received,
        last_updated: Utc::now(),
    })
}

fn to_statistics(row: StatisticsRow) -> Result<ProfileStatistics, ProfileRepositoryError> {
    ProfileStatistics::try_from(row).map_err(|err| ProfileRepositoryError::query(err.to_string()))
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn get_or_create_for_user(
        &self,
        user: UserId,
        draft: &ProfileDraft,
    ) -> Result<Insertion<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(profiles::table)
            .values(&NewProfileRow {
                id: Uuid::new_v4(),
                user_id: *user.as_uuid(),
                bio: &draft.bio,
                image: draft.image.as_ref(),
            })
            .on_conflict(profiles::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                StoreFailure::ForeignKeyViolation { .. } => {
                    ProfileRepositoryError::user_not_found(user)
                }
                other => map_failure(other),
            })?;

        let profile = fetch_profile(&mut conn, ProfileKey::User(*user.as_uuid()))
            .await?
            .ok_or_else(|| ProfileRepositoryError::user_not_found(user))?;
        Ok(Insertion::from_flag(inserted > 0, profile))
    }

    async fn find_by_id(&self, id: ProfileId) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        fetch_profile(&mut conn, ProfileKey::Id(*id.as_uuid())).await
    }

    async fn find_by_user_id(
        &self,
        user: UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        fetch_profile(&mut conn, ProfileKey::User(*user.as_uuid())).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        fetch_profile(&mut conn, ProfileKey::Username(username.as_ref())).await
    }

    async fn update(
        &self,
        id: ProfileId,
        draft: &ProfileDraft,
    ) -> Result<Profile, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(profiles::table.find(*id.as_uuid()))
            .set(&ProfileChanges {
                bio: &draft.bio,
                image: draft.image.as_ref(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ProfileRepositoryError::not_found(id));
        }
        require_profile(&mut conn, id).await
    }

    async fn follow(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<Insertion<FollowEdge>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(profile_follows::table)
            .values(&FollowRow {
                follower_id: *follower.as_uuid(),
                followed_id: *followed.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| {
                let failure = classify(err);
                if failure.violates("profile_follows_followed_id_fkey") {
                    ProfileRepositoryError::not_found(followed)
                } else if failure.violates("profile_follows_follower_id_fkey") {
                    ProfileRepositoryError::not_found(follower)
                } else {
                    map_failure(failure)
                }
            })?;
        Ok(Insertion::from_flag(
            inserted > 0,
            FollowEdge { follower, followed },
        ))
    }

    async fn unfollow(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            profile_follows::table
                .filter(profile_follows::follower_id.eq(*follower.as_uuid()))
                .filter(profile_follows::followed_id.eq(*followed.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn is_following(
        &self,
        follower: ProfileId,
        followed: ProfileId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            profile_follows::table
                .filter(profile_follows::follower_id.eq(*follower.as_uuid()))
                .filter(profile_follows::followed_id.eq(*followed.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn is_followed_by(
        &self,
        profile: ProfileId,
        other: ProfileId,
    ) -> Result<bool, ProfileRepositoryError> {
        self.is_following(other, profile).await
    }

    async fn followers(&self, profile: ProfileId) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let follower_ids = profile_follows::table
            .filter(profile_follows::followed_id.eq(*profile.as_uuid()))
            .select(profile_follows::follower_id);
        let rows = profiles::table
            .inner_join(users::table)
            .filter(profiles::id.eq_any(follower_ids))
            .order(users::username.asc())
            .select((ProfileRow::as_select(), users::username))
            .load::<(ProfileRow, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_profiles(rows)
    }

    async fn following(&self, profile: ProfileId) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let followed_ids = profile_follows::table
            .filter(profile_follows::follower_id.eq(*profile.as_uuid()))
            .select(profile_follows::followed_id);
        let rows = profiles::table
            .inner_join(users::table)
            .filter(profiles::id.eq_any(followed_ids))
            .order(users::username.asc())
            .select((ProfileRow::as_select(), users::username))
            .load::<(ProfileRow, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_profiles(rows)
    }

    async fn favorite(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(profile_favorites::table)
            .values(&FavoriteRow {
                profile_id: *profile.as_uuid(),
                article_id: *article.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| {
                map_link_error(
                    err,
                    &["profile_favorites_profile_id_fkey"],
                    profile,
                    Some(article),
                )
            })?;
        Ok(inserted > 0)
    }

    async fn unfavorite(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            profile_favorites::table
                .filter(profile_favorites::profile_id.eq(*profile.as_uuid()))
                .filter(profile_favorites::article_id.eq(*article.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn has_favorited(
        &self,
        profile: ProfileId,
        article: ArticleId,
    ) -> Result<bool, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            profile_favorites::table
                .filter(profile_favorites::profile_id.eq(*profile.as_uuid()))
                .filter(profile_favorites::article_id.eq(*article.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn favorites_count(&self, article: ArticleId) -> Result<u64, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = profile_favorites::table
            .filter(profile_favorites::article_id.eq(*article.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count).map_err(|err| ProfileRepositoryError::query(err.to_string()))
    }

    async fn statistics(
        &self,
        profile: ProfileId,
    ) -> Result<ProfileStatistics, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(profile_statistics::table)
            .values(&StatisticsRow::empty(*profile.as_uuid(), Utc::now()))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_link_error(err, &[STATISTICS_PROFILE_FKEY], profile, None))?;

        let row = profile_statistics::table
            .find(*profile.as_uuid())
            .select(StatisticsRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_statistics(row)
    }

    async fn refresh_statistics(
        &self,
        profile: ProfileId,
    ) -> Result<ProfileStatistics, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = compute_statistics(&mut conn, *profile.as_uuid())
            .await
            .map_err(map_diesel_error)?;
        let stored = diesel::insert_into(profile_statistics::table)
            .values(&row)
            .on_conflict(profile_statistics::profile_id)
            .do_update()
            .set(&row)
            .returning(StatisticsRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_link_error(err, &[STATISTICS_PROFILE_FKEY], profile, None))?;
        to_statistics(stored)
    }
}
