//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Username and email uniqueness are enforced by the `users_username_key` and
//! `users_email_key` constraints; violations become the matching duplicate
//! variants. Deleting a user relies on `ON DELETE CASCADE` for everything the
//! account owns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, Insertion, NewUser, User, UserId, Username};

use super::diesel_helpers::{StoreFailure, classify};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_KEY: &str = "users_username_key";
const EMAIL_KEY: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        user: &NewUser,
        privileged: bool,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row(user, privileged))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user))?;
        to_user(row)
    }
}

fn new_row(user: &NewUser, privileged: bool) -> NewUserRow<'_> {
    NewUserRow {
        id: Uuid::new_v4(),
        username: user.username.as_ref(),
        email: user.email.as_ref(),
        password_hash: user.password.as_str(),
        is_staff: privileged,
        is_superuser: privileged,
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_failure(failure: StoreFailure) -> UserPersistenceError {
    failure.into_port(UserPersistenceError::connection, UserPersistenceError::query)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_failure(classify(error))
}

/// Map insert failures, naming the duplicated field where possible.
fn map_write_error(error: diesel::result::Error, user: &NewUser) -> UserPersistenceError {
    let failure = classify(error);
    if failure.violates(USERNAME_KEY) {
        UserPersistenceError::duplicate_username(user.username.as_ref())
    } else if failure.violates(EMAIL_KEY) {
        UserPersistenceError::duplicate_email(user.email.as_ref())
    } else {
        map_failure(failure)
    }
}

fn to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(|err| UserPersistenceError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        self.insert(user, false).await
    }

    async fn create_superuser(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        if !user.password.is_usable() {
            return Err(UserPersistenceError::password_required());
        }
        self.insert(user, true).await
    }

    async fn get_or_create(
        &self,
        user: &NewUser,
    ) -> Result<Insertion<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<UserRow> = diesel::insert_into(users::table)
            .values(&new_row(user, false))
            .on_conflict(users::username)
            .do_nothing()
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, user))?;

        if let Some(row) = inserted {
            return to_user(row).map(Insertion::Created);
        }

        let row: UserRow = users::table
            .filter(users::username.eq(user.username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_user(row).map(Insertion::Existing)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(*id.as_uuid()))
            .set(users::is_active.eq(active))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user)
            .transpose()?
            .ok_or_else(|| UserPersistenceError::not_found(id))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
