//! Port abstraction for user account persistence and its errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Insertion, NewUser, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username '{username}' is already taken",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email '{email}' is already registered",
        /// Superusers must be able to log in.
        PasswordRequired => "superusers require a usable password",
        /// No account has the identifier.
        NotFound { id: UserId } => "user {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Account storage.
///
/// Deleting an account removes everything it owns: the profile, sessions,
/// activity logs, preferences, and notifications addressed to it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a regular account.
    async fn create_user(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Insert an account with staff and superuser rights.
    async fn create_superuser(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Return the account with `user.username`, inserting it when absent.
    async fn get_or_create(&self, user: &NewUser)
    -> Result<Insertion<User>, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Activate or deactivate an account.
    async fn set_active(&self, id: UserId, active: bool) -> Result<User, UserPersistenceError>;

    /// Delete an account. Returns `false` when nothing was deleted.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
