//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each `Diesel*Repository` implements one domain port over a shared
//! [`DbPool`] (`diesel-async` connections pooled by `bb8`).
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. Validation lives in the domain constructors.
//! - **Internal models**: row structs (`models`) and table definitions
//!   (`schema`) never leave this module.
//! - **Typed errors**: database failures are classified once and mapped to
//!   the port's error enum, with named constraints becoming domain variants
//!   such as duplicate usernames or missing references.
//!
//! # Example
//!
//! ```ignore
//! use conduit_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/conduit")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_article_repository;
mod diesel_comment_repository;
mod diesel_engagement_repository;
pub(crate) mod diesel_helpers;
mod diesel_notification_repository;
mod diesel_profile_repository;
mod diesel_revision_repository;
mod diesel_social_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_article_repository::DieselArticleRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_engagement_repository::DieselEngagementRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_revision_repository::DieselRevisionRepository;
pub use diesel_social_repository::DieselSocialRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
