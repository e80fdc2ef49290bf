//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each trait covers one aggregate family and exposes its own error enum, so
//! adapters map storage failures into predictable variants. Get-or-create
//! methods return [`Insertion`](crate::domain::Insertion).

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod article_repository;
mod comment_repository;
mod engagement_repository;
mod notification_repository;
mod profile_repository;
mod revision_repository;
mod social_repository;
mod user_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use article_repository::MockArticleRepository;
pub use article_repository::{ArticleRepository, ArticleRepositoryError};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use engagement_repository::MockEngagementRepository;
pub use engagement_repository::{EngagementRepository, EngagementRepositoryError};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use revision_repository::MockRevisionRepository;
pub use revision_repository::{RevisionRepository, RevisionRepositoryError};
#[cfg(test)]
pub use social_repository::MockSocialRepository;
pub use social_repository::{SocialRepository, SocialRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
