//! Domain primitives and aggregates.
//!
//! Purpose: define the strongly typed entities of the Conduit data layer and
//! the pure rules over them (slug derivation, revision numbering, comment
//! threading, badge eligibility). Constructors validate before any I/O, so a
//! value held by a caller is always storable.
//!
//! Public surface:
//! - Identifiers (`UserId`, `ArticleId`, ...) wrapping UUID v4 values.
//! - Accounts: [`User`], [`Username`], [`EmailAddress`], [`PasswordHash`].
//! - Content: [`Profile`], [`Article`], [`ArticleRevision`], [`Comment`].
//! - Engagement and social records, plus [`Insertion`] for get-or-create.
//! - [`ports`]: repository traits implemented by outbound adapters.
//! - [`seeding`]: applies the fixture catalogue through the ports.

mod account;
mod article;
mod comment;
mod engagement;
mod ids;
mod insertion;
mod notification;
pub mod ports;
mod profile;
mod revision;
pub mod seeding;
mod slug;
mod social;
mod user;

pub use self::account::{
    ActivityKind, ActivityLogEntry, NewActivity, NewSession, Theme, UserPreference, UserSession,
};
pub use self::article::{
    Article, ArticleValidationError, CATEGORY_NAME_MAX, Category, NewArticle, NewCategory, NewTag,
    TITLE_MAX, Tag,
};
pub use self::comment::{
    Comment, CommentNode, CommentThread, CommentValidationError, NewComment, validate_comment_body,
};
pub use self::engagement::{
    ArticleRating, BookmarkCollection, HexColour, InvalidHexColour, NewBookmarkCollection,
    NewReadingListEntry, PriorityOutOfRange, RatingSummary, ReadingListEntry, ReadingPriority,
    Score, ScoreOutOfRange,
};
pub use self::ids::{
    ActivityId, ArticleId, BadgeId, BlockId, CategoryId, CollectionId, CommentId,
    FollowRequestId, NotificationId, ProfileBadgeId, ProfileId, RatingId, ReadingListEntryId,
    RevisionId, SessionId, TagId, UserId,
};
pub use self::insertion::Insertion;
pub use self::notification::{NewNotification, Notification, NotificationKind, UnknownVariant};
pub use self::profile::{
    FollowEdge, IMAGE_URL_MAX, ImageUrl, ImageUrlError, Profile, ProfileDraft, ProfileStatistics,
};
pub use self::revision::{
    ArticleRevision, InvalidVersionNumber, NewRevision, RevisionSnapshot, VersionNumber,
};
pub use self::slug::{SLUG_MAX, Slug, SlugValidationError};
pub use self::social::{
    Badge, BadgeRarity, BadgeRequirements, FOLLOW_REQUEST_MESSAGE_MAX, FollowRequest,
    FollowRequestStatus, NewBadge, NewBlock, NewFollowRequest, ProfileBadge,
    SocialValidationError, UserBlock,
};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUser, PasswordHash, PasswordHashError, USERNAME_MAX, User,
    UserValidationError, Username,
};
