//! Strongly typed entity identifiers.
//!
//! Every aggregate is keyed by a UUID v4 generated by the application. The
//! wrappers keep a `ProfileId` from being passed where an `ArticleId` is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(
    /// Identifier of a user account.
    UserId
);
define_id!(
    /// Identifier of a profile.
    ProfileId
);
define_id!(
    /// Identifier of an article.
    ArticleId
);
define_id!(
    /// Identifier of an article revision.
    RevisionId
);
define_id!(
    /// Identifier of a comment.
    CommentId
);
define_id!(
    /// Identifier of a tag.
    TagId
);
define_id!(
    /// Identifier of a category.
    CategoryId
);
define_id!(
    /// Identifier of an article rating.
    RatingId
);
define_id!(
    /// Identifier of a bookmark collection.
    CollectionId
);
define_id!(
    /// Identifier of a reading list entry.
    ReadingListEntryId
);
define_id!(
    /// Identifier of a notification.
    NotificationId
);
define_id!(
    /// Identifier of a follow request.
    FollowRequestId
);
define_id!(
    /// Identifier of a badge definition.
    BadgeId
);
define_id!(
    /// Identifier of an awarded badge.
    ProfileBadgeId
);
define_id!(
    /// Identifier of a block between two profiles.
    BlockId
);
define_id!(
    /// Identifier of a login session.
    SessionId
);
define_id!(
    /// Identifier of an activity log entry.
    ActivityId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_uuid() {
        let uuid = Uuid::new_v4();
        let id = ArticleId::from_uuid(uuid);

        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn ids_serialise_as_bare_uuid_strings() {
        let id = ProfileId::random();
        let json = serde_json::to_string(&id).expect("serialise id");

        assert_eq!(json, format!("\"{id}\""));
    }
}
