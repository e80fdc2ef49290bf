//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts.
    ///
    /// `username` and `email` are each globally unique.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        /// Argon2 PHC string, or an unusable marker starting with `!`.
        password_hash -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        last_login -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login sessions tracked per user.
    user_sessions (id) {
        id -> Uuid,
        user_id -> Uuid,
        session_token -> Varchar,
        ip_address -> Varchar,
        user_agent -> Text,
        is_active -> Bool,
        created_at -> Timestamptz,
        last_activity -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only analytics log of user actions.
    user_activity_logs (id) {
        id -> Uuid,
        user_id -> Uuid,
        activity_type -> Varchar,
        description -> Text,
        ip_address -> Nullable<Varchar>,
        metadata -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user settings, one row per user.
    user_preferences (user_id) {
        user_id -> Uuid,
        email_on_new_follower -> Bool,
        email_on_comment -> Bool,
        email_on_mention -> Bool,
        email_newsletter -> Bool,
        theme -> Varchar,
        language -> Varchar,
        articles_per_page -> Int4,
        show_email -> Bool,
        show_reading_list -> Bool,
        allow_indexing -> Bool,
    }
}

diesel::table! {
    /// Public profile wrapping a user account.
    profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
        bio -> Text,
        image -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges between profiles.
    profile_follows (follower_id, followed_id) {
        follower_id -> Uuid,
        followed_id -> Uuid,
    }
}

diesel::table! {
    /// Cached per-profile totals.
    profile_statistics (profile_id) {
        profile_id -> Uuid,
        total_articles -> Int8,
        total_comments -> Int8,
        total_followers -> Int8,
        total_following -> Int8,
        total_article_views -> Int8,
        total_likes_received -> Int8,
        last_updated -> Timestamptz,
    }
}

diesel::table! {
    /// Hierarchical article categories.
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        slug -> Varchar,
        description -> Text,
        parent_id -> Nullable<Uuid>,
        icon -> Varchar,
        sort_order -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Free-form article tags.
    tags (id) {
        id -> Uuid,
        tag -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Articles keyed by a globally unique slug.
    articles (id) {
        id -> Uuid,
        slug -> Varchar,
        title -> Varchar,
        description -> Text,
        body -> Text,
        author_id -> Uuid,
        category_id -> Nullable<Uuid>,
        view_count -> Int8,
        is_published -> Bool,
        featured -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Article to tag links.
    article_tags (article_id, tag_id) {
        article_id -> Uuid,
        tag_id -> Uuid,
    }
}

diesel::table! {
    /// Articles a profile has favourited.
    profile_favorites (profile_id, article_id) {
        profile_id -> Uuid,
        article_id -> Uuid,
    }
}

diesel::table! {
    /// Immutable article snapshots, unique per `(article_id, version_number)`.
    article_revisions (id) {
        id -> Uuid,
        article_id -> Uuid,
        title -> Varchar,
        description -> Text,
        body -> Text,
        edited_by -> Nullable<Uuid>,
        revision_note -> Text,
        version_number -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Threaded article comments.
    comments (id) {
        id -> Uuid,
        article_id -> Uuid,
        author_id -> Uuid,
        parent_id -> Nullable<Uuid>,
        body -> Text,
        is_edited -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One rating per `(article_id, profile_id)`.
    article_ratings (id) {
        id -> Uuid,
        article_id -> Uuid,
        profile_id -> Uuid,
        score -> Int2,
        review -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Named bookmark folders owned by a profile.
    bookmark_collections (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        description -> Text,
        is_public -> Bool,
        color -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Articles filed in a bookmark collection.
    bookmark_collection_articles (collection_id, article_id) {
        collection_id -> Uuid,
        article_id -> Uuid,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Read-later queue entries, unique per `(profile_id, article_id)`.
    reading_list_entries (id) {
        id -> Uuid,
        profile_id -> Uuid,
        article_id -> Uuid,
        priority -> Int2,
        notes -> Text,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notifications addressed to a user.
    user_notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        actor_id -> Nullable<Uuid>,
        notification_type -> Varchar,
        message -> Text,
        link -> Varchar,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Requests to follow a profile, resolved at most once.
    follow_requests (id) {
        id -> Uuid,
        from_profile_id -> Uuid,
        to_profile_id -> Uuid,
        message -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Achievement badge definitions.
    badges (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        icon -> Varchar,
        required_articles -> Int4,
        required_followers -> Int4,
        required_comments -> Int4,
        rarity -> Varchar,
        is_active -> Bool,
        sort_order -> Int4,
    }
}

diesel::table! {
    /// Badges earned by profiles.
    profile_badges (id) {
        id -> Uuid,
        profile_id -> Uuid,
        badge_id -> Uuid,
        earned_at -> Timestamptz,
        is_displayed -> Bool,
    }
}

diesel::table! {
    /// Profile blocks, unique per `(blocker_id, blocked_id)`.
    user_blocks (id) {
        id -> Uuid,
        blocker_id -> Uuid,
        blocked_id -> Uuid,
        reason -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(user_sessions -> users (user_id));
diesel::joinable!(user_activity_logs -> users (user_id));
diesel::joinable!(user_preferences -> users (user_id));
diesel::joinable!(profiles -> users (user_id));
diesel::joinable!(profile_statistics -> profiles (profile_id));
diesel::joinable!(articles -> profiles (author_id));
diesel::joinable!(articles -> categories (category_id));
diesel::joinable!(article_tags -> articles (article_id));
diesel::joinable!(article_tags -> tags (tag_id));
diesel::joinable!(profile_favorites -> articles (article_id));
diesel::joinable!(profile_favorites -> profiles (profile_id));
diesel::joinable!(article_revisions -> articles (article_id));
diesel::joinable!(comments -> articles (article_id));
diesel::joinable!(comments -> profiles (author_id));
diesel::joinable!(article_ratings -> articles (article_id));
diesel::joinable!(bookmark_collection_articles -> articles (article_id));
diesel::joinable!(bookmark_collection_articles -> bookmark_collections (collection_id));
diesel::joinable!(bookmark_collections -> profiles (owner_id));
diesel::joinable!(reading_list_entries -> articles (article_id));
diesel::joinable!(profile_badges -> badges (badge_id));
diesel::joinable!(profile_badges -> profiles (profile_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_sessions,
    user_activity_logs,
    user_preferences,
    profiles,
    profile_follows,
    profile_statistics,
    categories,
    tags,
    articles,
    article_tags,
    profile_favorites,
    article_revisions,
    comments,
    article_ratings,
    bookmark_collections,
    bookmark_collection_articles,
    reading_list_entries,
    user_notifications,
    follow_requests,
    badges,
    profile_badges,
    user_blocks,
);
