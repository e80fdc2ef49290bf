//! Collaboration demo fixture catalogue for the Conduit data layer.
//!
//! This crate owns the demonstration dataset used to populate a fresh
//! database: five collaborating authors, a handful of articles with revision
//! history, threaded comments, notifications, and the follow network between
//! the authors. It is deliberately independent of backend domain types so the
//! backend can depend on it without cycles.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Loading a catalogue from JSON (the built-in catalogue is embedded)
//! - Validating every cross reference before anything touches a database
//! - Selecting which datasets to load via [`SeedPlan`]
//!
//! # Example
//!
//! ```
//! use example_data::{Dataset, SeedCatalogue, SeedPlan};
//!
//! let catalogue = SeedCatalogue::builtin().expect("built-in catalogue is valid");
//! assert_eq!(catalogue.users().len(), 5);
//!
//! let plan = SeedPlan::new(None, true);
//! assert!(!plan.includes(Dataset::Users));
//! assert!(plan.includes(Dataset::Articles));
//! ```

mod catalogue;
mod dataset;
mod error;
mod seed;
mod validation;

pub use catalogue::SeedCatalogue;
pub use dataset::{Dataset, SeedPlan};
pub use error::{CatalogueError, DatasetParseError};
pub use seed::{
    ArticleSeed, CommentSeed, CommentThreadSeed, FollowSeed, NotificationKindSeed,
    NotificationSeed, RevisionSeed, UserSeed,
};
