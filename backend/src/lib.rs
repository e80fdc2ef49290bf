//! Data layer for the Conduit collaborative article platform.
//!
//! - [`domain`]: validated entities and the repository ports.
//! - [`outbound`]: Diesel adapters, migrations and the connection pool.
//! - [`seeding`]: configuration and startup for loading the fixture catalogue.

pub mod domain;
pub mod outbound;
pub mod seeding;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
