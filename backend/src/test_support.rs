//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`, which
//! enable the `test-support` feature.

mod memory;

pub use memory::InMemoryStore;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Route `tracing` output through the test harness.
///
/// Honours `RUST_LOG`. Safe to call from every test; only the first call
/// installs a subscriber.
pub fn init_test_tracing() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
    {
        debug!(%error, "test tracing already initialised");
    }
}
