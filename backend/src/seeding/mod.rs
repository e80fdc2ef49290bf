//! Configuration-driven entry point for loading the collaboration catalogue.

mod config;
mod startup;

pub use config::{ConfigError, DatabaseSettings, SeedSettings};
pub use startup::{SeedRunError, diesel_repositories, run_seed, seed_catalogue};
