//! Seeding orchestration over configured adapters.

use std::sync::Arc;

use example_data::CatalogueError;
use thiserror::Error;
use tracing::info;

use crate::domain::seeding::{CollaborationSeeder, SeedError, SeedReport, SeedRepositories};
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselArticleRepository, DieselCommentRepository,
    DieselNotificationRepository, DieselProfileRepository, DieselRevisionRepository,
    DieselUserRepository, MigrationError, PoolConfig, PoolError, run_migrations,
};
use crate::seeding::config::{ConfigError, DatabaseSettings, SeedSettings};

/// Errors returned while executing a seeding run.
#[derive(Debug, Error)]
pub enum SeedRunError {
    /// Settings were invalid.
    #[error("invalid seeding configuration: {0}")]
    Config(#[from] ConfigError),
    /// The catalogue could not be loaded.
    #[error("catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),
    /// Migrations failed before seeding started.
    #[error(transparent)]
    Migration(#[from] MigrationError),
    /// The connection pool could not be built.
    #[error("database pool error: {0}")]
    Pool(#[from] PoolError),
    /// A dataset failed to seed.
    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),
}

/// Ports backed by the Diesel adapters sharing `pool`.
pub fn diesel_repositories(pool: &DbPool) -> SeedRepositories {
    SeedRepositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
        articles: Arc::new(DieselArticleRepository::new(pool.clone())),
        revisions: Arc::new(DieselRevisionRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
    }
}

/// Load the configured catalogue and seed it through `repos`.
pub async fn seed_catalogue(
    repos: SeedRepositories,
    settings: &SeedSettings,
) -> Result<SeedReport, SeedRunError> {
    let plan = settings.plan()?;
    let catalogue = settings.catalogue()?;
    let report = CollaborationSeeder::new(repos)
        .run(&catalogue, &plan)
        .await?;
    info!(
        datasets = plan.datasets().len(),
        created = report.total_created(),
        "seeding finished"
    );
    Ok(report)
}

/// Migrate the configured database, then seed it.
///
/// # Examples
///
/// ```rust,no_run
/// use conduit_backend::seeding::{DatabaseSettings, SeedSettings, run_seed};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let database = DatabaseSettings {
///     url: Some("postgres://conduit@localhost/conduit".to_owned()),
///     max_connections: None,
/// };
/// let report = run_seed(&SeedSettings::default(), &database).await?;
/// println!("created {} records", report.total_created());
/// # Ok(())
/// # }
/// ```
pub async fn run_seed(
    settings: &SeedSettings,
    database: &DatabaseSettings,
) -> Result<SeedReport, SeedRunError> {
    let url = database.database_url()?;
    run_migrations(url.as_str()).await?;
    let config = PoolConfig::new(url.as_str()).with_max_size(database.max_connections());
    let pool = DbPool::new(config).await?;
    seed_catalogue(diesel_repositories(&pool), settings).await
}
