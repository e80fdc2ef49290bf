//! Seeding configuration loaded via OrthoConfig.

use camino::{Utf8Path, Utf8PathBuf};
use example_data::{CatalogueError, Dataset, DatasetParseError, SeedCatalogue, SeedPlan};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `DATABASE_URL` is not set.
    #[error("database url is not configured")]
    MissingDatabaseUrl,
    /// The URL does not parse.
    #[error("database url is invalid: {message}")]
    InvalidDatabaseUrl { message: String },
    /// The URL names something other than PostgreSQL.
    #[error("database url scheme '{scheme}' is not postgres")]
    UnsupportedScheme { scheme: String },
    /// `SEED_ONLY` names an unknown dataset.
    #[error(transparent)]
    UnknownDataset(#[from] DatasetParseError),
}

/// Which parts of the catalogue to seed.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SEED")]
pub struct SeedSettings {
    /// Seed exactly one dataset.
    pub only: Option<String>,
    /// Leave user accounts untouched.
    #[ortho_config(default = false)]
    pub skip_users: bool,
    /// Catalogue file to load instead of the built-in one.
    pub catalogue_path: Option<Utf8PathBuf>,
}

impl SeedSettings {
    /// Build the plan described by `only` and `skip_users`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDataset`] when `only` names no dataset.
    pub fn plan(&self) -> Result<SeedPlan, ConfigError> {
        let only = self
            .only
            .as_deref()
            .map(str::parse::<Dataset>)
            .transpose()?;
        Ok(SeedPlan::new(only, self.skip_users))
    }

    /// Load the configured catalogue, or the built-in one.
    pub fn catalogue(&self) -> Result<SeedCatalogue, CatalogueError> {
        self.catalogue_path
            .as_deref()
            .map_or_else(SeedCatalogue::builtin, SeedCatalogue::from_file)
    }

    /// The catalogue file override, if any.
    pub fn catalogue_path(&self) -> Option<&Utf8Path> {
        self.catalogue_path.as_deref()
    }
}

/// Connection settings for the PostgreSQL database.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DATABASE")]
pub struct DatabaseSettings {
    /// `postgres://` connection URL.
    pub url: Option<String>,
    /// Pool size.
    pub max_connections: Option<u32>,
}

impl DatabaseSettings {
    /// The validated connection URL.
    ///
    /// # Errors
    ///
    /// Fails when the URL is absent, malformed, or not a PostgreSQL URL.
    pub fn database_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidDatabaseUrl {
            message: err.to_string(),
        })?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }

    /// Configured pool size, falling back to the default.
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for seeding configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn seed_settings() -> SeedSettings {
        SeedSettings::load_from_iter([OsString::from("conduit-seed")])
            .expect("seed config should load")
    }

    fn database_settings() -> DatabaseSettings {
        DatabaseSettings::load_from_iter([OsString::from("conduit-seed")])
            .expect("database config should load")
    }

    #[rstest]
    fn seed_defaults_cover_every_dataset() {
        let _guard = lock_env([
            ("SEED_ONLY", None::<String>),
            ("SEED_SKIP_USERS", None::<String>),
            ("SEED_CATALOGUE_PATH", None::<String>),
        ]);

        let settings = seed_settings();
        assert!(!settings.skip_users);
        assert!(settings.catalogue_path().is_none());
        assert_eq!(
            settings.plan().expect("plan").datasets(),
            Dataset::ALL.as_slice()
        );
    }

    #[rstest]
    fn seed_environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SEED_ONLY", Some("comments".to_owned())),
            ("SEED_SKIP_USERS", Some("true".to_owned())),
            ("SEED_CATALOGUE_PATH", Some("/tmp/catalogue.json".to_owned())),
        ]);

        let settings = seed_settings();
        assert!(settings.skip_users);
        assert_eq!(
            settings.catalogue_path(),
            Some(Utf8Path::new("/tmp/catalogue.json"))
        );
        assert_eq!(
            settings.plan().expect("plan").datasets(),
            &[Dataset::Comments]
        );
    }

    #[rstest]
    fn unknown_dataset_is_rejected() {
        let settings = SeedSettings {
            only: Some("badges".to_owned()),
            ..SeedSettings::default()
        };
        assert!(matches!(
            settings.plan(),
            Err(ConfigError::UnknownDataset(_))
        ));
    }

    #[rstest]
    fn builtin_catalogue_is_used_without_a_path() {
        let catalogue = SeedSettings::default().catalogue().expect("builtin");
        assert!(!catalogue.users().is_empty());
    }

    #[rstest]
    fn database_environment_is_loaded() {
        let _guard = lock_env([
            (
                "DATABASE_URL",
                Some("postgres://conduit@localhost/conduit".to_owned()),
            ),
            ("DATABASE_MAX_CONNECTIONS", Some("12".to_owned())),
        ]);

        let settings = database_settings();
        let url = settings.database_url().expect("valid url");
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(settings.max_connections(), 12);
    }

    #[rstest]
    #[case(None, ConfigError::MissingDatabaseUrl)]
    #[case(
        Some("mysql://localhost/conduit"),
        ConfigError::UnsupportedScheme { scheme: "mysql".to_owned() }
    )]
    fn database_url_is_validated(#[case] url: Option<&str>, #[case] expected: ConfigError) {
        let settings = DatabaseSettings {
            url: url.map(str::to_owned),
            max_connections: None,
        };
        assert_eq!(settings.database_url(), Err(expected));
        assert_eq!(settings.max_connections(), DEFAULT_MAX_CONNECTIONS);
    }

    #[rstest]
    fn malformed_database_url_is_rejected() {
        let settings = DatabaseSettings {
            url: Some("not a url".to_owned()),
            max_connections: None,
        };
        assert!(matches!(
            settings.database_url(),
            Err(ConfigError::InvalidDatabaseUrl { .. })
        ));
    }
}
