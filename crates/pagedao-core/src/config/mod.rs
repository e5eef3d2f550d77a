//! Application configuration schemas.
//!
//! Configuration is deserialized from TOML files via the `config` crate.
//! Each sub-module is one logical section.

pub mod database;
pub mod logging;
pub mod paging;
pub mod search;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::paging::PagingConfig;
pub use self::search::SearchConfig;

use crate::error::AppError;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "PAGEDAO";

/// Root configuration.
///
/// Top-level deserialization target for the merged configuration sources:
/// the base file, an optional environment overlay and `PAGEDAO__*` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Page size defaults and limits.
    #[serde(default)]
    pub paging: PagingConfig,
    /// Full-text search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// `path` names the base file (extension optional). When `env` is given,
    /// `config/<env>` is layered on top. Environment variables such as
    /// `PAGEDAO__DATABASE__URL` win over both.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_fall_back_to_defaults() {
        let config = config::Config::builder()
            .set_override("database.url", "postgres://localhost/app")
            .expect("override")
            .build()
            .expect("build");

        let parsed: AppConfig = config.try_deserialize().expect("deserialize");
        assert_eq!(parsed.database.url, "postgres://localhost/app");
        assert_eq!(parsed.database.max_connections, 20);
        assert_eq!(parsed.paging.default_page_size, 30);
        assert_eq!(parsed.search.language, "english");
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_missing_database_url_is_configuration_error() {
        let err = AppConfig::load("does/not/exist", None).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
