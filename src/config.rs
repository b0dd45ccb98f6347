// src/config.rs
//
// Runtime configuration
//
// Sources, lowest precedence first:
// - built-in defaults
// - optional `config/catalog.toml`
// - `CATALOG__SECTION__KEY` environment variables

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "config/catalog.toml";
const ENV_PREFIX: &str = "CATALOG";

/// Minimum size of each pool (unit-of-work connections and read connections
/// are pooled separately).
pub const MIN_POOL_CONNECTIONS: u32 = 1;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagingConfig {
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
        }
    }
}

/// Database file under the platform data directory:
/// `{DATA_DIR}/catalog/catalog.db`, or `./catalog.db` when no data
/// directory can be determined.
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("catalog").join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("catalog.db"))
}

fn default_max_connections() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    if cfg!(debug_assertions) {
        "debug".to_string()
    } else {
        "info".to_string()
    }
}

fn default_max_page_size() -> u32 {
    100
}

impl CatalogConfig {
    /// Load configuration from `config/catalog.toml` (optional) and
    /// `CATALOG__*` environment variables, then validate it.
    pub fn load() -> AppResult<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: CatalogConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a database at an explicit path, defaults elsewhere.
    pub fn for_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseConfig {
                path: path.into(),
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.max_connections < MIN_POOL_CONNECTIONS {
            return Err(AppError::InvalidArgument(format!(
                "database.max_connections must be at least {}, got {}",
                MIN_POOL_CONNECTIONS, self.database.max_connections
            )));
        }
        if self.paging.max_page_size == 0 {
            return Err(AppError::InvalidArgument(
                "paging.max_page_size must be greater than 0".to_string(),
            ));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::InvalidArgument(
                "database.path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
