//! Application configuration.
//!
//! A JSON file chosen in this order:
//!
//! 1. an explicit path (the CLI's `--config`)
//! 2. `$DENTAL_RECORDS_CONFIG`
//! 3. `<config dir>/dental-records/config.json`
//!
//! and otherwise the defaults. `DENTAL_RECORDS_URL` and
//! `DENTAL_RECORDS_API_KEY` override the remote store's connection settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{ClinicClock, DEFAULT_UTC_OFFSET_MINUTES};
use crate::db::Database;
use crate::labels;
use crate::print::PrintHeader;
use crate::store::{RecordStore, RestStore, StoreError, DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS};

pub const APP_NAME: &str = "dental-records";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONFIG_PATH_ENV: &str = "DENTAL_RECORDS_CONFIG";
pub const URL_ENV: &str = "DENTAL_RECORDS_URL";
pub const API_KEY_ENV: &str = "DENTAL_RECORDS_API_KEY";

const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "records.db";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing config value: {0}")]
    Missing(&'static str),

    #[error("Invalid config value: {0}")]
    Invalid(String),

    #[error("Cannot open record store: {0}")]
    Store(#[from] StoreError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "dental_records_core=info,dental_records=info".to_string()
}

/// `<config dir>/dental-records`, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Local database used when a SQLite store names no path.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_NAME).join(DATABASE_FILE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Remote,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Project URL of the hosted table's API.
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
    pub timeout_secs: u64,
    /// SQLite file, for `kind = "sqlite"`.
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Remote,
            url: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    pub name: String,
    pub logo: Option<String>,
    pub utc_offset_minutes: i32,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: labels::DEFAULT_CLINIC_NAME.to_string(),
            logo: Some("images.png".to_string()),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub clinic: ClinicConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            clinic: ClinicConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load from the standard locations and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(explicit, default_config_path(), |key| std::env::var(key).ok())
    }

    /// [`AppConfig::load`] with the default path and environment supplied.
    ///
    /// An explicit or environment-named file must exist; the default file is
    /// optional.
    pub fn load_with<F>(explicit: Option<&Path>, default_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match (named, default_path) {
            (Some(path), _) => Self::from_file(&path)?,
            (None, Some(path)) if path.exists() => Self::from_file(&path)?,
            _ => {
                tracing::debug!("No config file, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(env);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(URL_ENV) {
            self.store.url = Some(url);
        }
        if let Some(key) = env(API_KEY_ENV) {
            self.store.api_key = Some(key);
        }
    }

    /// Clinic clock for the configured UTC offset.
    pub fn clock(&self) -> ConfigResult<ClinicClock> {
        ClinicClock::from_offset_minutes(self.clinic.utc_offset_minutes).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "clinic.utc_offset_minutes out of range: {}",
                self.clinic.utc_offset_minutes
            ))
        })
    }

    pub fn print_header(&self) -> PrintHeader {
        PrintHeader {
            clinic_name: self.clinic.name.clone(),
            logo: self.clinic.logo.clone(),
        }
    }

    /// Open the configured record store.
    pub fn build_store(&self) -> ConfigResult<Box<dyn RecordStore + Send>> {
        match self.store.kind {
            StoreKind::Remote => {
                let url = non_empty(&self.store.url).ok_or(ConfigError::Missing("store.url"))?;
                let key = non_empty(&self.store.api_key).ok_or(ConfigError::Missing("store.api_key"))?;
                if self.store.table.is_empty() {
                    return Err(ConfigError::Missing("store.table"));
                }
                let store = RestStore::new(url, key, &self.store.table, self.store.timeout_secs)?;
                tracing::info!(endpoint = %store.endpoint(), "Using remote record store");
                Ok(Box::new(store))
            }
            StoreKind::Sqlite => {
                let path = match &self.store.path {
                    Some(path) => path.clone(),
                    None => default_database_path().ok_or(ConfigError::Missing("store.path"))?,
                };
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                let db = Database::open(&path).map_err(StoreError::from)?;
                tracing::info!(path = %path.display(), "Using SQLite record store");
                Ok(Box::new(db))
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
