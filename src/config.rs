//! Runtime configuration, resolved from environment variables with CLI overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    error::{EtlError, Result},
    CACHE_TTL_ENV_VAR, DATA_DIR_ENV_VAR, FANGRAPHS_URL_ENV_VAR, MLB_URL_ENV_VAR,
    NO_CACHE_ENV_VAR,
};

/// Default directory for the store, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "./data";
/// File stem for the main database file and its namespace siblings.
pub const DEFAULT_STORE_STEM: &str = "baseball";

pub const FANGRAPHS_BASE_URL: &str = "https://www.fangraphs.com";
pub const MLB_STATS_BASE_URL: &str = "https://statsapi.mlb.com";

const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60 * 24;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the store lives on disk.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub stem: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            stem: DEFAULT_STORE_STEM.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Path of the main database file, e.g. `./data/baseball.db`.
    pub fn main_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.db", self.stem))
    }

    /// Path of the file backing an attached namespace, e.g. `./data/baseball.raw.db`.
    pub fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}.db", self.stem, namespace))
    }
}

/// Settings for the HTTP-backed stats source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub fangraphs_base_url: String,
    pub mlb_base_url: String,
    /// Directory for cached API responses; `None` disables the cache.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fangraphs_base_url: FANGRAPHS_BASE_URL.to_string(),
            mlb_base_url: MLB_STATS_BASE_URL.to_string(),
            cache_dir: default_cache_dir(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SourceConfig {
    /// Point both APIs at one base URL with caching off. Used against mock servers.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            fangraphs_base_url: base_url.clone(),
            mlb_base_url: base_url,
            cache_dir: None,
            ..Self::default()
        }
    }
}

/// Path: ~/.cache/baseball-etl
fn default_cache_dir() -> Option<PathBuf> {
    let base = dirs::cache_dir().or_else(|| dirs::home_dir().map(|home| home.join(".cache")))?;
    Some(base.join("baseball-etl"))
}

/// Full runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub store: StoreConfig,
    pub source: SourceConfig,
}

impl Config {
    /// Build configuration from defaults, overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup(DATA_DIR_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            config.store.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(FANGRAPHS_URL_ENV_VAR) {
            config.source.fangraphs_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup(MLB_URL_ENV_VAR) {
            config.source.mlb_base_url = url.trim_end_matches('/').to_string();
        }
        if lookup(NO_CACHE_ENV_VAR).is_some_and(|v| is_truthy(&v)) {
            config.source.cache_dir = None;
        }
        if let Some(ttl) = lookup(CACHE_TTL_ENV_VAR) {
            let secs: u64 = ttl.trim().parse().map_err(|_| EtlError::Config {
                message: format!("{} must be a number of seconds, got '{}'", CACHE_TTL_ENV_VAR, ttl),
            })?;
            config.source.cache_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
