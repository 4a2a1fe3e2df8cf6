//! Baseball ETL Library
//!
//! A layered statistics store for Major League Baseball, fed from public
//! stats APIs and queried through a small SDK.
//!
//! ## Layers
//!
//! - **raw**: Source-shaped rows, merged by natural key on every ingest
//! - **processed**: Cleaned tables with null-safe rates, rebuilt in full
//! - **features**: Analytical metrics joined across processed tables
//!
//! Each layer is a separate SQLite database attached to one connection, so
//! queries address tables as `raw.team_batting`, `features.player_features`
//! and so on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use baseball_etl::{config::Config, sdk::BaseballSdk, source::HttpStatsSource, Season};
//!
//! # async fn example() -> baseball_etl::Result<()> {
//! let config = Config::from_env()?;
//! let source = HttpStatsSource::new(config.source.clone())?;
//! let mut sdk = BaseballSdk::new(source, config.store.clone());
//!
//! if let Some(stats) = sdk.get_player("Mike Trout", Season::new(2024)).await? {
//!     println!("{} HR", stats.hr);
//! }
//! sdk.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export BASEBALL_ETL_DATA_DIR=/var/lib/baseball
//! export BASEBALL_ETL_NO_CACHE=1
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod sdk;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{FangraphsId, PlayerId, Season, TeamAbbr};
pub use error::{EtlError, Result};
pub use sdk::BaseballSdk;
pub use source::{FetchError, FetchResult, PlayerLookup, StatsSource};
pub use storage::Store;

pub const DATA_DIR_ENV_VAR: &str = "BASEBALL_ETL_DATA_DIR";
pub const FANGRAPHS_URL_ENV_VAR: &str = "BASEBALL_ETL_FANGRAPHS_URL";
pub const MLB_URL_ENV_VAR: &str = "BASEBALL_ETL_MLB_URL";
pub const NO_CACHE_ENV_VAR: &str = "BASEBALL_ETL_NO_CACHE";
pub const CACHE_TTL_ENV_VAR: &str = "BASEBALL_ETL_CACHE_TTL_SECS";
