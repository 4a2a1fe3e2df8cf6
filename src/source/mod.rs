//! External statistics source
//!
//! The pipeline only sees the [`StatsSource`] trait. [`HttpStatsSource`] is the
//! production implementation backed by the FanGraphs leaderboards and the MLB
//! Stats API; tests substitute in-memory sources.
//!
//! - `mapping`: Declarative field mapping from source columns to raw columns
//! - `types`: Response payloads
//! - `http`: The HTTP-backed source
//! - `cache`: File cache for API responses

pub mod cache;
pub mod http;
pub mod mapping;
pub mod types;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::types::{FangraphsId, PlayerId, Season, TeamAbbr};
use crate::storage::models::{
    GameLogRecord, PlayerBattingRecord, PlayerPitchingRecord, TeamBattingRecord,
    TeamPitchingRecord,
};

pub use http::HttpStatsSource;

/// Failure of a single fetch. Callers decide whether it is fatal.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unknown team abbreviation: {0}")]
    UnknownTeam(String),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// A resolved player identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLookup {
    pub player_id: PlayerId,
    pub fangraphs_id: Option<FangraphsId>,
    pub full_name: String,
}

/// Source of season statistics and player identities.
///
/// Every method may come back empty or fail on a transient error; none of
/// them retry.
#[allow(async_fn_in_trait)]
pub trait StatsSource {
    /// Season batting totals, one row per team.
    async fn team_batting(&self, season: Season) -> FetchResult<Vec<TeamBattingRecord>>;

    /// Season pitching totals, one row per team.
    async fn team_pitching(&self, season: Season) -> FetchResult<Vec<TeamPitchingRecord>>;

    /// Completed games of one team.
    async fn game_logs(&self, season: Season, team: &TeamAbbr)
        -> FetchResult<Vec<GameLogRecord>>;

    /// Season batting lines of every player.
    async fn player_batting(&self, season: Season) -> FetchResult<Vec<PlayerBattingRecord>>;

    /// Season pitching lines of every player.
    async fn player_pitching(&self, season: Season) -> FetchResult<Vec<PlayerPitchingRecord>>;

    /// Resolve a name to an identity. `last` and `first` are lower case.
    async fn lookup_player(&self, last: &str, first: &str) -> FetchResult<Option<PlayerLookup>>;
}

impl<S: StatsSource> StatsSource for &S {
    async fn team_batting(&self, season: Season) -> FetchResult<Vec<TeamBattingRecord>> {
        (**self).team_batting(season).await
    }

    async fn team_pitching(&self, season: Season) -> FetchResult<Vec<TeamPitchingRecord>> {
        (**self).team_pitching(season).await
    }

    async fn game_logs(&self, season: Season, team: &TeamAbbr)
        -> FetchResult<Vec<GameLogRecord>> {
        (**self).game_logs(season, team).await
    }

    async fn player_batting(&self, season: Season) -> FetchResult<Vec<PlayerBattingRecord>> {
        (**self).player_batting(season).await
    }

    async fn player_pitching(&self, season: Season) -> FetchResult<Vec<PlayerPitchingRecord>> {
        (**self).player_pitching(season).await
    }

    async fn lookup_player(&self, last: &str, first: &str) -> FetchResult<Option<PlayerLookup>> {
        (**self).lookup_player(last, first).await
    }
}

/// Split a display name into `(last, first)`, lower-cased.
///
/// The last token is the last name; everything before it is the first name,
/// so middle names stay with the first name. Single-token names do not split.
pub fn split_name(full_name: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let last = parts[parts.len() - 1].to_lowercase();
    let first = parts[..parts.len() - 1].join(" ").to_lowercase();
    Some((last, first))
}
