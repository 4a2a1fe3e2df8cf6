//! Data models for the storage layer

use crate::cli::types::{FangraphsId, PlayerId, Season, TeamAbbr};
use serde::{Deserialize, Serialize};

/// Season batting totals for one team, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBattingRecord {
    pub season: Season,
    pub team: TeamAbbr,
    pub g: Option<i64>,
    pub ab: Option<i64>,
    pub r: Option<i64>,
    pub h: Option<i64>,
    pub hr: Option<i64>,
    pub rbi: Option<i64>,
    pub sb: Option<i64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
}

/// Season pitching totals for one team, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPitchingRecord {
    pub season: Season,
    pub team: TeamAbbr,
    pub w: Option<i64>,
    pub l: Option<i64>,
    pub era: Option<f64>,
    pub ip: Option<f64>,
    pub so: Option<i64>,
    pub whip: Option<f64>,
    pub fip: Option<f64>,
}

/// One game from a team's schedule-and-results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogRecord {
    pub season: Season,
    pub team: TeamAbbr,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub opp: String,
    pub wl: Option<String>,
    pub r: Option<i64>,
    pub ra: Option<i64>,
    pub inn: Option<i64>,
    pub gb: Option<String>,
    pub home_away: Option<String>,
}

/// Season batting line for one player, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBattingRecord {
    pub season: Season,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team: Option<String>,
    pub idfg: Option<FangraphsId>,
    pub age: Option<i64>,
    pub g: Option<i64>,
    pub pa: Option<i64>,
    pub ab: Option<i64>,
    pub r: Option<i64>,
    pub h: Option<i64>,
    pub doubles: Option<i64>,
    pub triples: Option<i64>,
    pub hr: Option<i64>,
    pub rbi: Option<i64>,
    pub sb: Option<i64>,
    pub cs: Option<i64>,
    pub bb: Option<i64>,
    pub so: Option<i64>,
    pub hbp: Option<i64>,
    pub avg: Option<f64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
    pub ops: Option<f64>,
}

/// Season pitching line for one player, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPitchingRecord {
    pub season: Season,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team: Option<String>,
    pub idfg: Option<FangraphsId>,
    pub age: Option<i64>,
    pub w: Option<i64>,
    pub l: Option<i64>,
    pub era: Option<f64>,
    pub g: Option<i64>,
    pub gs: Option<i64>,
    pub ip: Option<f64>,
    pub h: Option<i64>,
    pub r: Option<i64>,
    pub er: Option<i64>,
    pub bb: Option<i64>,
    pub so: Option<i64>,
    pub whip: Option<f64>,
    pub era_plus: Option<i64>,
}

/// Cleaned player batting stats read back from `processed.player_batting`.
///
/// Rate fields are the `_clean` columns, so they are never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBattingStats {
    pub season: Season,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team: Option<String>,
    pub age: i64,
    pub g: i64,
    pub pa: i64,
    pub ab: i64,
    pub r: i64,
    pub h: i64,
    pub doubles: i64,
    pub triples: i64,
    pub hr: i64,
    pub rbi: i64,
    pub sb: i64,
    pub bb: i64,
    pub so: i64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub pa_per_game: Option<f64>,
}

/// Team batting stats read back from `processed.team_batting`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBattingStats {
    pub season: Season,
    pub team: TeamAbbr,
    pub g: i64,
    pub ab: i64,
    pub r: i64,
    pub h: i64,
    pub hr: i64,
    pub rbi: i64,
    pub sb: i64,
    pub obp: f64,
    pub slg: Option<f64>,
    pub runs_per_game: Option<f64>,
}

/// Team pitching stats read back from `processed.team_pitching`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPitchingStats {
    pub season: Season,
    pub team: TeamAbbr,
    pub w: i64,
    pub l: i64,
    pub era: f64,
    pub ip: Option<f64>,
    pub so: i64,
    pub whip: Option<f64>,
    pub fip: Option<f64>,
    pub win_pct: Option<f64>,
}

/// Player pitching stats read back from `processed.player_pitching`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPitchingStats {
    pub season: Season,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team: Option<String>,
    pub age: i64,
    pub w: i64,
    pub l: i64,
    pub era: f64,
    pub g: i64,
    pub gs: i64,
    pub ip: Option<f64>,
    pub so: i64,
    pub whip: Option<f64>,
    pub win_pct: Option<f64>,
    pub k_per_inning: Option<f64>,
}

/// Row of `features.team_features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamFeatures {
    pub season: Season,
    pub team: TeamAbbr,
    pub offensive_rating: Option<f64>,
    pub pitching_strength: Option<f64>,
    pub combined_metric: Option<f64>,
}

/// Row of `features.player_features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFeatures {
    pub season: Season,
    pub player_id: PlayerId,
    pub player_name: String,
    pub plate_appearances_efficiency: Option<f64>,
    pub hr_rate: Option<f64>,
    pub pitching_win_strength: Option<f64>,
    /// Null when the player has no pitching line for the season
    pub batter_pitcher_adjusted_metric: Option<f64>,
}

/// Tabular result of an ad-hoc query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&serde_json::Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }
}
