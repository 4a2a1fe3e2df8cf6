//! Derived layers: raw → processed → features
//!
//! Every derived table is dropped and rebuilt from its inputs in a single
//! transaction, so a rebuild is idempotent and never touches its sources.
//! Ratios go through `NULLIF` so a zero denominator yields NULL.

use super::schema::{Namespace, Store};
use crate::error::Result;
use tracing::debug;

/// Tables of the processed layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessedTable {
    TeamBatting,
    TeamPitching,
    PlayerBatting,
    PlayerPitching,
}

impl ProcessedTable {
    pub const ALL: [ProcessedTable; 4] = [
        ProcessedTable::TeamBatting,
        ProcessedTable::TeamPitching,
        ProcessedTable::PlayerBatting,
        ProcessedTable::PlayerPitching,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProcessedTable::TeamBatting => "team_batting",
            ProcessedTable::TeamPitching => "team_pitching",
            ProcessedTable::PlayerBatting => "player_batting",
            ProcessedTable::PlayerPitching => "player_pitching",
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", Namespace::Processed, self.name())
    }

    fn select_sql(&self) -> &'static str {
        match self {
            ProcessedTable::TeamBatting => SELECT_PROCESSED_TEAM_BATTING,
            ProcessedTable::TeamPitching => SELECT_PROCESSED_TEAM_PITCHING,
            ProcessedTable::PlayerBatting => SELECT_PROCESSED_PLAYER_BATTING,
            ProcessedTable::PlayerPitching => SELECT_PROCESSED_PLAYER_PITCHING,
        }
    }
}

/// Tables of the features layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureTable {
    TeamFeatures,
    PlayerFeatures,
}

impl FeatureTable {
    pub const ALL: [FeatureTable; 2] = [FeatureTable::TeamFeatures, FeatureTable::PlayerFeatures];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureTable::TeamFeatures => "team_features",
            FeatureTable::PlayerFeatures => "player_features",
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", Namespace::Features, self.name())
    }

    fn select_sql(&self) -> &'static str {
        match self {
            FeatureTable::TeamFeatures => SELECT_TEAM_FEATURES,
            FeatureTable::PlayerFeatures => SELECT_PLAYER_FEATURES,
        }
    }
}

const SELECT_PROCESSED_TEAM_BATTING: &str = "
SELECT
    season, team, g, ab, r, h, hr, rbi, sb, obp, slg,
    CAST(r AS REAL) / NULLIF(g, 0) AS runs_per_game,
    COALESCE(obp, 0.000) AS obp_clean
FROM raw.team_batting";

const SELECT_PROCESSED_TEAM_PITCHING: &str = "
SELECT
    season, team, w, l, era, ip, so, whip, fip,
    w * 1.0 / NULLIF(w + l, 0) AS win_pct,
    COALESCE(era, 0.00) AS era_clean
FROM raw.team_pitching";

const SELECT_PROCESSED_PLAYER_BATTING: &str = "
SELECT
    season, player_id, player_name, team, idfg, age, g, pa, ab, r, h,
    doubles, triples, hr, rbi, sb, cs, bb, so, hbp,
    COALESCE(avg, 0.000) AS avg_clean,
    COALESCE(obp, 0.000) AS obp_clean,
    COALESCE(slg, 0.000) AS slg_clean,
    COALESCE(ops, COALESCE(obp, 0.000) + COALESCE(slg, 0.000)) AS ops_clean,
    CAST(pa AS REAL) / NULLIF(g, 0) AS pa_per_game
FROM raw.player_batting";

const SELECT_PROCESSED_PLAYER_PITCHING: &str = "
SELECT
    season, player_id, player_name, team, idfg, age, w, l, era, g, gs, ip,
    h, r, er, bb, so, whip, era_plus,
    COALESCE(era, 0.00) AS era_clean,
    w * 1.0 / NULLIF(w + l, 0) AS win_pct,
    so * 1.0 / NULLIF(ip, 0) AS k_per_inning
FROM raw.player_pitching";

const SELECT_TEAM_FEATURES: &str = "
SELECT
    b.season, b.team,
    b.runs_per_game AS offensive_rating,
    p.win_pct * 100 AS pitching_strength,
    b.obp_clean + (p.era_clean / 10.0) AS combined_metric
FROM processed.team_batting b
JOIN processed.team_pitching p ON b.team = p.team AND b.season = p.season";

const SELECT_PLAYER_FEATURES: &str = "
SELECT
    pb.season, pb.player_id, pb.player_name,
    pb.pa_per_game AS plate_appearances_efficiency,
    pb.hr * 100.0 / NULLIF(pb.ab, 0) AS hr_rate,
    pp.win_pct * 100 AS pitching_win_strength,
    pb.ops_clean + (pp.era_clean / 10.0) AS batter_pitcher_adjusted_metric
FROM processed.player_batting pb
LEFT JOIN processed.player_pitching pp
    ON pb.player_id = pp.player_id AND pb.season = pp.season";

/// Replace `qualified` with the result of `select`, atomically.
fn replace_table(store: &Store, qualified: &str, select: &str) -> Result<()> {
    let tx = store.conn.unchecked_transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS {}", qualified), [])?;
    tx.execute(&format!("CREATE TABLE {} AS {}", qualified, select), [])?;
    tx.commit()?;
    debug!(table = qualified, "rebuilt derived table");
    Ok(())
}

/// Recompute one processed table from its raw source.
pub fn rebuild_processed(store: &Store, table: ProcessedTable) -> Result<()> {
    replace_table(store, &table.qualified(), table.select_sql())
}

/// Recompute one feature table from the processed layer.
pub fn rebuild_features(store: &Store, table: FeatureTable) -> Result<()> {
    replace_table(store, &table.qualified(), table.select_sql())
}

pub fn rebuild_all_processed(store: &Store) -> Result<()> {
    for table in ProcessedTable::ALL {
        rebuild_processed(store, table)?;
    }
    Ok(())
}

pub fn rebuild_all_features(store: &Store) -> Result<()> {
    for table in FeatureTable::ALL {
        rebuild_features(store, table)?;
    }
    Ok(())
}

/// Recompute processed, then features.
pub fn rebuild_all(store: &Store) -> Result<()> {
    rebuild_all_processed(store)?;
    rebuild_all_features(store)
}
