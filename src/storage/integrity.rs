//! Integrity verification for a populated store
//!
//! Partial population after a failed fetch is tolerated and reported as a
//! warning. Only states that look corrupted (a missing namespace, a
//! partially filled table, a wrong season, a failed sample assertion) are
//! raised as errors.

use rusqlite::OptionalExtension;
use serde::Serialize;
use tracing::{info, warn};

use super::schema::{Namespace, RawTable, Store};
use super::transform::{FeatureTable, ProcessedTable};
use crate::cli::types::{PlayerId, Season, TeamAbbr};
use crate::error::{EtlError, Result};

/// What a healthy store is expected to contain.
#[derive(Debug, Clone)]
pub struct IntegrityExpectations {
    pub season: Season,
    pub raw_min_rows: Vec<(RawTable, i64)>,
    pub processed_min_rows: Vec<(ProcessedTable, i64)>,
    /// Team whose batting runs must be positive and which should have game logs.
    pub sample_team: TeamAbbr,
    /// Player whose batting row must carry a name containing `sample_player_name`.
    /// `None` skips the name assertion.
    pub sample_player: Option<PlayerId>,
    pub sample_player_name: String,
}

impl Default for IntegrityExpectations {
    fn default() -> Self {
        Self {
            season: Season::default(),
            raw_min_rows: vec![
                (RawTable::TeamBatting, 5),
                (RawTable::TeamPitching, 5),
                (RawTable::GameLogs, 5),
                (RawTable::PlayerBatting, 1),
                (RawTable::PlayerPitching, 0),
            ],
            processed_min_rows: vec![
                (ProcessedTable::TeamBatting, 5),
                (ProcessedTable::TeamPitching, 5),
                (ProcessedTable::PlayerBatting, 1),
                (ProcessedTable::PlayerPitching, 0),
            ],
            sample_team: TeamAbbr::new("LAD"),
            sample_player: Some(PlayerId::new(545361)),
            sample_player_name: "Trout".to_string(),
        }
    }
}

impl IntegrityExpectations {
    pub fn for_season(season: Season) -> Self {
        Self {
            season,
            ..Self::default()
        }
    }

    pub fn with_sample_team(mut self, team: TeamAbbr) -> Self {
        self.sample_team = team;
        self
    }

    pub fn with_sample_player(mut self, player: PlayerId, name_contains: impl Into<String>) -> Self {
        self.sample_player = Some(player);
        self.sample_player_name = name_contains.into();
        self
    }

    pub fn without_sample_player(mut self) -> Self {
        self.sample_player = None;
        self
    }
}

/// Outcome of a successful check, with everything worth a warning.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub row_counts: Vec<(String, i64)>,
    pub warnings: Vec<String>,
}

impl IntegrityReport {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub struct IntegrityChecker {
    expectations: IntegrityExpectations,
}

impl IntegrityChecker {
    pub fn new(expectations: IntegrityExpectations) -> Self {
        Self { expectations }
    }

    /// Run every check in order. Returns the first hard failure.
    pub fn run(&self, store: &Store) -> Result<IntegrityReport> {
        let mut report = IntegrityReport::default();

        self.check_namespaces(store)?;
        self.check_raw_counts(store, &mut report)?;
        self.check_seasons(store)?;
        self.check_processed_counts(store, &mut report)?;
        self.check_features(store, &mut report)?;
        self.check_samples(store, &mut report)?;

        info!(
            warnings = report.warnings.len(),
            "store integrity verified; population may be partial if fetches failed"
        );
        Ok(report)
    }

    fn check_namespaces(&self, store: &Store) -> Result<()> {
        for namespace in Namespace::ALL {
            if !store.has_namespace(namespace)? {
                return Err(EtlError::MissingNamespace {
                    namespace: namespace.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_raw_counts(&self, store: &Store, report: &mut IntegrityReport) -> Result<()> {
        for (table, min_rows) in &self.expectations.raw_min_rows {
            ensure_table(store, Namespace::Raw, table.name())?;
            let qualified = table.qualified();
            let count = store.row_count(&qualified)?;
            check_count(report, &qualified, count, *min_rows, "source fetch may have failed")?;
        }
        Ok(())
    }

    fn check_seasons(&self, store: &Store) -> Result<()> {
        let season = self.expectations.season.as_u16();
        for table in RawTable::ALL {
            let seasons = store.distinct_seasons(&table.qualified())?;
            if !seasons.is_empty() && !seasons.contains(&season) {
                return Err(EtlError::integrity(format!(
                    "table '{}' is missing season {} data",
                    table.qualified(),
                    season
                )));
            }
        }
        Ok(())
    }

    fn check_processed_counts(&self, store: &Store, report: &mut IntegrityReport) -> Result<()> {
        for (table, min_rows) in &self.expectations.processed_min_rows {
            ensure_table(store, Namespace::Processed, table.name())?;
            let qualified = table.qualified();
            let count = store.row_count(&qualified)?;
            check_count(report, &qualified, count, *min_rows, "nothing to derive from")?;
        }
        Ok(())
    }

    fn check_features(&self, store: &Store, report: &mut IntegrityReport) -> Result<()> {
        for table in FeatureTable::ALL {
            ensure_table(store, Namespace::Features, table.name())?;
            let qualified = table.qualified();
            let count = store.row_count(&qualified)?;
            report.row_counts.push((qualified.clone(), count));
            if count == 0 {
                report.warn(format!(
                    "table '{}' is empty; no processed data to derive from",
                    qualified
                ));
            }
        }
        Ok(())
    }

    fn check_samples(&self, store: &Store, report: &mut IntegrityReport) -> Result<()> {
        let season = self.expectations.season.as_u16();
        let team = self.expectations.sample_team.as_str();

        if store.row_count(&RawTable::TeamBatting.qualified())? > 0 {
            let runs: Option<Option<i64>> = store
                .conn
                .query_row(
                    "SELECT r FROM raw.team_batting WHERE team = ?1 AND season = ?2",
                    rusqlite::params![team, season],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(runs) = runs {
                if runs.unwrap_or(0) <= 0 {
                    return Err(EtlError::integrity(format!(
                        "invalid data in raw.team_batting for {} (non-positive runs)",
                        team
                    )));
                }
            }
        }

        if store.row_count(&RawTable::GameLogs.qualified())? > 0 {
            let games: i64 = store.conn.query_row(
                "SELECT COUNT(*) FROM raw.game_logs WHERE team = ?1 AND season = ?2",
                rusqlite::params![team, season],
                |row| row.get(0),
            )?;
            if games == 0 {
                report.warn(format!("expected game logs for {}, found none", team));
            }
        }

        let Some(sample_player) = self.expectations.sample_player else {
            return Ok(());
        };
        if store.row_count(&RawTable::PlayerBatting.qualified())? > 0 {
            let name: Option<Option<String>> = store
                .conn
                .query_row(
                    "SELECT player_name FROM raw.player_batting WHERE player_id = ?1 AND season = ?2",
                    rusqlite::params![sample_player.as_i64(), season],
                    |row| row.get(0),
                )
                .optional()?;
            let matches = name
                .flatten()
                .is_some_and(|n| n.contains(&self.expectations.sample_player_name));
            if !matches {
                return Err(EtlError::integrity(format!(
                    "player data integrity check failed for {} (batting)",
                    self.expectations.sample_player_name
                )));
            }
        }

        Ok(())
    }
}

fn ensure_table(store: &Store, namespace: Namespace, table: &str) -> Result<()> {
    if store.table_exists(namespace, table)? {
        Ok(())
    } else {
        Err(EtlError::integrity(format!(
            "table '{}.{}' does not exist",
            namespace, table
        )))
    }
}

fn check_count(
    report: &mut IntegrityReport,
    qualified: &str,
    count: i64,
    min_rows: i64,
    empty_hint: &str,
) -> Result<()> {
    report.row_counts.push((qualified.to_string(), count));
    if count == 0 {
        report.warn(format!("table '{}' has 0 rows; {}", qualified, empty_hint));
        return Ok(());
    }
    if count < min_rows {
        return Err(EtlError::integrity(format!(
            "table '{}' has {} rows, expected at least {}",
            qualified, count, min_rows
        )));
    }
    Ok(())
}
