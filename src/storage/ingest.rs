//! Raw ingestion: keyed upsert of fetched rows into the raw layer

use rusqlite::{params_from_iter, types::Value};
use serde::Serialize;
use tracing::{info, warn};

use super::{
    models::*,
    schema::{RawTable, Store},
};
use crate::error::Result;
use crate::source::FetchResult;

/// A row type that lives in a raw table.
///
/// Declares the table, its key and value columns, and how to bind each row.
/// `key_values` and `field_values` must line up with the column lists.
pub trait RawRecord {
    const TABLE: RawTable;
    const KEY_COLUMNS: &'static [&'static str];
    const VALUE_COLUMNS: &'static [&'static str];

    fn key_values(&self) -> Vec<Value>;
    fn field_values(&self) -> Vec<Value>;
}

/// Counts from one upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
}

impl UpsertStats {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// What happened to one fetch-and-ingest step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IngestOutcome {
    Upserted(UpsertStats),
    /// The source answered with zero rows.
    NoData,
    /// The source failed; existing rows were left as they were.
    FetchFailed(String),
}

impl IngestOutcome {
    pub fn rows_written(&self) -> usize {
        match self {
            IngestOutcome::Upserted(stats) => stats.total(),
            _ => 0,
        }
    }
}

/// Merge `rows` into their raw table: overwrite every non-key column of an
/// existing key, insert otherwise. Runs in one transaction.
pub fn upsert_rows<R: RawRecord>(store: &mut Store, rows: &[R]) -> Result<UpsertStats> {
    let table = R::TABLE.qualified();
    if rows.is_empty() {
        warn!(table = %table, "no rows to upsert");
        return Ok(UpsertStats::default());
    }

    let update_sql = update_statement(&table, R::KEY_COLUMNS, R::VALUE_COLUMNS);
    let insert_sql = insert_statement(&table, R::KEY_COLUMNS, R::VALUE_COLUMNS);

    let mut stats = UpsertStats::default();
    let tx = store.conn.transaction()?;
    {
        let mut update = tx.prepare(&update_sql)?;
        let mut insert = tx.prepare(&insert_sql)?;

        for row in rows {
            let keys = row.key_values();
            let fields = row.field_values();
            debug_assert_eq!(keys.len(), R::KEY_COLUMNS.len());
            debug_assert_eq!(fields.len(), R::VALUE_COLUMNS.len());

            // UPDATE binds fields first, then keys; INSERT binds keys first.
            let updated = update.execute(params_from_iter(fields.iter().chain(keys.iter())))?;
            if updated > 0 {
                stats.updated += 1;
                continue;
            }
            stats.inserted += insert.execute(params_from_iter(keys.iter().chain(fields.iter())))?;
        }
    }
    tx.commit()?;

    info!(
        table = %table,
        inserted = stats.inserted,
        updated = stats.updated,
        "upserted raw rows"
    );
    Ok(stats)
}

/// Ingest the result of a fetch. Empty results and fetch failures are logged
/// and reported, never raised.
pub fn ingest_fetched<R: RawRecord>(
    store: &mut Store,
    label: &str,
    fetched: FetchResult<Vec<R>>,
) -> Result<IngestOutcome> {
    match fetched {
        Ok(rows) if rows.is_empty() => {
            warn!("no {} data retrieved from the source", label);
            Ok(IngestOutcome::NoData)
        }
        Ok(rows) => Ok(IngestOutcome::Upserted(upsert_rows(store, &rows)?)),
        Err(e) => {
            warn!(error = %e, "could not fetch {}; keeping existing rows", label);
            Ok(IngestOutcome::FetchFailed(e.to_string()))
        }
    }
}

fn update_statement(table: &str, keys: &[&str], values: &[&str]) -> String {
    let set = values
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let filter = keys
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col, values.len() + i + 1))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!("UPDATE {} SET {} WHERE {}", table, set, filter)
}

fn insert_statement(table: &str, keys: &[&str], values: &[&str]) -> String {
    let columns = keys
        .iter()
        .chain(values.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=keys.len() + values.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let guard = keys
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col, i + 1))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(
        "INSERT INTO {table} ({columns}) SELECT {placeholders} \
         WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {guard})"
    )
}

fn int(v: Option<i64>) -> Value {
    v.map(Value::Integer).unwrap_or(Value::Null)
}

fn real(v: Option<f64>) -> Value {
    v.filter(|f| f.is_finite())
        .map(Value::Real)
        .unwrap_or(Value::Null)
}

fn text<S: AsRef<str>>(v: Option<S>) -> Value {
    v.map(|s| Value::Text(s.as_ref().to_string()))
        .unwrap_or(Value::Null)
}

fn season_value(season: crate::Season) -> Value {
    Value::Integer(i64::from(season.as_u16()))
}

impl RawRecord for TeamBattingRecord {
    const TABLE: RawTable = RawTable::TeamBatting;
    const KEY_COLUMNS: &'static [&'static str] = &["season", "team"];
    const VALUE_COLUMNS: &'static [&'static str] =
        &["g", "ab", "r", "h", "hr", "rbi", "sb", "obp", "slg"];

    fn key_values(&self) -> Vec<Value> {
        vec![season_value(self.season), text(Some(self.team.as_str()))]
    }

    fn field_values(&self) -> Vec<Value> {
        vec![
            int(self.g),
            int(self.ab),
            int(self.r),
            int(self.h),
            int(self.hr),
            int(self.rbi),
            int(self.sb),
            real(self.obp),
            real(self.slg),
        ]
    }
}

impl RawRecord for TeamPitchingRecord {
    const TABLE: RawTable = RawTable::TeamPitching;
    const KEY_COLUMNS: &'static [&'static str] = &["season", "team"];
    const VALUE_COLUMNS: &'static [&'static str] = &["w", "l", "era", "ip", "so", "whip", "fip"];

    fn key_values(&self) -> Vec<Value> {
        vec![season_value(self.season), text(Some(self.team.as_str()))]
    }

    fn field_values(&self) -> Vec<Value> {
        vec![
            int(self.w),
            int(self.l),
            real(self.era),
            real(self.ip),
            int(self.so),
            real(self.whip),
            real(self.fip),
        ]
    }
}

impl RawRecord for GameLogRecord {
    const TABLE: RawTable = RawTable::GameLogs;
    const KEY_COLUMNS: &'static [&'static str] = &["season", "team", "opp", "date"];
    const VALUE_COLUMNS: &'static [&'static str] = &["wl", "r", "ra", "inn", "gb", "home_away"];

    fn key_values(&self) -> Vec<Value> {
        vec![
            season_value(self.season),
            text(Some(self.team.as_str())),
            text(Some(&self.opp)),
            text(Some(&self.date)),
        ]
    }

    fn field_values(&self) -> Vec<Value> {
        vec![
            text(self.wl.as_ref()),
            int(self.r),
            int(self.ra),
            int(self.inn),
            text(self.gb.as_ref()),
            text(self.home_away.as_ref()),
        ]
    }
}

impl RawRecord for PlayerBattingRecord {
    const TABLE: RawTable = RawTable::PlayerBatting;
    const KEY_COLUMNS: &'static [&'static str] = &["season", "player_id"];
    const VALUE_COLUMNS: &'static [&'static str] = &[
        "player_name",
        "team",
        "idfg",
        "age",
        "g",
        "pa",
        "ab",
        "r",
        "h",
        "doubles",
        "triples",
        "hr",
        "rbi",
        "sb",
        "cs",
        "bb",
        "so",
        "hbp",
        "avg",
        "obp",
        "slg",
        "ops",
    ];

    fn key_values(&self) -> Vec<Value> {
        vec![
            season_value(self.season),
            Value::Integer(self.player_id.as_i64()),
        ]
    }

    fn field_values(&self) -> Vec<Value> {
        vec![
            text(Some(&self.player_name)),
            text(self.team.as_ref()),
            text(self.idfg.as_ref().map(|id| id.as_str())),
            int(self.age),
            int(self.g),
            int(self.pa),
            int(self.ab),
            int(self.r),
            int(self.h),
            int(self.doubles),
            int(self.triples),
            int(self.hr),
            int(self.rbi),
            int(self.sb),
            int(self.cs),
            int(self.bb),
            int(self.so),
            int(self.hbp),
            real(self.avg),
            real(self.obp),
            real(self.slg),
            real(self.ops),
        ]
    }
}

impl RawRecord for PlayerPitchingRecord {
    const TABLE: RawTable = RawTable::PlayerPitching;
    const KEY_COLUMNS: &'static [&'static str] = &["season", "player_id"];
    const VALUE_COLUMNS: &'static [&'static str] = &[
        "player_name",
        "team",
        "idfg",
        "age",
        "w",
        "l",
        "era",
        "g",
        "gs",
        "ip",
        "h",
        "r",
        "er",
        "bb",
        "so",
        "whip",
        "era_plus",
    ];

    fn key_values(&self) -> Vec<Value> {
        vec![
            season_value(self.season),
            Value::Integer(self.player_id.as_i64()),
        ]
    }

    fn field_values(&self) -> Vec<Value> {
        vec![
            text(Some(&self.player_name)),
            text(self.team.as_ref()),
            text(self.idfg.as_ref().map(|id| id.as_str())),
            int(self.age),
            int(self.w),
            int(self.l),
            real(self.era),
            int(self.g),
            int(self.gs),
            real(self.ip),
            int(self.h),
            int(self.r),
            int(self.er),
            int(self.bb),
            int(self.so),
            real(self.whip),
            int(self.era_plus),
        ]
    }
}
