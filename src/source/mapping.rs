//! Declarative field mapping from leaderboard columns to raw table columns
//!
//! Upstream column names drift between releases, so every raw column lists the
//! source names it may arrive under, in priority order. A new upstream layout
//! gets a new [`SchemaVersion`] rather than edits to the existing tables.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::storage::schema::RawTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Real,
    Text,
}

/// One raw column and where to find it in a source row.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub column: &'static str,
    pub sources: &'static [&'static str],
    pub kind: FieldKind,
}

const fn field(column: &'static str, sources: &'static [&'static str], kind: FieldKind) -> FieldSpec {
    FieldSpec {
        column,
        sources,
        kind,
    }
}

use FieldKind::{Int, Real, Text};

const TEAM: &[&str] = &["TeamNameAbb", "TeamName", "Team"];
const PLAYER_ID: &[&str] = &["xMLBAMID", "MLBAMID", "mlbamid"];
const IDFG: &[&str] = &["playerid", "IDfg", "playerids"];
const PLAYER_NAME: &[&str] = &["PlayerName", "Name"];

const TEAM_BATTING_V1: &[FieldSpec] = &[
    field("team", TEAM, Text),
    field("g", &["G"], Int),
    field("ab", &["AB"], Int),
    field("r", &["R"], Int),
    field("h", &["H"], Int),
    field("hr", &["HR"], Int),
    field("rbi", &["RBI"], Int),
    field("sb", &["SB"], Int),
    field("obp", &["OBP"], Real),
    field("slg", &["SLG"], Real),
];

const TEAM_PITCHING_V1: &[FieldSpec] = &[
    field("team", TEAM, Text),
    field("w", &["W"], Int),
    field("l", &["L"], Int),
    field("era", &["ERA"], Real),
    field("ip", &["IP"], Real),
    field("so", &["SO"], Int),
    field("whip", &["WHIP"], Real),
    field("fip", &["FIP"], Real),
];

const PLAYER_BATTING_V1: &[FieldSpec] = &[
    field("player_id", PLAYER_ID, Int),
    field("idfg", IDFG, Text),
    field("player_name", PLAYER_NAME, Text),
    field("team", TEAM, Text),
    field("age", &["Age"], Int),
    field("g", &["G"], Int),
    field("pa", &["PA"], Int),
    field("ab", &["AB"], Int),
    field("r", &["R"], Int),
    field("h", &["H"], Int),
    field("doubles", &["2B"], Int),
    field("triples", &["3B"], Int),
    field("hr", &["HR"], Int),
    field("rbi", &["RBI"], Int),
    field("sb", &["SB"], Int),
    field("cs", &["CS"], Int),
    field("bb", &["BB"], Int),
    field("so", &["SO"], Int),
    field("hbp", &["HBP"], Int),
    field("avg", &["AVG"], Real),
    field("obp", &["OBP"], Real),
    field("slg", &["SLG"], Real),
    field("ops", &["OPS"], Real),
];

const PLAYER_PITCHING_V1: &[FieldSpec] = &[
    field("player_id", PLAYER_ID, Int),
    field("idfg", IDFG, Text),
    field("player_name", PLAYER_NAME, Text),
    field("team", TEAM, Text),
    field("age", &["Age"], Int),
    field("w", &["W"], Int),
    field("l", &["L"], Int),
    field("era", &["ERA"], Real),
    field("g", &["G"], Int),
    field("gs", &["GS"], Int),
    field("ip", &["IP"], Real),
    field("h", &["H"], Int),
    field("r", &["R"], Int),
    field("er", &["ER"], Int),
    field("bb", &["BB"], Int),
    field("so", &["SO"], Int),
    field("whip", &["WHIP"], Real),
    field("era_plus", &["ERA+"], Int),
];

/// Layout of the upstream leaderboard payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    #[default]
    FanGraphsLeadersV1,
}

impl SchemaVersion {
    /// Field table for a raw table. Game logs do not come from leaderboards.
    pub fn fields(self, table: RawTable) -> &'static [FieldSpec] {
        match (self, table) {
            (SchemaVersion::FanGraphsLeadersV1, RawTable::TeamBatting) => TEAM_BATTING_V1,
            (SchemaVersion::FanGraphsLeadersV1, RawTable::TeamPitching) => TEAM_PITCHING_V1,
            (SchemaVersion::FanGraphsLeadersV1, RawTable::PlayerBatting) => PLAYER_BATTING_V1,
            (SchemaVersion::FanGraphsLeadersV1, RawTable::PlayerPitching) => PLAYER_PITCHING_V1,
            (SchemaVersion::FanGraphsLeadersV1, RawTable::GameLogs) => &[],
        }
    }
}

/// Project a source row onto raw columns. Columns with no usable source
/// value come out as null.
pub fn map_row(row: &Map<String, Value>, fields: &[FieldSpec]) -> Map<String, Value> {
    let mut out = Map::with_capacity(fields.len());
    for spec in fields {
        let value = spec
            .sources
            .iter()
            .filter_map(|name| row.get(*name))
            .map(|raw| convert(raw, spec.kind))
            .find(|v| !v.is_null())
            .unwrap_or(Value::Null);
        out.insert(spec.column.to_string(), value);
    }
    out
}

/// Map every row and deserialize it into `T`, adding `injected` columns
/// (such as the season) to each. Rows that still miss a required column are
/// skipped.
pub fn decode_rows<T: DeserializeOwned>(
    rows: &[Map<String, Value>],
    fields: &[FieldSpec],
    injected: &[(&str, Value)],
) -> Vec<T> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut mapped = map_row(row, fields);
        for (column, value) in injected {
            mapped.insert(column.to_string(), value.clone());
        }
        match serde_json::from_value(Value::Object(mapped)) {
            Ok(record) => records.push(record),
            Err(e) => debug!(error = %e, "skipping source row"),
        }
    }
    records
}

fn convert(value: &Value, kind: FieldKind) -> Value {
    match (kind, value) {
        (_, Value::Null) => Value::Null,
        (FieldKind::Text, Value::String(s)) => {
            let text = strip_html(s);
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            }
        }
        (FieldKind::Text, Value::Number(n)) => Value::String(n.to_string()),
        (FieldKind::Int, Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .map(Value::from)
            .unwrap_or(Value::Null),
        (FieldKind::Int, Value::String(s)) => parse_number(s)
            .map(|f| Value::from(f.round() as i64))
            .unwrap_or(Value::Null),
        (FieldKind::Real, Value::Number(n)) => n
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        (FieldKind::Real, Value::String(s)) => parse_number(s)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Parse a display number such as `.220`, `12.5 %`, or `<b>41</b>`.
fn parse_number(s: &str) -> Option<f64> {
    let text = strip_html(s);
    let text = text.trim_end_matches('%').trim();
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Remove markup tags and trim. Leaderboards wrap names and teams in links.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}
