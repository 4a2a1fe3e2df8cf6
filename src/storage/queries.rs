//! Read operations against the processed and features layers

use super::{models::*, schema::Store};
use crate::cli::types::{PlayerId, Season, TeamAbbr};
use crate::error::Result;
use rusqlite::{params, types::ValueRef, OptionalExtension, Params, Row};
use serde_json::Value as JsonValue;

impl Store {
    /// Cleaned batting line for one player and season.
    pub fn get_player_batting(
        &self,
        player_id: PlayerId,
        season: Season,
    ) -> Result<Option<PlayerBattingStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, player_id, player_name, team, age, g, pa, ab, r, h,
                    doubles, triples, hr, rbi, sb, bb, so,
                    avg_clean, obp_clean, slg_clean, ops_clean, pa_per_game
             FROM processed.player_batting
             WHERE player_id = ? AND season = ?",
        )?;

        let result = stmt
            .query_row(params![player_id.as_i64(), season.as_u16()], |row| {
                row_to_player_batting(row)
            })
            .optional()?;
        Ok(result)
    }

    /// Team batting line for one team and season.
    pub fn get_team_batting(
        &self,
        team: &TeamAbbr,
        season: Season,
    ) -> Result<Option<TeamBattingStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, team, g, ab, r, h, hr, rbi, sb, obp_clean, slg, runs_per_game
             FROM processed.team_batting
             WHERE team = ? AND season = ?",
        )?;

        let result = stmt
            .query_row(params![team.as_str(), season.as_u16()], |row| {
                Ok(TeamBattingStats {
                    season: Season::new(row.get("season")?),
                    team: TeamAbbr::new(row.get::<_, String>("team")?),
                    g: count(row, "g")?,
                    ab: count(row, "ab")?,
                    r: count(row, "r")?,
                    h: count(row, "h")?,
                    hr: count(row, "hr")?,
                    rbi: count(row, "rbi")?,
                    sb: count(row, "sb")?,
                    obp: row.get("obp_clean")?,
                    slg: row.get("slg")?,
                    runs_per_game: row.get("runs_per_game")?,
                })
            })
            .optional()?;
        Ok(result)
    }

    pub fn get_team_pitching(
        &self,
        team: &TeamAbbr,
        season: Season,
    ) -> Result<Option<TeamPitchingStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, team, w, l, era_clean, ip, so, whip, fip, win_pct
             FROM processed.team_pitching
             WHERE team = ? AND season = ?",
        )?;

        let result = stmt
            .query_row(params![team.as_str(), season.as_u16()], |row| {
                Ok(TeamPitchingStats {
                    season: Season::new(row.get("season")?),
                    team: TeamAbbr::new(row.get::<_, String>("team")?),
                    w: count(row, "w")?,
                    l: count(row, "l")?,
                    era: row.get("era_clean")?,
                    ip: row.get("ip")?,
                    so: count(row, "so")?,
                    whip: row.get("whip")?,
                    fip: row.get("fip")?,
                    win_pct: row.get("win_pct")?,
                })
            })
            .optional()?;
        Ok(result)
    }

    pub fn get_player_pitching(
        &self,
        player_id: PlayerId,
        season: Season,
    ) -> Result<Option<PlayerPitchingStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, player_id, player_name, team, age, w, l, era_clean, g, gs, ip,
                    so, whip, win_pct, k_per_inning
             FROM processed.player_pitching
             WHERE player_id = ? AND season = ?",
        )?;

        let result = stmt
            .query_row(params![player_id.as_i64(), season.as_u16()], |row| {
                Ok(PlayerPitchingStats {
                    season: Season::new(row.get("season")?),
                    player_id: PlayerId::new(row.get("player_id")?),
                    player_name: row
                        .get::<_, Option<String>>("player_name")?
                        .unwrap_or_default(),
                    team: row.get("team")?,
                    age: count(row, "age")?,
                    w: count(row, "w")?,
                    l: count(row, "l")?,
                    era: row.get("era_clean")?,
                    g: count(row, "g")?,
                    gs: count(row, "gs")?,
                    ip: row.get("ip")?,
                    so: count(row, "so")?,
                    whip: row.get("whip")?,
                    win_pct: row.get("win_pct")?,
                    k_per_inning: row.get("k_per_inning")?,
                })
            })
            .optional()?;
        Ok(result)
    }

    pub fn get_team_features(
        &self,
        team: &TeamAbbr,
        season: Season,
    ) -> Result<Option<TeamFeatures>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, team, offensive_rating, pitching_strength, combined_metric
             FROM features.team_features
             WHERE team = ? AND season = ?",
        )?;

        let result = stmt
            .query_row(params![team.as_str(), season.as_u16()], |row| {
                Ok(TeamFeatures {
                    season: Season::new(row.get("season")?),
                    team: TeamAbbr::new(row.get::<_, String>("team")?),
                    offensive_rating: row.get("offensive_rating")?,
                    pitching_strength: row.get("pitching_strength")?,
                    combined_metric: row.get("combined_metric")?,
                })
            })
            .optional()?;
        Ok(result)
    }

    pub fn get_player_features(
        &self,
        player_id: PlayerId,
        season: Season,
    ) -> Result<Option<PlayerFeatures>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, player_id, player_name, plate_appearances_efficiency, hr_rate,
                    pitching_win_strength, batter_pitcher_adjusted_metric
             FROM features.player_features
             WHERE player_id = ? AND season = ?",
        )?;

        let result = stmt
            .query_row(params![player_id.as_i64(), season.as_u16()], |row| {
                Ok(PlayerFeatures {
                    season: Season::new(row.get("season")?),
                    player_id: PlayerId::new(row.get("player_id")?),
                    player_name: row
                        .get::<_, Option<String>>("player_name")?
                        .unwrap_or_default(),
                    plate_appearances_efficiency: row.get("plate_appearances_efficiency")?,
                    hr_rate: row.get("hr_rate")?,
                    pitching_win_strength: row.get("pitching_win_strength")?,
                    batter_pitcher_adjusted_metric: row.get("batter_pitcher_adjusted_metric")?,
                })
            })
            .optional()?;
        Ok(result)
    }

    /// Game log of one team for a season, oldest game first.
    pub fn game_logs(&self, team: &TeamAbbr, season: Season) -> Result<Vec<GameLogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, team, date, opp, wl, r, ra, inn, gb, home_away
             FROM raw.game_logs
             WHERE team = ? AND season = ?
             ORDER BY date, opp",
        )?;

        let rows = stmt.query_map(params![team.as_str(), season.as_u16()], |row| {
            Ok(GameLogRecord {
                season: Season::new(row.get("season")?),
                team: TeamAbbr::new(row.get::<_, String>("team")?),
                date: row.get("date")?,
                opp: row.get("opp")?,
                wl: row.get("wl")?,
                r: row.get("r")?,
                ra: row.get("ra")?,
                inn: row.get("inn")?,
                gb: row.get("gb")?,
                home_away: row.get("home_away")?,
            })
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Distinct seasons present in a namespace-qualified table.
    pub fn distinct_seasons(&self, qualified_table: &str) -> Result<Vec<u16>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT season FROM {} ORDER BY season",
            qualified_table
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, u16>(0))?;

        let mut seasons = Vec::new();
        for row in rows {
            seasons.push(row?);
        }
        Ok(seasons)
    }

    /// Run an arbitrary parameterized query and collect the result as JSON values.
    pub fn execute_query<P: Params>(&self, sql: &str, params: P) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(value_to_json(row.get_ref(idx)?));
            }
            out.push(values);
        }

        Ok(QueryResult { columns, rows: out })
    }
}

/// Counting stat, with absent values read as zero.
fn count(row: &Row, column: &str) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(column)?.unwrap_or_default())
}

fn row_to_player_batting(row: &Row) -> rusqlite::Result<PlayerBattingStats> {
    Ok(PlayerBattingStats {
        season: Season::new(row.get("season")?),
        player_id: PlayerId::new(row.get("player_id")?),
        player_name: row
            .get::<_, Option<String>>("player_name")?
            .unwrap_or_default(),
        team: row.get("team")?,
        age: count(row, "age")?,
        g: count(row, "g")?,
        pa: count(row, "pa")?,
        ab: count(row, "ab")?,
        r: count(row, "r")?,
        h: count(row, "h")?,
        doubles: count(row, "doubles")?,
        triples: count(row, "triples")?,
        hr: count(row, "hr")?,
        rbi: count(row, "rbi")?,
        sb: count(row, "sb")?,
        bb: count(row, "bb")?,
        so: count(row, "so")?,
        avg: row.get("avg_clean")?,
        obp: row.get("obp_clean")?,
        slg: row.get("slg_clean")?,
        ops: row.get("ops_clean")?,
        pa_per_game: row.get("pa_per_game")?,
    })
}

fn value_to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => JsonValue::from(bytes.to_vec()),
    }
}
