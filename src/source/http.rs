//! HTTP-backed stats source
//!
//! Season aggregates come from the FanGraphs leaderboard API; identities,
//! team ids and game results come from the MLB Stats API.

use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{
    cache::ResponseCache,
    mapping::{decode_rows, SchemaVersion},
    types::{LeadersEnvelope, PeopleEnvelope, Person, ScheduleEnvelope, TeamsEnvelope},
    FetchError, FetchResult, PlayerLookup, StatsSource,
};
use crate::cli::types::{PlayerId, Season, TeamAbbr};
use crate::config::SourceConfig;
use crate::storage::{
    models::{
        GameLogRecord, PlayerBattingRecord, PlayerPitchingRecord, TeamBattingRecord,
        TeamPitchingRecord,
    },
    schema::RawTable,
};

const LEADERS_PATH: &str = "/api/leaders/major-league/data";
const PEOPLE_SEARCH_PATH: &str = "/api/v1/people/search";
const TEAMS_PATH: &str = "/api/v1/teams";
const SCHEDULE_PATH: &str = "/api/v1/schedule";

/// FanGraphs abbreviations that differ from the MLB Stats API's.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("ARI", "AZ"),
    ("CHW", "CWS"),
    ("KCR", "KC"),
    ("SDP", "SD"),
    ("SFG", "SF"),
    ("TBR", "TB"),
    ("WSN", "WSH"),
];

#[derive(Debug, Clone, Copy)]
enum StatGroup {
    Batting,
    Pitching,
}

impl StatGroup {
    fn param(self) -> &'static str {
        match self {
            StatGroup::Batting => "bat",
            StatGroup::Pitching => "pit",
        }
    }
}

pub struct HttpStatsSource {
    client: Client,
    config: SourceConfig,
    cache: Option<ResponseCache>,
    schema: SchemaVersion,
}

impl HttpStatsSource {
    pub fn new(config: SourceConfig) -> crate::error::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("baseball-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let cache = config
            .cache_dir
            .as_ref()
            .map(|dir| ResponseCache::new(dir, config.cache_ttl));

        Ok(Self {
            client,
            config,
            cache,
            schema: SchemaVersion::default(),
        })
    }

    /// GET a JSON document, going through the response cache when enabled.
    async fn get_json(&self, cache_key: &str, url: &str, query: &[(&str, String)]) -> FetchResult<Value> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(cache_key)) {
            debug!(key = cache_key, "using cached response");
            return Ok(cached);
        }

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        let value = response.json::<Value>().await?;

        if let Some(cache) = &self.cache {
            cache.put(cache_key, &value);
        }
        Ok(value)
    }

    async fn leaders(
        &self,
        season: Season,
        group: StatGroup,
        team_totals: bool,
    ) -> FetchResult<Vec<Map<String, Value>>> {
        let url = format!("{}{}", self.config.fangraphs_base_url, LEADERS_PATH);
        let season_param = season.to_string();
        let query = [
            ("pos", "all".to_string()),
            ("stats", group.param().to_string()),
            ("lg", "all".to_string()),
            ("qual", "0".to_string()),
            ("season", season_param.clone()),
            ("season1", season_param),
            ("ind", "1".to_string()),
            ("team", if team_totals { "0,ts" } else { "0" }.to_string()),
            ("pageitems", "2000000000".to_string()),
            ("pagenum", "1".to_string()),
            ("type", "8".to_string()),
        ];
        let key = format!(
            "fangraphs_{}_{}_{}",
            group.param(),
            season,
            if team_totals { "team" } else { "player" }
        );

        let value = self.get_json(&key, &url, &query).await?;
        let envelope: LeadersEnvelope = serde_json::from_value(value)?;
        Ok(envelope.data)
    }

    fn decode<T: serde::de::DeserializeOwned>(
        &self,
        rows: &[Map<String, Value>],
        table: RawTable,
        season: Season,
    ) -> Vec<T> {
        let records = decode_rows(rows, self.schema.fields(table), &[("season", json!(season))]);
        info!(
            table = %table.qualified(),
            fetched = rows.len(),
            kept = records.len(),
            "decoded leaderboard rows"
        );
        records
    }

    /// MLB Stats API team id for a season.
    async fn team_id(&self, season: Season, team: &TeamAbbr) -> FetchResult<i64> {
        let url = format!("{}{}", self.config.mlb_base_url, TEAMS_PATH);
        let query = [("sportId", "1".to_string()), ("season", season.to_string())];
        let value = self
            .get_json(&format!("mlb_teams_{}", season), &url, &query)
            .await?;
        let envelope: TeamsEnvelope = serde_json::from_value(value)?;

        let wanted = mlb_abbreviation(team.as_str());
        envelope
            .teams
            .iter()
            .find(|t| t.abbreviation.as_deref() == Some(wanted))
            .map(|t| t.id)
            .ok_or_else(|| FetchError::UnknownTeam(team.to_string()))
    }

    async fn search_people(&self, names: &str) -> FetchResult<Vec<Person>> {
        let url = format!("{}{}", self.config.mlb_base_url, PEOPLE_SEARCH_PATH);
        let query = [("names", names.to_string()), ("sportIds", "1".to_string())];
        let value = self
            .get_json(&format!("mlb_people_{}", names), &url, &query)
            .await?;
        let envelope: PeopleEnvelope = serde_json::from_value(value)?;
        Ok(envelope.people)
    }
}

impl StatsSource for HttpStatsSource {
    async fn team_batting(&self, season: Season) -> FetchResult<Vec<TeamBattingRecord>> {
        let rows = self.leaders(season, StatGroup::Batting, true).await?;
        Ok(self.decode(&rows, RawTable::TeamBatting, season))
    }

    async fn team_pitching(&self, season: Season) -> FetchResult<Vec<TeamPitchingRecord>> {
        let rows = self.leaders(season, StatGroup::Pitching, true).await?;
        Ok(self.decode(&rows, RawTable::TeamPitching, season))
    }

    async fn game_logs(&self, season: Season, team: &TeamAbbr) -> FetchResult<Vec<GameLogRecord>> {
        let team_id = self.team_id(season, team).await?;

        let url = format!("{}{}", self.config.mlb_base_url, SCHEDULE_PATH);
        let query = [
            ("sportId", "1".to_string()),
            ("season", season.to_string()),
            ("teamId", team_id.to_string()),
            ("gameType", "R".to_string()),
            ("hydrate", "team,linescore".to_string()),
        ];
        let value = self
            .get_json(&format!("mlb_schedule_{}_{}", season, team_id), &url, &query)
            .await?;
        let envelope: ScheduleEnvelope = serde_json::from_value(value)?;

        let logs: Vec<GameLogRecord> = envelope
            .dates
            .iter()
            .flat_map(|d| d.games.iter())
            .filter(|g| g.is_final())
            .filter_map(|g| g.to_game_log(season, team_id, team))
            .collect();
        info!(team = %team, games = logs.len(), "decoded game log");
        Ok(logs)
    }

    async fn player_batting(&self, season: Season) -> FetchResult<Vec<PlayerBattingRecord>> {
        let rows = self.leaders(season, StatGroup::Batting, false).await?;
        Ok(self.decode(&rows, RawTable::PlayerBatting, season))
    }

    async fn player_pitching(&self, season: Season) -> FetchResult<Vec<PlayerPitchingRecord>> {
        let rows = self.leaders(season, StatGroup::Pitching, false).await?;
        Ok(self.decode(&rows, RawTable::PlayerPitching, season))
    }

    async fn lookup_player(&self, last: &str, first: &str) -> FetchResult<Option<PlayerLookup>> {
        let mut people = self.search_people(&format!("{} {}", first, last)).await?;
        if people.is_empty() {
            people = self.search_people(last).await?;
        }

        Ok(best_match(&people, last, first).map(|p| PlayerLookup {
            player_id: PlayerId::new(p.id),
            fangraphs_id: None,
            full_name: p.full_name.clone(),
        }))
    }
}

/// Map a FanGraphs team abbreviation to the MLB Stats API's.
pub fn mlb_abbreviation(abbr: &str) -> &str {
    TEAM_ALIASES
        .iter()
        .find(|(fangraphs, _)| *fangraphs == abbr)
        .map(|(_, mlb)| *mlb)
        .unwrap_or(abbr)
}

/// Pick the closest candidate: exact full name, then last name with a
/// matching first or preferred name, then last name alone, then whoever the
/// search ranked first.
pub fn best_match<'a>(people: &'a [Person], last: &str, first: &str) -> Option<&'a Person> {
    let last = last.to_lowercase();
    let first = first.to_lowercase();
    let full = format!("{} {}", first, last);
    let lower = |s: &Option<String>| s.as_deref().map(str::to_lowercase).unwrap_or_default();

    people
        .iter()
        .find(|p| p.full_name.to_lowercase() == full)
        .or_else(|| {
            people.iter().find(|p| {
                lower(&p.last_name) == last
                    && (lower(&p.first_name).starts_with(&first)
                        || lower(&p.use_name).starts_with(&first))
            })
        })
        .or_else(|| people.iter().find(|p| lower(&p.last_name) == last))
        .or_else(|| people.first())
}

#[cfg(test)]
mod tests;
