use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cli::types::{Season, TeamAbbr};
use crate::storage::models::GameLogRecord;

/// Top-level envelope of a FanGraphs leaderboard response
#[derive(Debug, Deserialize)]
pub struct LeadersEnvelope {
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
}

/// Envelope of `/api/v1/people/search`
#[derive(Debug, Deserialize)]
pub struct PeopleEnvelope {
    #[serde(default)]
    pub people: Vec<Person>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Person {
    pub id: i64,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    /// Preferred first name, e.g. "Mike" for Michael Trout
    #[serde(rename = "useName", default)]
    pub use_name: Option<String>,
}

/// Envelope of `/api/v1/teams`
#[derive(Debug, Deserialize)]
pub struct TeamsEnvelope {
    #[serde(default)]
    pub teams: Vec<MlbTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MlbTeam {
    pub id: i64,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Envelope of `/api/v1/schedule`
#[derive(Debug, Deserialize)]
pub struct ScheduleEnvelope {
    #[serde(default)]
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleDate {
    #[serde(default)]
    pub games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleGame {
    #[serde(rename = "gamePk")]
    pub game_pk: i64,
    #[serde(rename = "gameDate")]
    pub game_date: String,
    #[serde(rename = "officialDate", default)]
    pub official_date: Option<String>,
    pub status: GameStatus,
    pub teams: GameTeams,
    #[serde(default)]
    pub linescore: Option<Linescore>,
}

#[derive(Debug, Deserialize)]
pub struct GameStatus {
    #[serde(rename = "abstractGameState")]
    pub abstract_game_state: String,
}

#[derive(Debug, Deserialize)]
pub struct GameTeams {
    pub away: GameSide,
    pub home: GameSide,
}

#[derive(Debug, Deserialize)]
pub struct GameSide {
    pub team: MlbTeam,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(rename = "isWinner", default)]
    pub is_winner: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Linescore {
    #[serde(rename = "currentInning", default)]
    pub current_inning: Option<i64>,
}

impl ScheduleGame {
    pub fn is_final(&self) -> bool {
        self.status.abstract_game_state == "Final"
    }

    /// The game from the point of view of `team_id`. `None` when the team did
    /// not play in it.
    pub fn to_game_log(&self, season: Season, team_id: i64, team: &TeamAbbr) -> Option<GameLogRecord> {
        let (ours, theirs, home_away) = if self.teams.home.team.id == team_id {
            (&self.teams.home, &self.teams.away, "Home")
        } else if self.teams.away.team.id == team_id {
            (&self.teams.away, &self.teams.home, "Away")
        } else {
            return None;
        };

        let date = self
            .official_date
            .clone()
            .unwrap_or_else(|| self.game_date.chars().take(10).collect());
        let opp = theirs
            .team
            .abbreviation
            .clone()
            .or_else(|| theirs.team.name.clone())
            .unwrap_or_else(|| theirs.team.id.to_string());
        let wl = ours
            .is_winner
            .map(|won| if won { "W" } else { "L" }.to_string());

        Some(GameLogRecord {
            season,
            team: team.clone(),
            date,
            opp,
            wl,
            r: ours.score,
            ra: theirs.score,
            inn: self.linescore.as_ref().and_then(|l| l.current_inning),
            gb: None,
            home_away: Some(home_away.to_string()),
        })
    }
}
