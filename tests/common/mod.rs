//! Shared fixtures: an in-memory stats source with a small 2024 season.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use baseball_etl::{
    storage::{
        GameLogRecord, PlayerBattingRecord, PlayerPitchingRecord, TeamBattingRecord,
        TeamPitchingRecord,
    },
    FangraphsId, FetchError, FetchResult, PlayerId, PlayerLookup, Season, StatsSource, TeamAbbr,
};

pub const TEAMS: [&str; 6] = ["LAD", "NYY", "ATL", "HOU", "PHI", "SD"];

/// Stats source backed by fixture vectors, counting the calls it receives.
#[derive(Default)]
pub struct FakeSource {
    pub team_batting: Vec<TeamBattingRecord>,
    pub team_pitching: Vec<TeamPitchingRecord>,
    pub game_logs: Vec<GameLogRecord>,
    pub player_batting: Vec<PlayerBattingRecord>,
    pub player_pitching: Vec<PlayerPitchingRecord>,
    pub people: Vec<PlayerLookup>,
    pub fail_game_logs: bool,
    pub fail_player_batting: bool,
    pub lookup_calls: AtomicUsize,
    pub player_batting_calls: AtomicUsize,
}

impl FakeSource {
    pub fn season_2024() -> Self {
        let season = Season::new(2024);
        Self {
            team_batting: TEAMS
                .iter()
                .enumerate()
                .map(|(i, team)| TeamBattingRecord {
                    season,
                    team: TeamAbbr::new(team),
                    g: Some(162),
                    ab: Some(5500),
                    r: Some(842 - 10 * i as i64),
                    h: Some(1400),
                    hr: Some(200),
                    rbi: Some(800),
                    sb: Some(100),
                    obp: Some(0.335),
                    slg: Some(0.446),
                })
                .collect(),
            team_pitching: TEAMS
                .iter()
                .map(|team| TeamPitchingRecord {
                    season,
                    team: TeamAbbr::new(team),
                    w: Some(90),
                    l: Some(72),
                    era: Some(3.90),
                    ip: Some(1450.1),
                    so: Some(1450),
                    whip: Some(1.21),
                    fip: Some(3.95),
                })
                .collect(),
            game_logs: TEAMS[1..]
                .iter()
                .enumerate()
                .map(|(i, opp)| GameLogRecord {
                    season,
                    team: TeamAbbr::new("LAD"),
                    date: format!("2024-04-{:02}", i + 1),
                    opp: opp.to_string(),
                    wl: Some("W".to_string()),
                    r: Some(6),
                    ra: Some(2),
                    inn: Some(9),
                    gb: None,
                    home_away: Some("Home".to_string()),
                })
                .collect(),
            player_batting: vec![
                batting(545361, "10155", "Mike Trout", "LAA", 10),
                batting(660271, "19755", "Shohei Ohtani", "LAD", 54),
                batting(592450, "15640", "Aaron Judge", "NYY", 58),
            ],
            player_pitching: vec![pitching(660271, "Shohei Ohtani")],
            people: vec![
                lookup(545361, Some("10155"), "Mike Trout"),
                lookup(660271, Some("19755"), "Shohei Ohtani"),
                lookup(592450, None, "Aaron Judge"),
            ],
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn batting_fetches(&self) -> usize {
        self.player_batting_calls.load(Ordering::SeqCst)
    }
}

pub fn batting(id: i64, idfg: &str, name: &str, team: &str, hr: i64) -> PlayerBattingRecord {
    PlayerBattingRecord {
        season: Season::new(2024),
        player_id: PlayerId::new(id),
        player_name: name.to_string(),
        team: Some(team.to_string()),
        idfg: Some(FangraphsId::new(idfg)),
        age: Some(30),
        g: Some(100),
        pa: Some(450),
        ab: Some(400),
        r: Some(70),
        h: Some(110),
        doubles: Some(20),
        triples: Some(2),
        hr: Some(hr),
        rbi: Some(90),
        sb: Some(10),
        cs: Some(2),
        bb: Some(45),
        so: Some(100),
        hbp: Some(5),
        avg: Some(0.275),
        obp: Some(0.360),
        slg: Some(0.520),
        ops: Some(0.880),
    }
}

pub fn pitching(id: i64, name: &str) -> PlayerPitchingRecord {
    PlayerPitchingRecord {
        season: Season::new(2024),
        player_id: PlayerId::new(id),
        player_name: name.to_string(),
        team: Some("LAD".to_string()),
        idfg: None,
        age: Some(29),
        w: Some(10),
        l: Some(5),
        era: Some(3.14),
        g: Some(23),
        gs: Some(23),
        ip: Some(132.0),
        h: Some(85),
        r: Some(46),
        er: Some(46),
        bb: Some(44),
        so: Some(167),
        whip: Some(1.06),
        era_plus: Some(142),
    }
}

pub fn lookup(id: i64, idfg: Option<&str>, name: &str) -> PlayerLookup {
    PlayerLookup {
        player_id: PlayerId::new(id),
        fangraphs_id: idfg.map(FangraphsId::new),
        full_name: name.to_string(),
    }
}

impl StatsSource for FakeSource {
    async fn team_batting(&self, season: Season) -> FetchResult<Vec<TeamBattingRecord>> {
        Ok(self
            .team_batting
            .iter()
            .filter(|r| r.season == season)
            .cloned()
            .collect())
    }

    async fn team_pitching(&self, season: Season) -> FetchResult<Vec<TeamPitchingRecord>> {
        Ok(self
            .team_pitching
            .iter()
            .filter(|r| r.season == season)
            .cloned()
            .collect())
    }

    async fn game_logs(&self, season: Season, team: &TeamAbbr) -> FetchResult<Vec<GameLogRecord>> {
        if self.fail_game_logs {
            return Err(FetchError::Status {
                url: "http://fake/schedule".to_string(),
                status: 503,
            });
        }
        Ok(self
            .game_logs
            .iter()
            .filter(|r| r.season == season && &r.team == team)
            .cloned()
            .collect())
    }

    async fn player_batting(&self, season: Season) -> FetchResult<Vec<PlayerBattingRecord>> {
        self.player_batting_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_player_batting {
            return Err(FetchError::Status {
                url: "http://fake/leaders".to_string(),
                status: 500,
            });
        }
        Ok(self
            .player_batting
            .iter()
            .filter(|r| r.season == season)
            .cloned()
            .collect())
    }

    async fn player_pitching(&self, season: Season) -> FetchResult<Vec<PlayerPitchingRecord>> {
        Ok(self
            .player_pitching
            .iter()
            .filter(|r| r.season == season)
            .cloned()
            .collect())
    }

    async fn lookup_player(&self, last: &str, first: &str) -> FetchResult<Option<PlayerLookup>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        let wanted = format!("{} {}", first, last);
        Ok(self
            .people
            .iter()
            .find(|p| p.full_name.to_lowercase() == wanted)
            .cloned())
    }
}
