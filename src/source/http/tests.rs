//! HTTP source tests against mocked FanGraphs and MLB Stats API responses

use super::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn source_for(server: &MockServer) -> HttpStatsSource {
    HttpStatsSource::new(SourceConfig::with_base_url(server.uri())).unwrap()
}

fn person(id: i64, full: &str, first: &str, last: &str, use_name: &str) -> Person {
    Person {
        id,
        full_name: full.to_string(),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        use_name: Some(use_name.to_string()),
    }
}

#[tokio::test]
async fn test_team_batting_uses_team_totals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leaders/major-league/data"))
        .and(query_param("stats", "bat"))
        .and(query_param("team", "0,ts"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "TeamNameAbb": "LAD", "G": 162, "AB": 5591, "R": 842, "H": 1470,
                  "HR": 233, "RBI": 811, "SB": 136, "OBP": 0.335, "SLG": 0.446 },
                { "TeamNameAbb": "NYY", "G": 162, "R": 815 }
            ],
            "totalCount": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rows = source_for(&server).team_batting(Season::new(2024)).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team.as_str(), "LAD");
    assert_eq!(rows[0].season, Season::new(2024));
    assert_eq!(rows[0].r, Some(842));
    assert_eq!(rows[1].obp, None);
}

#[tokio::test]
async fn test_player_batting_skips_rows_without_mlbam_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leaders/major-league/data"))
        .and(query_param("team", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "xMLBAMID": 545361, "playerid": 10155,
                  "Name": "<a href=\"/players/mike-trout/10155\">Mike Trout</a>",
                  "PlayerName": "Mike Trout", "Team": "LAA", "G": 29, "PA": 126,
                  "2B": 2, "3B": 1, "HR": 10, "AVG": ".220" },
                { "playerid": "sa3011918", "PlayerName": "Minor Leaguer" }
            ]
        })))
        .mount(&server)
        .await;

    let rows = source_for(&server).player_batting(Season::new(2024)).await.unwrap();

    assert_eq!(rows.len(), 1);
    let trout = &rows[0];
    assert_eq!(trout.player_id, PlayerId::new(545361));
    assert_eq!(trout.player_name, "Mike Trout");
    assert_eq!(trout.team.as_deref(), Some("LAA"));
    assert_eq!(trout.doubles, Some(2));
    assert_eq!(trout.avg, Some(0.22));
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leaders/major-league/data"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .team_pitching(Season::new(2024))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leaders/major-league/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "nope" })))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .player_pitching(Season::new(2024))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_game_logs_keep_final_games_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/teams"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [
                { "id": 119, "abbreviation": "LAD", "name": "Los Angeles Dodgers" },
                { "id": 135, "abbreviation": "SD", "name": "San Diego Padres" }
            ]
        })))
        .mount(&server)
        .await;

    let side = |id: i64, abbr: &str, score: i64, won: bool| {
        json!({ "team": { "id": id, "abbreviation": abbr }, "score": score, "isWinner": won })
    };
    Mock::given(method("GET"))
        .and(path("/api/v1/schedule"))
        .and(query_param("teamId", "119"))
        .and(query_param("gameType", "R"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dates": [
                { "games": [{
                    "gamePk": 1, "gameDate": "2024-03-20T10:05:00Z", "officialDate": "2024-03-20",
                    "status": { "abstractGameState": "Final" },
                    "teams": { "away": side(119, "LAD", 5, true), "home": side(135, "SD", 2, false) },
                    "linescore": { "currentInning": 9 }
                }]},
                { "games": [{
                    "gamePk": 2, "gameDate": "2024-03-21T10:05:00Z", "officialDate": "2024-03-21",
                    "status": { "abstractGameState": "Final" },
                    "teams": { "away": side(135, "SD", 15, true), "home": side(119, "LAD", 11, false) },
                    "linescore": { "currentInning": 9 }
                }]},
                { "games": [{
                    "gamePk": 3, "gameDate": "2024-09-30T02:10:00Z",
                    "status": { "abstractGameState": "Preview" },
                    "teams": {
                        "away": { "team": { "id": 135, "abbreviation": "SD" } },
                        "home": { "team": { "id": 119, "abbreviation": "LAD" } }
                    }
                }]}
            ]
        })))
        .mount(&server)
        .await;

    let logs = source_for(&server)
        .game_logs(Season::new(2024), &TeamAbbr::new("LAD"))
        .await
        .unwrap();

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].opp, "SD");
    assert_eq!(logs[0].wl.as_deref(), Some("W"));
    assert_eq!(logs[1].wl.as_deref(), Some("L"));
    assert_eq!(logs[1].home_away.as_deref(), Some("Home"));
    assert_eq!(logs[1].ra, Some(15));
}

#[tokio::test]
async fn test_game_logs_resolve_fangraphs_alias() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [{ "id": 135, "abbreviation": "SD" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/schedule"))
        .and(query_param("teamId", "135"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dates": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let logs = source_for(&server)
        .game_logs(Season::new(2024), &TeamAbbr::new("SDP"))
        .await
        .unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_game_logs_unknown_team() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "teams": [] })))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .game_logs(Season::new(2024), &TeamAbbr::new("XYZ"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::UnknownTeam(ref t) if t == "XYZ"));
}

#[tokio::test]
async fn test_lookup_player() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/search"))
        .and(query_param("names", "mike trout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "people": [{
                "id": 545361, "fullName": "Mike Trout", "firstName": "Michael",
                "lastName": "Trout", "useName": "Mike"
            }]
        })))
        .mount(&server)
        .await;

    let found = source_for(&server)
        .lookup_player("trout", "mike")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.player_id, PlayerId::new(545361));
    assert_eq!(found.full_name, "Mike Trout");
}

#[tokio::test]
async fn test_lookup_player_falls_back_to_last_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/search"))
        .and(query_param("names", "mikey trout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "people": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/search"))
        .and(query_param("names", "trout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "people": [
                { "id": 1, "fullName": "Steve Trout", "firstName": "Steven", "lastName": "Trout" },
                { "id": 545361, "fullName": "Mike Trout", "firstName": "Michael",
                  "lastName": "Trout", "useName": "Mike" }
            ]
        })))
        .mount(&server)
        .await;

    let found = source_for(&server)
        .lookup_player("trout", "mikey")
        .await
        .unwrap()
        .unwrap();

    // no first-name prefix match, so the last-name match ranked first wins
    assert_eq!(found.player_id, PlayerId::new(1));
}

#[tokio::test]
async fn test_lookup_player_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/people/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "people": [] })))
        .mount(&server)
        .await;

    let found = source_for(&server)
        .lookup_player("nobody", "no")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_responses_are_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leaders/major-league/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "TeamNameAbb": "LAD", "W": 98, "L": 64 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache_dir = TempDir::new().unwrap();
    let mut config = SourceConfig::with_base_url(server.uri());
    config.cache_dir = Some(cache_dir.path().to_path_buf());
    let source = HttpStatsSource::new(config).unwrap();

    let first = source.team_pitching(Season::new(2024)).await.unwrap();
    let second = source.team_pitching(Season::new(2024)).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second[0].w, Some(98));
}

#[test]
fn test_best_match_order() {
    let people = vec![
        person(1, "Michael Trout Jr.", "Michael", "Trout", "Mikey"),
        person(2, "Mike Trout", "Michael", "Trout", "Mike"),
    ];
    assert_eq!(best_match(&people, "trout", "mike").unwrap().id, 2);
    assert_eq!(best_match(&people, "trout", "mic").unwrap().id, 1);
    assert_eq!(best_match(&people, "smith", "john").unwrap().id, 1);
    assert!(best_match(&[], "trout", "mike").is_none());
}

#[test]
fn test_mlb_abbreviation() {
    assert_eq!(mlb_abbreviation("SDP"), "SD");
    assert_eq!(mlb_abbreviation("WSN"), "WSH");
    assert_eq!(mlb_abbreviation("LAD"), "LAD");
}
