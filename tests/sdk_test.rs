//! Integration tests for the lookup SDK

mod common;

use baseball_etl::{
    commands::{run_setup, SetupPlan},
    config::StoreConfig,
    BaseballSdk, PlayerId, Season, Store, TeamAbbr,
};
use common::{batting, lookup, FakeSource};
use tempfile::TempDir;

fn season() -> Season {
    Season::new(2024)
}

#[tokio::test]
async fn test_get_player_fetches_once_then_reads_from_store() {
    let source = FakeSource::season_2024();
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    let first = sdk.get_player("Mike Trout", season()).await.unwrap().unwrap();
    assert_eq!(first.player_id, PlayerId::new(545361));
    assert_eq!(first.player_name, "Mike Trout");
    assert_eq!(first.hr, 10);
    assert_eq!(source.batting_fetches(), 1);

    let second = sdk.get_player("Mike Trout", season()).await.unwrap().unwrap();
    assert_eq!(second, first);
    assert_eq!(source.batting_fetches(), 1);
    assert_eq!(source.lookups(), 1);

    // only the requested player was ingested, and its features were derived
    let store = sdk.store().unwrap();
    assert_eq!(store.row_count("raw.player_batting").unwrap(), 1);
    let features = store
        .get_player_features(PlayerId::new(545361), season())
        .unwrap()
        .unwrap();
    assert!((features.hr_rate.unwrap() - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_get_player_name_is_case_and_space_insensitive() {
    let source = FakeSource::season_2024();
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    assert!(sdk.get_player("mike  trout", season()).await.unwrap().is_some());
    assert!(sdk.get_player("Mike Trout ", season()).await.unwrap().is_some());
    assert_eq!(source.lookups(), 1);
}

#[tokio::test]
async fn test_get_player_unknown_name() {
    let source = FakeSource::season_2024();
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    let result = sdk.get_player("Nobody Atall", season()).await.unwrap();
    assert!(result.is_none());
    assert_eq!(source.batting_fetches(), 0);
}

#[tokio::test]
async fn test_get_player_single_token_name() {
    let source = FakeSource::season_2024();
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    assert!(sdk.get_player("Ichiro", season()).await.unwrap().is_none());
    assert_eq!(source.lookups(), 0);
}

#[tokio::test]
async fn test_get_player_fetch_failure_is_a_miss() {
    let source = FakeSource {
        fail_player_batting: true,
        ..FakeSource::season_2024()
    };
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    assert!(sdk.get_player("Mike Trout", season()).await.unwrap().is_none());
    assert_eq!(source.batting_fetches(), 1);
}

#[tokio::test]
async fn test_get_player_without_season_line() {
    let source = FakeSource::season_2024();
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    let result = sdk.get_player("Mike Trout", Season::new(2019)).await.unwrap();
    assert!(result.is_none());
    assert_eq!(
        sdk.store().unwrap().row_count("raw.player_batting").unwrap(),
        0
    );
}

#[tokio::test]
async fn test_get_player_matches_on_fangraphs_id() {
    let mut source = FakeSource::season_2024();
    // identity service knows a different MLBAM id than the leaderboard
    source.people = vec![lookup(1, Some("10155"), "Mike Trout")];
    source.player_batting = vec![batting(545361, "10155", "Mike Trout", "LAA", 10)];

    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());
    let stats = sdk.get_player("Mike Trout", season()).await.unwrap().unwrap();
    // stored under the resolved id, not the leaderboard's
    assert_eq!(stats.player_id, PlayerId::new(1));
    assert_eq!(stats.hr, 10);

    let again = sdk.get_player("Mike Trout", season()).await.unwrap().unwrap();
    assert_eq!(again, stats);
    assert_eq!(source.batting_fetches(), 1);
}

#[tokio::test]
async fn test_get_player_prefers_mlbam_id_over_fangraphs_id() {
    let mut source = FakeSource::season_2024();
    source.people = vec![lookup(545361, Some("10155"), "Mike Trout")];
    source.player_batting = vec![
        batting(999999, "10155", "Mike Trout", "LAA", 3),
        batting(545361, "10155", "Mike Trout", "LAA", 10),
    ];

    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());
    let stats = sdk.get_player("Mike Trout", season()).await.unwrap().unwrap();
    assert_eq!(stats.hr, 10);
    assert_eq!(
        sdk.store().unwrap().row_count("raw.player_batting").unwrap(),
        1
    );
}

#[tokio::test]
async fn test_get_team_batting_after_setup() {
    let source = FakeSource::season_2024();
    let mut store = Store::open_in_memory().unwrap();
    run_setup(&mut store, &source, &SetupPlan::default()).await.unwrap();

    let mut sdk = BaseballSdk::with_store(&source, store);
    let lad = sdk
        .get_team_batting(&TeamAbbr::new("LAD"), season())
        .unwrap()
        .unwrap();
    assert_eq!(lad.r, 842);
    assert!((lad.runs_per_game.unwrap() - 842.0 / 162.0).abs() < 1e-9);

    assert!(sdk
        .get_team_batting(&TeamAbbr::new("LAD"), Season::new(2023))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_get_team_batting_never_fetches() {
    let source = FakeSource::season_2024();
    let mut sdk = BaseballSdk::with_store(&source, Store::open_in_memory().unwrap());

    assert!(sdk
        .get_team_batting(&TeamAbbr::new("LAD"), season())
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_execute_query_returns_named_columns() {
    let source = FakeSource::season_2024();
    let mut store = Store::open_in_memory().unwrap();
    run_setup(&mut store, &source, &SetupPlan::default()).await.unwrap();

    let mut sdk = BaseballSdk::with_store(&source, store);
    let result = sdk
        .execute_query("SELECT * FROM features.player_features LIMIT 5", [])
        .unwrap();

    assert!(result.len() <= 5);
    assert!(!result.is_empty());
    assert!(result.has_column("player_name"));
    assert!(result.has_column("hr_rate"));
    // one row per batter, with or without a pitching line
    assert_eq!(result.len(), 3);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["columns"].is_array());
}

#[tokio::test]
async fn test_store_opens_lazily_and_closes() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path().join("data"));
    let source = FakeSource::season_2024();

    let sdk = BaseballSdk::new(&source, config.clone());
    sdk.close().unwrap();
    assert!(!config.main_path().exists());

    let mut sdk = BaseballSdk::new(&source, config.clone());
    sdk.get_player("Aaron Judge", season()).await.unwrap().unwrap();
    sdk.close().unwrap();

    assert!(config.main_path().exists());
    assert!(config.namespace_path("features").exists());

    // released: the store can be opened again
    let store = Store::open(&config).unwrap();
    assert_eq!(store.row_count("processed.player_batting").unwrap(), 1);
}
