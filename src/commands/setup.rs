//! Populate the store with a season sample, and re-derive it on demand.
//!
//! Every fetch is independent: a failing source leaves its table as it was
//! and the remaining steps still run. Processed and features layers are
//! rebuilt from whatever raw data is present at the end.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    cli::types::{Season, TeamAbbr},
    config::Config,
    source::{split_name, HttpStatsSource, PlayerLookup, StatsSource},
    storage::{
        ingest_fetched, rebuild_all, FeatureTable, IngestOutcome, ProcessedTable, RawTable, Store,
    },
    Result,
};

pub const DEFAULT_SAMPLE_TEAM: &str = "LAD";
pub const DEFAULT_SAMPLE_PLAYER: &str = "Mike Trout";

/// What to ingest.
#[derive(Debug, Clone)]
pub struct SetupPlan {
    pub season: Season,
    /// Team whose game log is fetched.
    pub team: TeamAbbr,
    /// Players whose identities are resolved and checked after ingestion.
    pub players: Vec<String>,
}

impl Default for SetupPlan {
    fn default() -> Self {
        Self {
            season: Season::default(),
            team: TeamAbbr::new(DEFAULT_SAMPLE_TEAM),
            players: vec![DEFAULT_SAMPLE_PLAYER.to_string()],
        }
    }
}

impl SetupPlan {
    /// Plan for `season` and `team`; an empty player list falls back to the
    /// default sample player.
    pub fn new(season: Season, team: TeamAbbr, players: Vec<String>) -> Self {
        let players = if players.is_empty() {
            vec![DEFAULT_SAMPLE_PLAYER.to_string()]
        } else {
            players
        };
        Self {
            season,
            team,
            players,
        }
    }
}

/// Per-table outcomes of one setup run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetupReport {
    pub outcomes: Vec<(String, IngestOutcome)>,
    /// Sample players that could not be resolved or have no batting row.
    pub missing_players: Vec<String>,
}

impl SetupReport {
    pub fn rows_written(&self) -> usize {
        self.outcomes.iter().map(|(_, o)| o.rows_written()).sum()
    }

    pub fn failed_fetches(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, IngestOutcome::FetchFailed(_)))
            .count()
    }

    fn record(&mut self, table: RawTable, outcome: IngestOutcome) {
        self.outcomes.push((table.qualified(), outcome));
    }
}

/// Ingest the plan's season into `store`, then rebuild every derived table.
pub async fn run_setup<S: StatsSource>(
    store: &mut Store,
    source: &S,
    plan: &SetupPlan,
) -> Result<SetupReport> {
    let season = plan.season;
    let mut report = SetupReport::default();
    info!(season = %season, team = %plan.team, "setting up store");

    let fetched = source.team_batting(season).await;
    report.record(RawTable::TeamBatting, ingest_fetched(store, "team batting", fetched)?);

    let fetched = source.team_pitching(season).await;
    report.record(RawTable::TeamPitching, ingest_fetched(store, "team pitching", fetched)?);

    let fetched = source.game_logs(season, &plan.team).await;
    let label = format!("{} game logs", plan.team);
    report.record(RawTable::GameLogs, ingest_fetched(store, &label, fetched)?);

    let fetched = source.player_batting(season).await;
    report.record(RawTable::PlayerBatting, ingest_fetched(store, "player batting", fetched)?);

    let fetched = source.player_pitching(season).await;
    report.record(RawTable::PlayerPitching, ingest_fetched(store, "player pitching", fetched)?);

    for name in &plan.players {
        if !sample_player_present(store, source, name, season).await? {
            report.missing_players.push(name.clone());
        }
    }

    rebuild_all(store)?;
    info!(
        rows = report.rows_written(),
        failed = report.failed_fetches(),
        "setup complete"
    );
    Ok(report)
}

/// Resolve a sample player name through the source, logging why it did not resolve.
pub(crate) async fn resolve_sample_player<S: StatsSource>(
    source: &S,
    name: &str,
) -> Option<PlayerLookup> {
    let Some((last, first)) = split_name(name) else {
        warn!("sample player '{}' needs a first and last name", name);
        return None;
    };
    match source.lookup_player(&last, &first).await {
        Ok(Some(lookup)) => Some(lookup),
        Ok(None) => {
            warn!("sample player '{}' not found", name);
            None
        }
        Err(e) => {
            warn!(error = %e, "could not look up sample player '{}'", name);
            None
        }
    }
}

/// Whether a sample player resolves and has a raw batting row for the season.
async fn sample_player_present<S: StatsSource>(
    store: &Store,
    source: &S,
    name: &str,
    season: Season,
) -> Result<bool> {
    let Some(lookup) = resolve_sample_player(source, name).await else {
        return Ok(false);
    };

    let rows: i64 = store.conn.query_row(
        "SELECT COUNT(*) FROM raw.player_batting WHERE player_id = ?1 AND season = ?2",
        rusqlite::params![lookup.player_id.as_i64(), season.as_u16()],
        |row| row.get(0),
    )?;
    if rows == 0 {
        warn!(player_id = %lookup.player_id, "no {} batting row for {}", season, name);
    }
    Ok(rows > 0)
}

/// Handle the setup command
pub async fn handle_setup(config: &Config, plan: SetupPlan, as_json: bool) -> Result<()> {
    let source = HttpStatsSource::new(config.source.clone())?;
    let mut store = Store::open(&config.store)?;

    println!(
        "Populating {} with the {} season...",
        config.store.main_path().display(),
        plan.season
    );
    let report = run_setup(&mut store, &source, &plan).await?;
    store.close()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (table, outcome) in &report.outcomes {
        match outcome {
            IngestOutcome::Upserted(stats) => println!(
                "  {:<22} {} inserted, {} updated",
                table, stats.inserted, stats.updated
            ),
            IngestOutcome::NoData => println!("  {:<22} no data", table),
            IngestOutcome::FetchFailed(msg) => println!("  {:<22} fetch failed: {}", table, msg),
        }
    }
    for name in &report.missing_players {
        println!("  ! sample player '{}' has no batting line", name);
    }
    println!("✓ Setup complete ({} rows written)", report.rows_written());
    Ok(())
}

/// Handle the rebuild command
pub fn handle_rebuild(config: &Config) -> Result<()> {
    let store = Store::open(&config.store)?;
    rebuild_all(&store)?;

    for table in ProcessedTable::ALL {
        let qualified = table.qualified();
        println!("  {:<30} {} rows", qualified, store.row_count(&qualified)?);
    }
    for table in FeatureTable::ALL {
        let qualified = table.qualified();
        println!("  {:<30} {} rows", qualified, store.row_count(&qualified)?);
    }
    store.close()?;

    println!("✓ Derived tables rebuilt");
    Ok(())
}
