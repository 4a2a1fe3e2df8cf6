//! End-to-end check: verify, repair with setup if needed, then exercise the SDK.

use serde::Serialize;
use tracing::warn;

use super::{
    setup::{run_setup, SetupPlan, SetupReport},
    verify::{plan_expectations, print_report, run_verify},
};
use crate::{
    config::{Config, StoreConfig},
    error::EtlError,
    sdk::BaseballSdk,
    source::{HttpStatsSource, StatsSource},
    storage::{IntegrityReport, PlayerBattingStats, QueryResult, Store, TeamBattingStats},
    Result,
};

const SAMPLE_QUERY: &str = "SELECT * FROM features.player_features LIMIT 5";

#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Why the first verification failed, when setup had to run.
    pub initial_failure: Option<String>,
    pub setup: Option<SetupReport>,
    pub integrity: IntegrityReport,
    pub player: Option<PlayerBattingStats>,
    pub team: Option<TeamBattingStats>,
    pub sample_rows: QueryResult,
}

pub async fn run_check<S: StatsSource>(
    store_config: &StoreConfig,
    source: &S,
    plan: &SetupPlan,
) -> Result<CheckReport> {
    let expectations = plan_expectations(source, plan).await;
    let (initial_failure, setup, integrity) = match run_verify(store_config, &expectations) {
        Ok(report) => (None, None, report),
        Err(e @ EtlError::StoreInUse { .. }) => return Err(e),
        Err(e) => {
            warn!(error = %e, "verification failed; running setup");
            let mut store = Store::open(store_config)?;
            let setup = run_setup(&mut store, source, plan).await?;
            store.close()?;

            let report = run_verify(store_config, &expectations)?;
            (Some(e.to_string()), Some(setup), report)
        }
    };

    let mut sdk = BaseballSdk::new(source, store_config.clone());
    let player = match plan.players.first() {
        Some(name) => sdk.get_player(name, plan.season).await?,
        None => None,
    };
    let team = sdk.get_team_batting(&plan.team, plan.season)?;
    let sample_rows = sdk.execute_query(SAMPLE_QUERY, [])?;
    sdk.close()?;

    Ok(CheckReport {
        initial_failure,
        setup,
        integrity,
        player,
        team,
        sample_rows,
    })
}

/// Handle the check command
pub async fn handle_check(config: &Config, plan: SetupPlan, as_json: bool) -> Result<()> {
    let source = HttpStatsSource::new(config.source.clone())?;
    let report = run_check(&config.store, &source, &plan).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(reason) = &report.initial_failure {
        println!("Initial verification failed: {}", reason);
        if let Some(setup) = &report.setup {
            println!("Setup wrote {} rows", setup.rows_written());
        }
    }
    print_report(&report.integrity);

    let player_name = plan.players.first().map(String::as_str).unwrap_or_default();
    match &report.player {
        Some(stats) => println!(
            "✓ get_player('{}', {}): {} HR, {:.3} AVG",
            player_name, plan.season, stats.hr, stats.avg
        ),
        None => println!("✗ get_player('{}', {}): no data", player_name, plan.season),
    }
    match &report.team {
        Some(stats) => println!(
            "✓ get_team_batting('{}', {}): {} runs",
            plan.team, plan.season, stats.r
        ),
        None => println!("✗ get_team_batting('{}', {}): no data", plan.team, plan.season),
    }
    println!(
        "✓ execute_query: {} rows, {} columns",
        report.sample_rows.len(),
        report.sample_rows.columns.len()
    );
    Ok(())
}
