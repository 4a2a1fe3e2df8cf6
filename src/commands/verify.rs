//! Read-only integrity verification

use crate::{
    cli::types::Season,
    config::StoreConfig,
    source::StatsSource,
    storage::{IntegrityChecker, IntegrityExpectations, IntegrityReport, Store},
    Result,
};

use super::setup::{resolve_sample_player, SetupPlan};

/// Open the store read-only and run every integrity check against it.
pub fn run_verify(
    store_config: &StoreConfig,
    expectations: &IntegrityExpectations,
) -> Result<IntegrityReport> {
    let store = Store::open_read_only(store_config)?;
    let report = IntegrityChecker::new(expectations.clone()).run(&store);
    store.close()?;
    report
}

/// Expectations for a setup plan: its season, its team, and its first
/// sample player as resolved by `source`.
///
/// A sample player that does not resolve drops the name assertion.
pub async fn plan_expectations<S: StatsSource>(
    source: &S,
    plan: &SetupPlan,
) -> IntegrityExpectations {
    let expectations =
        IntegrityExpectations::for_season(plan.season).with_sample_team(plan.team.clone());

    let resolved = match plan.players.first() {
        Some(name) => resolve_sample_player(source, name).await,
        None => None,
    };
    match resolved {
        Some(lookup) => {
            let surname = lookup
                .full_name
                .split_whitespace()
                .last()
                .unwrap_or(lookup.full_name.as_str())
                .to_string();
            expectations.with_sample_player(lookup.player_id, surname)
        }
        None => expectations.without_sample_player(),
    }
}

/// Handle the verify command
pub fn handle_verify(store_config: &StoreConfig, season: Season, as_json: bool) -> Result<()> {
    let report = run_verify(store_config, &IntegrityExpectations::for_season(season))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

pub(crate) fn print_report(report: &IntegrityReport) {
    for (table, count) in &report.row_counts {
        println!("  {:<30} {} rows", table, count);
    }
    for warning in &report.warnings {
        println!("  ! {}", warning);
    }
    if report.is_clean() {
        println!("✓ Store verified");
    } else {
        println!(
            "✓ Store verified with {} warning(s); population may be partial",
            report.warnings.len()
        );
    }
}
