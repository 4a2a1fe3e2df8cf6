//! SDK lookups: player, team, and ad-hoc queries.

use serde::Serialize;

use crate::{
    cli::types::{Season, TeamAbbr},
    config::Config,
    sdk::BaseballSdk,
    source::HttpStatsSource,
    storage::{PlayerBattingStats, QueryResult, TeamBattingStats},
    Result,
};

/// Handle the player command
pub async fn handle_player(config: &Config, name: &str, season: Season, as_json: bool) -> Result<()> {
    let source = HttpStatsSource::new(config.source.clone())?;
    let mut sdk = BaseballSdk::new(source, config.store.clone());
    let stats = sdk.get_player(name, season).await?;
    sdk.close()?;

    match stats {
        Some(stats) if as_json => print_json(&stats)?,
        Some(stats) => println!("{}", format_player(&stats)),
        None => println!("No {} batting stats found for '{}'", season, name),
    }
    Ok(())
}

/// Handle the team command
pub fn handle_team(config: &Config, team: &TeamAbbr, season: Season, as_json: bool) -> Result<()> {
    let source = HttpStatsSource::new(config.source.clone())?;
    let mut sdk = BaseballSdk::new(source, config.store.clone());
    let stats = sdk.get_team_batting(team, season)?;
    sdk.close()?;

    match stats {
        Some(stats) if as_json => print_json(&stats)?,
        Some(stats) => println!("{}", format_team(&stats)),
        None => println!("No {} batting stats for {}; run setup first", season, team),
    }
    Ok(())
}

/// Handle the query command
pub fn handle_query(config: &Config, sql: &str, as_json: bool) -> Result<()> {
    let source = HttpStatsSource::new(config.source.clone())?;
    let mut sdk = BaseballSdk::new(source, config.store.clone());
    let result = sdk.execute_query(sql, [])?;
    sdk.close()?;

    if as_json {
        print_json(&result)?;
    } else {
        print!("{}", format_table(&result));
        println!("({} rows)", result.len());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_player(stats: &PlayerBattingStats) -> String {
    format!(
        "{} ({}) {}: {} G, {} PA, {} H, {} HR, {} RBI, {} SB\n  {} AVG / {} OBP / {} SLG, {} OPS",
        stats.player_name,
        stats.team.as_deref().unwrap_or("-"),
        stats.season,
        stats.g,
        stats.pa,
        stats.h,
        stats.hr,
        stats.rbi,
        stats.sb,
        rate(stats.avg),
        rate(stats.obp),
        rate(stats.slg),
        rate(stats.ops),
    )
}

pub fn format_team(stats: &TeamBattingStats) -> String {
    let runs_per_game = stats
        .runs_per_game
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {}: {} G, {} R ({} per game), {} H, {} HR, {} OBP",
        stats.team,
        stats.season,
        stats.g,
        stats.r,
        runs_per_game,
        stats.h,
        stats.hr,
        rate(stats.obp),
    )
}

/// Tab-separated header and rows.
pub fn format_table(result: &QueryResult) -> String {
    let mut out = result.columns.join("\t");
    out.push('\n');
    for row in &result.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                serde_json::Value::Null => "NULL".to_string(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Baseball rate notation: `.220`, `1.045`.
fn rate(value: f64) -> String {
    let s = format!("{:.3}", value);
    match s.strip_prefix("0.") {
        Some(rest) => format!(".{}", rest),
        None => s,
    }
}
