//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use baseball_etl::{
    cli::{BaseballEtl, Commands, SampleArgs},
    commands::{
        check::handle_check,
        lookup::{handle_player, handle_query, handle_team},
        setup::{handle_rebuild, handle_setup, SetupPlan},
        verify::handle_verify,
    },
    config::Config,
    EtlError,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run the CLI.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(err) = run(BaseballEtl::parse()).await {
        match err.downcast_ref::<EtlError>() {
            Some(EtlError::StoreInUse { path }) => eprintln!(
                "Error: store at {} is in use; close any process using the store and retry",
                path.display()
            ),
            _ => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(app: BaseballEtl) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(dir) = app.data_dir {
        config.store.data_dir = dir;
    }
    if app.no_cache {
        config.source.cache_dir = None;
    }

    match app.command {
        Commands::Setup { sample } => {
            let (plan, json) = plan_from(sample);
            handle_setup(&config, plan, json).await?
        }
        Commands::Verify { season, json } => handle_verify(&config.store, season, json)?,
        Commands::Check { sample } => {
            let (plan, json) = plan_from(sample);
            handle_check(&config, plan, json).await?
        }
        Commands::Rebuild => handle_rebuild(&config)?,
        Commands::Player { name, season, json } => {
            handle_player(&config, &name, season, json).await?
        }
        Commands::Team { team, season, json } => handle_team(&config, &team, season, json)?,
        Commands::Query { sql, json } => handle_query(&config, &sql, json)?,
    }

    Ok(())
}

fn plan_from(sample: SampleArgs) -> (SetupPlan, bool) {
    (
        SetupPlan::new(sample.season, sample.team, sample.players),
        sample.json,
    )
}
