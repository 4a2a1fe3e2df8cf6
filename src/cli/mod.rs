//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use types::{Season, TeamAbbr};

/// Sample selection shared by `setup` and `check`
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Season year (e.g. 2024).
    #[clap(long, short, default_value_t = Season::default())]
    pub season: Season,

    /// Team whose game log is ingested.
    #[clap(long, short, default_value = "LAD")]
    pub team: TeamAbbr,

    /// Sample player to resolve, repeatable: `-p "Mike Trout" -p "Shohei Ohtani"`.
    #[clap(long = "player", short = 'p')]
    pub players: Vec<String>,

    /// Output as JSON.
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch the season sample into the raw layer and rebuild derived tables
    Setup {
        #[clap(flatten)]
        sample: SampleArgs,
    },

    /// Check the integrity of a populated store without modifying it
    Verify {
        /// Season the store is expected to contain.
        #[clap(long, short, default_value_t = Season::default())]
        season: Season,

        /// Output as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Verify, run setup if verification fails, then exercise the SDK
    Check {
        #[clap(flatten)]
        sample: SampleArgs,
    },

    /// Re-derive the processed and features layers from raw data
    Rebuild,

    /// Batting stats for a player, fetched on demand if missing
    Player {
        /// Full name, e.g. "Mike Trout".
        name: String,

        #[clap(long, short, default_value_t = Season::default())]
        season: Season,

        /// Output as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Season batting totals for a team
    Team {
        /// Team abbreviation, e.g. LAD.
        team: TeamAbbr,

        #[clap(long, short, default_value_t = Season::default())]
        season: Season,

        /// Output as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Run a SQL query against the store
    Query {
        /// SQL text; tables are namespace-qualified, e.g. `processed.team_batting`.
        sql: String,

        /// Output as JSON.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "baseball-etl",
    about = "Layered baseball statistics store with on-demand player lookups",
    version
)]
pub struct BaseballEtl {
    /// Store directory (or set `BASEBALL_ETL_DATA_DIR`).
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Bypass the HTTP response cache (or set `BASEBALL_ETL_NO_CACHE`).
    #[clap(long, global = true)]
    pub no_cache: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_defaults() {
        let app = BaseballEtl::try_parse_from(["baseball-etl", "setup"]).unwrap();
        match app.command {
            Commands::Setup { sample } => {
                assert_eq!(sample.season, Season::new(2024));
                assert_eq!(sample.team.as_str(), "LAD");
                assert!(sample.players.is_empty());
                assert!(!sample.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_repeatable_players_and_global_flags() {
        let app = BaseballEtl::try_parse_from([
            "baseball-etl",
            "check",
            "-p",
            "Mike Trout",
            "--player",
            "Shohei Ohtani",
            "--data-dir",
            "/tmp/etl",
            "--no-cache",
        ])
        .unwrap();

        assert_eq!(app.data_dir, Some(PathBuf::from("/tmp/etl")));
        assert!(app.no_cache);
        match app.command {
            Commands::Check { sample } => {
                assert_eq!(sample.players, vec!["Mike Trout", "Shohei Ohtani"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_team_lookup_normalizes_abbreviation() {
        let app =
            BaseballEtl::try_parse_from(["baseball-etl", "team", "lad", "--season", "2023"]).unwrap();
        match app.command {
            Commands::Team { team, season, json } => {
                assert_eq!(team.as_str(), "LAD");
                assert_eq!(season, Season::new(2023));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_season_is_rejected() {
        assert!(BaseballEtl::try_parse_from(["baseball-etl", "verify", "--season", "abc"]).is_err());
    }
}
