//! Command implementations for the baseball ETL CLI

pub mod check;
pub mod lookup;
pub mod setup;
pub mod verify;

pub use check::{run_check, CheckReport};
pub use setup::{run_setup, SetupPlan, SetupReport};
pub use verify::{plan_expectations, run_verify};
