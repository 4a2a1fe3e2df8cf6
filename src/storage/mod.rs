//! Storage layer for the baseball ETL pipeline
//!
//! This module provides the layered SQLite store, organized into logical components:
//! - `models`: Record and read-model structures
//! - `schema`: Store handle, namespaces, and raw table definitions
//! - `ingest`: Keyed upsert into the raw layer
//! - `transform`: Full rebuild of the processed and features layers
//! - `queries`: Read operations and ad-hoc queries
//! - `integrity`: Verification of a populated store

pub mod ingest;
pub mod integrity;
pub mod models;
pub mod queries;
pub mod schema;
pub mod transform;


// Re-export the main types and the store handle for easy access
pub use ingest::{ingest_fetched, upsert_rows, IngestOutcome, RawRecord, UpsertStats};
pub use integrity::{IntegrityChecker, IntegrityExpectations, IntegrityReport};
pub use models::*;
pub use schema::{Namespace, RawTable, Store};
pub use transform::{
    rebuild_all, rebuild_all_features, rebuild_all_processed, rebuild_features,
    rebuild_processed, FeatureTable, ProcessedTable,
};
