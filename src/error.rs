//! Error types for the baseball ETL pipeline

use std::path::PathBuf;
use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store at {} is in use by another process", .path.display())]
    StoreInUse { path: PathBuf },

    #[error("Store not found at {}; run setup first", .path.display())]
    StoreMissing { path: PathBuf },

    #[error("Namespace '{namespace}' does not exist")]
    MissingNamespace { namespace: String },

    #[error("Integrity check failed: {message}")]
    Integrity { message: String },

    #[error("Failed to parse season: {0}")]
    InvalidSeason(#[from] std::num::ParseIntError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl EtlError {
    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        EtlError::Integrity {
            message: message.into(),
        }
    }

    /// True for errors that mean the persisted state is corrupted or malformed,
    /// as opposed to an expected partial-fetch condition.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            EtlError::Integrity { .. } | EtlError::MissingNamespace { .. }
        )
    }
}
