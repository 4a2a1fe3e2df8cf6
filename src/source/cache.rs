//! File cache for API responses
//!
//! Responses are stored as JSON files named after the request, and treated as
//! stale once their modification time is older than the configured TTL.
//! Cache failures never fail a fetch; they only cost a network round trip.

use serde_json::Value;
use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tracing::debug;

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file, creating parent directories
pub fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Path of the entry for a request, e.g. `fangraphs_bat_2024_team.json`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_key(key)))
    }

    /// Cached response, if present, fresh and parseable.
    pub fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age > self.ttl {
            debug!(path = %path.display(), "cache entry expired");
            return None;
        }

        let contents = try_read_to_string(&path)?;
        serde_json::from_str(&contents).ok()
    }

    pub fn put(&self, key: &str, value: &Value) {
        let path = self.entry_path(key);
        let written = serde_json::to_string(value)
            .map_err(std::io::Error::other)
            .and_then(|contents| write_string(&path, &contents));
        if let Err(e) = written {
            debug!(path = %path.display(), error = %e, "could not write cache entry");
        }
    }
}

fn file_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
