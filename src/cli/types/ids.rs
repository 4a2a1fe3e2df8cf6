//! ID types for players and teams.

use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for MLBAM player IDs, the primary numeric identifier.
///
/// # Examples
///
/// ```rust
/// use baseball_etl::PlayerId;
///
/// let trout = PlayerId::new(545361);
/// assert_eq!(trout.as_i64(), 545361);
/// assert_eq!(trout.to_string(), "545361");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl PlayerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse::<i64>().map_err(|e| EtlError::Config {
            message: format!("invalid player id '{}': {}", s, e),
        })?))
    }
}

/// Secondary identifier used by the FanGraphs statistics service.
///
/// Kept as text since FanGraphs mixes numeric ids with prefixed ones
/// (e.g. `sa3011918`) for minor leaguers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FangraphsId(pub String);

impl FangraphsId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FangraphsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team abbreviation, normalized to upper case (`LAD`, `NYY`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamAbbr(pub String);

impl TeamAbbr {
    pub fn new(abbr: impl AsRef<str>) -> Self {
        Self(abbr.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamAbbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TeamAbbr {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(EtlError::Config {
                message: "team abbreviation cannot be empty".to_string(),
            });
        }
        Ok(Self::new(s))
    }
}
