//! Lookup SDK
//!
//! Read-through access to the store: a player missing from the processed
//! layer is fetched, ingested, and derived on demand.

use std::num::NonZeroUsize;

use lru::LruCache;
use rusqlite::Params;
use tracing::{debug, info, warn};

use crate::cli::types::{Season, TeamAbbr};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::source::{split_name, PlayerLookup, StatsSource};
use crate::storage::{
    rebuild_features, rebuild_processed, upsert_rows, FeatureTable, PlayerBattingRecord,
    PlayerBattingStats, ProcessedTable, QueryResult, Store, TeamBattingStats,
};

/// Resolved names kept in memory.
const NAME_MEMO_CAPACITY: usize = 256;

pub struct BaseballSdk<S: StatsSource> {
    source: S,
    store_config: StoreConfig,
    store: Option<Store>,
    resolved: LruCache<String, PlayerLookup>,
}

impl<S: StatsSource> BaseballSdk<S> {
    /// SDK that opens the store described by `store_config` on first use.
    pub fn new(source: S, store_config: StoreConfig) -> Self {
        Self {
            source,
            store_config,
            store: None,
            resolved: LruCache::new(memo_capacity()),
        }
    }

    /// SDK over an already open store.
    pub fn with_store(source: S, store: Store) -> Self {
        Self {
            store: Some(store),
            ..Self::new(source, StoreConfig::default())
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The open store, opening it if this is the first use.
    pub fn store(&mut self) -> Result<&mut Store> {
        let store = match self.store.take() {
            Some(store) => store,
            None => Store::open(&self.store_config)?,
        };
        Ok(self.store.insert(store))
    }

    /// Resolve a display name to a player identity.
    ///
    /// Lookup failures are logged and treated as a miss.
    pub async fn resolve_player(&mut self, name: &str) -> Option<PlayerLookup> {
        let key = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if let Some(hit) = self.resolved.get(&key) {
            return Some(hit.clone());
        }

        let Some((last, first)) = split_name(&key) else {
            debug!(player = name, "name needs a first and last name");
            return None;
        };

        match self.source.lookup_player(&last, &first).await {
            Ok(Some(lookup)) => {
                debug!(player = name, player_id = %lookup.player_id, "resolved player");
                self.resolved.put(key, lookup.clone());
                Some(lookup)
            }
            Ok(None) => {
                info!("Player '{}' not found", name);
                None
            }
            Err(e) => {
                warn!(error = %e, "lookup of '{}' failed", name);
                None
            }
        }
    }

    /// Batting stats for a player in a season, fetching them if the store
    /// does not have them yet.
    pub async fn get_player(
        &mut self,
        name: &str,
        season: Season,
    ) -> Result<Option<PlayerBattingStats>> {
        let Some(lookup) = self.resolve_player(name).await else {
            return Ok(None);
        };

        if let Some(stats) = self.store()?.get_player_batting(lookup.player_id, season)? {
            return Ok(Some(stats));
        }

        info!(
            player = %lookup.full_name,
            season = %season,
            "player not in store; fetching season batting"
        );
        let rows = match self.source.player_batting(season).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "could not fetch batting for {}", lookup.full_name);
                return Ok(None);
            }
        };

        let matched = rows
            .iter()
            .find(|row| row.player_id == lookup.player_id)
            .or_else(|| {
                lookup.fangraphs_id.as_ref().and_then(|idfg| {
                    rows.iter().find(|row| row.idfg.as_ref() == Some(idfg))
                })
            });
        let Some(matched) = matched else {
            info!("No {} batting stats for {}", season, lookup.full_name);
            return Ok(None);
        };
        // keyed by the resolved id so the next read for this name hits the store
        let row = PlayerBattingRecord {
            player_id: lookup.player_id,
            ..matched.clone()
        };

        let store = self.store()?;
        upsert_rows(store, std::slice::from_ref(&row))?;
        rebuild_processed(store, ProcessedTable::PlayerBatting)?;
        rebuild_features(store, FeatureTable::PlayerFeatures)?;

        store.get_player_batting(lookup.player_id, season)
    }

    /// Team batting line straight from the processed layer.
    pub fn get_team_batting(
        &mut self,
        team: &TeamAbbr,
        season: Season,
    ) -> Result<Option<TeamBattingStats>> {
        self.store()?.get_team_batting(team, season)
    }

    pub fn execute_query<P: Params>(&mut self, sql: &str, params: P) -> Result<QueryResult> {
        self.store()?.execute_query(sql, params)
    }

    /// Release the store, if it was ever opened.
    pub fn close(self) -> Result<()> {
        match self.store {
            Some(store) => store.close(),
            None => Ok(()),
        }
    }
}

fn memo_capacity() -> NonZeroUsize {
    NonZeroUsize::new(NAME_MEMO_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}
