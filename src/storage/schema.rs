//! Store handle, namespaces, and schema management
//!
//! The store is one SQLite main file with three attached databases, one per
//! namespace. Tables are always addressed through their namespace
//! (`raw.team_batting`, `features.player_features`, ...).

use crate::config::StoreConfig;
use crate::error::{EtlError, Result};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use super::transform;

/// The three layers of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Raw,
    Processed,
    Features,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Raw, Namespace::Processed, Namespace::Features];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Raw => "raw",
            Namespace::Processed => "processed",
            Namespace::Features => "features",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tables of the raw layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawTable {
    TeamBatting,
    TeamPitching,
    GameLogs,
    PlayerBatting,
    PlayerPitching,
}

impl RawTable {
    pub const ALL: [RawTable; 5] = [
        RawTable::TeamBatting,
        RawTable::TeamPitching,
        RawTable::GameLogs,
        RawTable::PlayerBatting,
        RawTable::PlayerPitching,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RawTable::TeamBatting => "team_batting",
            RawTable::TeamPitching => "team_pitching",
            RawTable::GameLogs => "game_logs",
            RawTable::PlayerBatting => "player_batting",
            RawTable::PlayerPitching => "player_pitching",
        }
    }

    /// Namespace-qualified name, e.g. `raw.team_batting`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", Namespace::Raw, self.name())
    }

    fn create_sql(&self) -> &'static str {
        match self {
            RawTable::TeamBatting => CREATE_TEAM_BATTING,
            RawTable::TeamPitching => CREATE_TEAM_PITCHING,
            RawTable::GameLogs => CREATE_GAME_LOGS,
            RawTable::PlayerBatting => CREATE_PLAYER_BATTING,
            RawTable::PlayerPitching => CREATE_PLAYER_PITCHING,
        }
    }
}

const CREATE_TEAM_BATTING: &str = "
CREATE TABLE IF NOT EXISTS raw.team_batting (
    season INTEGER NOT NULL,
    team TEXT NOT NULL,
    g INTEGER,
    ab INTEGER,
    r INTEGER,
    h INTEGER,
    hr INTEGER,
    rbi INTEGER,
    sb INTEGER,
    obp REAL,
    slg REAL,
    PRIMARY KEY (season, team)
)";

const CREATE_TEAM_PITCHING: &str = "
CREATE TABLE IF NOT EXISTS raw.team_pitching (
    season INTEGER NOT NULL,
    team TEXT NOT NULL,
    w INTEGER,
    l INTEGER,
    era REAL,
    ip REAL,
    so INTEGER,
    whip REAL,
    fip REAL,
    PRIMARY KEY (season, team)
)";

const CREATE_GAME_LOGS: &str = "
CREATE TABLE IF NOT EXISTS raw.game_logs (
    season INTEGER NOT NULL,
    team TEXT NOT NULL,
    date TEXT NOT NULL,
    opp TEXT NOT NULL,
    wl TEXT,
    r INTEGER,
    ra INTEGER,
    inn INTEGER,
    gb TEXT,
    home_away TEXT,
    PRIMARY KEY (season, team, opp, date)
)";

const CREATE_PLAYER_BATTING: &str = "
CREATE TABLE IF NOT EXISTS raw.player_batting (
    season INTEGER NOT NULL,
    player_id INTEGER NOT NULL, -- MLBAM id
    player_name TEXT,
    team TEXT,
    idfg TEXT, -- FanGraphs id
    age INTEGER,
    g INTEGER,
    pa INTEGER,
    ab INTEGER,
    r INTEGER,
    h INTEGER,
    doubles INTEGER,
    triples INTEGER,
    hr INTEGER,
    rbi INTEGER,
    sb INTEGER,
    cs INTEGER,
    bb INTEGER,
    so INTEGER,
    hbp INTEGER,
    avg REAL,
    obp REAL,
    slg REAL,
    ops REAL,
    PRIMARY KEY (season, player_id)
)";

const CREATE_PLAYER_PITCHING: &str = "
CREATE TABLE IF NOT EXISTS raw.player_pitching (
    season INTEGER NOT NULL,
    player_id INTEGER NOT NULL, -- MLBAM id
    player_name TEXT,
    team TEXT,
    idfg TEXT,
    age INTEGER,
    w INTEGER,
    l INTEGER,
    era REAL,
    g INTEGER,
    gs INTEGER,
    ip REAL,
    h INTEGER,
    r INTEGER,
    er INTEGER,
    bb INTEGER,
    so INTEGER,
    whip REAL,
    era_plus INTEGER,
    PRIMARY KEY (season, player_id)
)";

/// Bookkeeping table in the main file. Writing to it takes the file lock.
const CREATE_STORE_META: &str = "
CREATE TABLE IF NOT EXISTS main.store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

/// Handle to the layered store.
///
/// Holds an exclusive lock on the main file for as long as it is open; a
/// second opener fails with [`EtlError::StoreInUse`].
pub struct Store {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if needed) the store described by `config` and make sure
    /// every namespace and table exists.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let path = config.main_path();
        let conn = Connection::open(&path)?;
        conn.busy_timeout(Duration::ZERO)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "locking_mode", "EXCLUSIVE", |row| row.get(0))?;

        let store = Self {
            conn,
            path: Some(path),
        };
        store.claim()?;
        for namespace in Namespace::ALL {
            let ns_path = config.namespace_path(namespace.as_str());
            store.attach(namespace, &ns_path.to_string_lossy())?;
        }
        store.initialize_schema()?;

        info!(path = %config.main_path().display(), "store opened");
        Ok(store)
    }

    /// Open a fully initialized store with every namespace held in memory.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.claim()?;
        for namespace in Namespace::ALL {
            store.attach(namespace, ":memory:")?;
        }
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an existing store without creating or modifying anything.
    ///
    /// Namespace files that are missing are left unattached so the integrity
    /// checker can report them.
    pub fn open_read_only(config: &StoreConfig) -> Result<Self> {
        let path = config.main_path();
        if !path.exists() {
            return Err(EtlError::StoreMissing { path });
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::ZERO)?;
        let store = Self {
            conn,
            path: Some(path),
        };

        // Touch the main file so a writer holding the lock is reported now.
        store
            .conn
            .query_row("SELECT COUNT(*) FROM main.sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| store.map_lock_error(e))?;

        for namespace in Namespace::ALL {
            let ns_path = config.namespace_path(namespace.as_str());
            if ns_path.exists() {
                store.attach(namespace, &ns_path.to_string_lossy())?;
            } else {
                debug!(namespace = %namespace, "namespace file missing; not attached");
            }
        }
        Ok(store)
    }

    /// Close the store, releasing its file lock.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| EtlError::from(e))
    }

    /// Path of the main database file, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Names of every attached database, including `main`.
    pub fn attached_namespaces(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM pragma_database_list")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    pub fn has_namespace(&self, namespace: Namespace) -> Result<bool> {
        Ok(self
            .attached_namespaces()?
            .iter()
            .any(|name| name == namespace.as_str()))
    }

    /// Whether `table` exists inside `namespace`.
    pub fn table_exists(&self, namespace: Namespace, table: &str) -> Result<bool> {
        if !self.has_namespace(namespace)? {
            return Ok(false);
        }
        let sql = format!(
            "SELECT COUNT(*) FROM {}.sqlite_master WHERE type = 'table' AND name = ?1",
            namespace
        );
        let count: i64 = self.conn.query_row(&sql, [table], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Number of rows in a namespace-qualified table.
    pub fn row_count(&self, qualified_table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", qualified_table);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Create raw tables if absent and rebuild every derived table.
    pub(crate) fn initialize_schema(&self) -> Result<()> {
        for table in RawTable::ALL {
            self.conn.execute(table.create_sql(), [])?;
        }
        transform::rebuild_all(self)?;
        Ok(())
    }

    pub(crate) fn detach(&self, namespace: Namespace) -> Result<()> {
        self.conn
            .execute(&format!("DETACH DATABASE {}", namespace), [])?;
        Ok(())
    }

    fn attach(&self, namespace: Namespace, location: &str) -> Result<()> {
        self.conn
            .execute(&format!("ATTACH DATABASE ?1 AS {}", namespace), [location])
            .map_err(|e| self.map_lock_error(e))?;
        Ok(())
    }

    /// Write to the main file, which takes and keeps the exclusive lock.
    fn claim(&self) -> Result<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        self.conn
            .execute(CREATE_STORE_META, [])
            .and_then(|_| {
                self.conn.execute(
                    "INSERT OR REPLACE INTO main.store_meta (key, value) VALUES ('opened_at', ?1)",
                    [now.to_string()],
                )
            })
            .map_err(|e| self.map_lock_error(e))?;
        Ok(())
    }

    fn map_lock_error(&self, err: rusqlite::Error) -> EtlError {
        match (&err, &self.path) {
            (rusqlite::Error::SqliteFailure(ffi, _), Some(path))
                if matches!(ffi.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                EtlError::StoreInUse { path: path.clone() }
            }
            _ => err.into(),
        }
    }
}
