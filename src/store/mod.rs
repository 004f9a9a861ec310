//! SQLite snapshot storage.
//!
//! Persists one row per snapshot label:
//! - snapshots: label, current (json), previous (json), updated_at (text)
//!
//! Supports:
//! - Upsert keyed by label
//! - Loading the latest record for a label
//! - Read-then-write inside a single immediate transaction

pub mod update;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use thiserror::Error;

use crate::model::{InventorySnapshot, SnapshotRecord, TIMESTAMP_FORMAT};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine data directory")]
    DataDir,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored snapshot is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored timestamp '{value}' is invalid: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
}

/// Get the database path (~/.local/share/cardex/cardex.db or platform equivalent)
pub fn default_db_path() -> Result<PathBuf, StoreError> {
    let data_dir = directories::ProjectDirs::from("", "", "cardex")
        .ok_or(StoreError::DataDir)?
        .data_dir()
        .to_path_buf();

    Ok(data_dir.join("cardex.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            label TEXT PRIMARY KEY,
            current TEXT NOT NULL,
            previous TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command (or per request when serving).
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens the configured database, or the platform default when `path` is `None`.
    pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(p) => Self::open_at(p),
            None => Self::open_at(&default_db_path()?),
        }
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened snapshot store");
        Ok(Store { conn })
    }

    /// Opens an existing database without creating or migrating anything.
    /// `None` when there is no database file or no snapshot table yet.
    pub fn open_read_only(path: Option<&Path>) -> Result<Option<Self>, StoreError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_db_path()?,
        };
        if !path.exists() {
            return Ok(None);
        }

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let has_table = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'snapshots'",
                [],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        Ok(has_table.then_some(Store { conn }))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// Load the record for `label`, if one was ever written
    pub fn load(&self, label: &str) -> Result<Option<SnapshotRecord>, StoreError> {
        load_record(&self.conn, label)
    }

    /// Insert or replace the row for `record.label`
    pub fn save(&self, record: &SnapshotRecord) -> Result<(), StoreError> {
        save_record(&self.conn, record)
    }

    /// All labels present in the store, sorted
    pub fn labels(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT label FROM snapshots ORDER BY label")?;
        let labels = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(labels)
    }

    /// Runs `f` inside an immediate transaction so a concurrent writer
    /// cannot slip in between the read and the write.
    pub(crate) fn immediate<T>(
        &mut self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

pub(crate) fn load_record(conn: &Connection, label: &str) -> Result<Option<SnapshotRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT label, current, previous, updated_at
             FROM snapshots
             WHERE label = ?1",
            params![label],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((label, current, previous, updated_at)) = row else {
        return Ok(None);
    };

    let current: InventorySnapshot = serde_json::from_str(&current)?;
    let previous: InventorySnapshot = serde_json::from_str(&previous)?;
    let updated_at = NaiveDateTime::parse_from_str(&updated_at, TIMESTAMP_FORMAT)
        .map_err(|source| StoreError::Timestamp { value: updated_at.clone(), source })?;

    Ok(Some(SnapshotRecord {
        label,
        current,
        previous,
        updated_at,
    }))
}

pub(crate) fn save_record(conn: &Connection, record: &SnapshotRecord) -> Result<(), StoreError> {
    let current = serde_json::to_string(&record.current)?;
    let previous = serde_json::to_string(&record.previous)?;

    conn.execute(
        "INSERT INTO snapshots (label, current, previous, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(label) DO UPDATE SET
            current = excluded.current,
            previous = excluded.previous,
            updated_at = excluded.updated_at",
        params![
            record.label,
            current,
            previous,
            record.updated_at_display()
        ],
    )?;

    Ok(())
}
