//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The registry and the engine call store methods; they never execute SQL directly.
//!
//! One `PartitionStore` wraps one SQLite file: the root partition or a single
//! universe. Writes accumulate in an open transaction until `flush()`.
//! Each action runs inside a savepoint (`atomically`) so a failed action
//! leaves nothing behind in the batch.

mod root;
mod universe;

use crate::error::{SimError, SimResult};
use rusqlite::{ffi, Connection, Savepoint};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub struct PartitionStore {
    conn: Connection,
}

/// Handle passed to `PartitionStore::atomically`. Everything executed
/// through it is rolled back unless the closure returns `Ok`.
pub struct PartitionTx<'a> {
    conn: Savepoint<'a>,
}

// ── Row types ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseRow {
    pub id:        i64,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRow {
    pub id:          i64,
    pub player_id:   Option<String>,
    pub universe_id: Option<i64>,
    pub parent_id:   Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRow {
    pub name:        String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionRow {
    pub from_name:   String,
    pub to_name:     String,
    pub travel_time: i64,
    pub ordinal:     i64,
}

impl PartitionStore {
    /// Open (or create) the partition file at `path`.
    pub fn open(path: &Path, wal: bool) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        if wal {
            // In-memory and some filesystems refuse WAL; fall back silently.
            let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Create the root schema and bootstrap rows. Idempotent.
    pub fn migrate_root(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_root.sql"))?;
        Ok(())
    }

    /// Create the universe schema. Idempotent.
    pub fn migrate_universe(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/002_universe.sql"))?;
        Ok(())
    }

    /// Run `f` inside a savepoint of the current batch.
    /// `Ok` keeps its writes in the batch; `Err` discards all of them.
    pub fn atomically<T, F>(&mut self, f: F) -> SimResult<T>
    where
        F: FnOnce(&PartitionTx<'_>) -> SimResult<T>,
    {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN DEFERRED;")?;
        }
        let tx = PartitionTx {
            conn: self.conn.savepoint()?,
        };
        let out = f(&tx)?;
        tx.conn.commit()?;
        Ok(out)
    }

    /// Whether writes are waiting for the next flush.
    pub fn has_pending(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Durably commit the current batch, if any.
    pub fn flush(&mut self) -> SimResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT;")?;
        }
        Ok(())
    }

    /// Flush and release the connection.
    pub fn close(mut self) -> SimResult<()> {
        self.flush()?;
        self.conn.close().map_err(|(_, e)| SimError::from(e))
    }
}

impl PartitionTx<'_> {
    fn exists(&self, sql: &str, params: impl rusqlite::Params) -> SimResult<bool> {
        let found: bool = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(found)
    }
}

/// Map a duplicate-key failure to `Conflict`; anything else stays a database error.
fn conflict_or(err: rusqlite::Error, entity: &'static str, key: impl ToString) -> SimError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            SimError::conflict(entity, key)
        }
        _ => SimError::Database(err),
    }
}
