//! Universe partition: the location graph and the local action log.

use super::{conflict_or, DirectionRow, LocationRow, PartitionStore, PartitionTx};
use crate::{action_log::ActionLogEntry, error::SimResult};
use rusqlite::params;

impl PartitionTx<'_> {
    // ── Locations ─────────────────────────────────────────────────

    pub fn location_exists(&self, name: &str) -> SimResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE name = ?1)",
            params![name],
        )
    }

    pub fn insert_location(&self, name: &str, description: &str) -> SimResult<()> {
        self.conn
            .execute(
                "INSERT INTO locations (name, description) VALUES (?1, ?2)",
                params![name, description],
            )
            .map_err(|e| conflict_or(e, "location", name))?;
        Ok(())
    }

    // ── Directions ────────────────────────────────────────────────

    pub fn direction_exists(&self, from_name: &str, to_name: &str) -> SimResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM directions WHERE from_name = ?1 AND to_name = ?2)",
            params![from_name, to_name],
        )
    }

    /// Number of edges currently leaving `from_name`. The next edge's ordinal.
    pub fn out_degree(&self, from_name: &str) -> SimResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM directions WHERE from_name = ?1",
            params![from_name],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn insert_direction(
        &self,
        from_name:   &str,
        to_name:     &str,
        travel_time: i64,
        ordinal:     i64,
    ) -> SimResult<()> {
        self.conn
            .execute(
                "INSERT INTO directions (from_name, to_name, travel_time, ordinal)
                 VALUES (?1, ?2, ?3, ?4)",
                params![from_name, to_name, travel_time, ordinal],
            )
            .map_err(|e| conflict_or(e, "direction", format!("{from_name}->{to_name}")))?;
        Ok(())
    }

    // ── Local action log ──────────────────────────────────────────

    pub fn insert_local_action(&self, entry: &ActionLogEntry) -> SimResult<()> {
        self.conn
            .execute(
                "INSERT INTO actions (tick, subtick, payload_json, character_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.tick,
                    entry.subtick,
                    entry.payload_json,
                    entry.character_id,
                ],
            )
            .map_err(|e| conflict_or(e, "action", format!("{}/{}", entry.tick, entry.subtick)))?;
        Ok(())
    }
}

impl PartitionStore {
    // ── Read accessors ────────────────────────────────────────────

    /// Locations in insertion order.
    pub fn locations(&self) -> SimResult<Vec<LocationRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, description FROM locations ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(LocationRow {
                name:        row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Directions in insertion order.
    pub fn directions(&self) -> SimResult<Vec<DirectionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_name, to_name, travel_time, ordinal FROM directions ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DirectionRow {
                from_name:   row.get(0)?,
                to_name:     row.get(1)?,
                travel_time: row.get(2)?,
                ordinal:     row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// The universe-local action log in (tick, subtick) order.
    pub fn local_actions(&self, universe_id: i64) -> SimResult<Vec<ActionLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT tick, subtick, character_id, payload_json
             FROM actions ORDER BY tick, subtick",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ActionLogEntry {
                tick:         row.get(0)?,
                subtick:      row.get(1)?,
                character_id: row.get(2)?,
                universe_id:  Some(universe_id),
                payload_json: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
