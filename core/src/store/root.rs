//! Root partition: players, universes, characters, tick and the action log.

use super::{conflict_or, CharacterRow, PartitionStore, PartitionTx, UniverseRow};
use crate::{
    action_log::ActionLogEntry,
    error::SimResult,
    types::{CharacterId, Tick, UniverseId},
};
use rusqlite::params;

impl PartitionTx<'_> {
    // ── Players ───────────────────────────────────────────────────

    pub fn player_exists(&self, player_id: &str) -> SimResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM players WHERE id = ?1)",
            params![player_id],
        )
    }

    pub fn insert_player(&self, player_id: &str) -> SimResult<()> {
        self.conn
            .execute("INSERT INTO players (id) VALUES (?1)", params![player_id])
            .map_err(|e| conflict_or(e, "player", player_id))?;
        Ok(())
    }

    // ── Universes ─────────────────────────────────────────────────

    pub fn universe_exists(&self, universe_id: UniverseId) -> SimResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM universes WHERE id = ?1)",
            params![universe_id],
        )
    }

    /// Insert a universe record and return its freshly assigned id.
    pub fn insert_universe(&self, parent_id: Option<UniverseId>) -> SimResult<UniverseId> {
        self.conn.execute(
            "INSERT INTO universes (parent_id) VALUES (?1)",
            params![parent_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Characters ────────────────────────────────────────────────

    pub fn character_exists(&self, character_id: CharacterId) -> SimResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM characters WHERE id = ?1)",
            params![character_id],
        )
    }

    /// Insert a character and return its freshly assigned id.
    pub fn insert_character(
        &self,
        player_id:   Option<&str>,
        universe_id: Option<UniverseId>,
        parent_id:   Option<CharacterId>,
    ) -> SimResult<CharacterId> {
        self.conn.execute(
            "INSERT INTO characters (parent_id, universe_id, player_id) VALUES (?1, ?2, ?3)",
            params![parent_id, universe_id, player_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Action log ────────────────────────────────────────────────

    pub fn insert_action(&self, entry: &ActionLogEntry) -> SimResult<()> {
        self.conn
            .execute(
                "INSERT INTO actions (tick, subtick, payload_json, character_id, universe_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.tick,
                    entry.subtick,
                    entry.payload_json,
                    entry.character_id,
                    entry.universe_id,
                ],
            )
            .map_err(|e| conflict_or(e, "action", format!("{}/{}", entry.tick, entry.subtick)))?;
        Ok(())
    }

    // ── Tick ──────────────────────────────────────────────────────

    /// Store `tick` as the persisted tick. Writing the same value twice is a no-op,
    /// so a commit retried after a failed flush still advances by one.
    pub fn set_tick(&self, tick: Tick) -> SimResult<Tick> {
        let stored = self.conn.query_row(
            "UPDATE properties SET value = ?1 WHERE name = 'tick' RETURNING value",
            params![tick],
            |row| row.get(0),
        )?;
        Ok(stored)
    }
}

impl PartitionStore {
    // ── Read accessors ────────────────────────────────────────────

    pub fn tick(&self) -> SimResult<Tick> {
        let tick = self.conn.query_row(
            "SELECT value FROM properties WHERE name = 'tick'",
            [],
            |row| row.get(0),
        )?;
        Ok(tick)
    }

    pub fn players(&self) -> SimResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM players ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn universes(&self) -> SimResult<Vec<UniverseRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, parent_id FROM universes ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(UniverseRow {
                id:        row.get(0)?,
                parent_id: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn characters(&self) -> SimResult<Vec<CharacterRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, player_id, universe_id, parent_id FROM characters ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CharacterRow {
                id:          row.get(0)?,
                player_id:   row.get(1)?,
                universe_id: row.get(2)?,
                parent_id:   row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// The root action log in (tick, subtick) order.
    pub fn actions(&self) -> SimResult<Vec<ActionLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT tick, subtick, character_id, universe_id, payload_json
             FROM actions ORDER BY tick, subtick",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ActionLogEntry {
                tick:         row.get(0)?,
                subtick:      row.get(1)?,
                character_id: row.get(2)?,
                universe_id:  row.get(3)?,
                payload_json: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
