//! The action log: append-only, replayable history of the multiverse.
//!
//! RULE: Entries are written once and never mutated.
//! Every entry carries the tick it was recorded under and a caller-supplied
//! subtick; (tick, subtick) ordering is the replay order.

use crate::{
    action::Action,
    engine::Multiverse,
    error::{ErrorKind, SimResult},
    types::{CharacterId, Subtick, Tick, UniverseId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The action log entry as persisted to SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub tick:         Tick,
    pub subtick:      Subtick,
    pub character_id: CharacterId,
    pub universe_id:  Option<UniverseId>,
    pub payload_json: String, // JSON-serialized Action
}

impl ActionLogEntry {
    pub fn new(
        tick: Tick,
        subtick: Subtick,
        character_id: CharacterId,
        action: &Action,
    ) -> SimResult<Self> {
        Ok(Self {
            tick,
            subtick,
            character_id,
            universe_id: action.universe_id(),
            payload_json: action.to_payload()?,
        })
    }

    /// Decode the stored payload back into the action it came from.
    pub fn action(&self) -> SimResult<Action> {
        Ok(Action::from_payload(&self.payload_json)?)
    }
}

/// Diagnostic record of an action the engine refused to apply.
/// Kept in memory only; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    pub tick:         Tick,
    pub character_id: CharacterId,
    pub kind:         ErrorKind,
    pub reason:       String,
    pub action:       Action,
    pub at:           DateTime<Utc>,
}

/// Re-apply a recorded log to `target`, one batch per recorded tick.
///
/// Entries must be in (tick, subtick) order, as returned by
/// `PartitionStore::actions`. Each entry is applied as its recorded character
/// and re-recorded under the same subtick, so a fresh target ends up with the
/// same state and the same log as the source.
pub fn replay<'a, I>(target: &mut Multiverse, entries: I) -> SimResult<()>
where
    I: IntoIterator<Item = &'a ActionLogEntry>,
{
    let mut replayed = 0usize;
    for entry in entries {
        while target.tick() < entry.tick {
            target.commit()?;
        }
        let action = entry.action()?;
        target.apply(&action, entry.character_id);
        target.record_action(entry.subtick, entry.character_id, &action)?;
        replayed += 1;
    }
    if replayed > 0 {
        target.commit()?;
    }
    log::info!("tick={} replay: {replayed} actions replayed", target.tick());
    Ok(())
}
