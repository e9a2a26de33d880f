//! Shared primitive types used across the entire multiverse.

/// A batch counter. Advanced by exactly one on every commit.
/// Signed to match the SQLite INTEGER column it is stored in.
pub type Tick = i64;

/// Orders actions recorded within the same tick. Supplied by the caller.
pub type Subtick = i64;

/// Universe identifier, assigned by the root partition.
pub type UniverseId = i64;

/// Character identifier, assigned by the root partition.
pub type CharacterId = i64;

/// Opaque player identifier.
pub type PlayerId = String;

/// The privileged player that exists from initialization.
pub const ROOT_PLAYER_ID: &str = "root";

/// The privileged character. The only one allowed to run world-shaping actions.
pub const ROOT_CHARACTER_ID: CharacterId = 0;
