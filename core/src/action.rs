use serde::{Deserialize, Serialize};
use crate::types::{CharacterId, PlayerId, UniverseId};

/// Every action the engine can apply.
/// Variants are added here and in `Multiverse::try_apply`, never looked up dynamically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    CreatePlayer {
        player_id: PlayerId,
    },
    CreateUniverse {
        #[serde(default)]
        parent_id: Option<UniverseId>,
    },
    CreateLocation {
        name:        String,
        universe_id: UniverseId,
        description: String,
    },
    ConnectLocations {
        from_name:   String,
        to_name:     String,
        universe_id: UniverseId,
        travel_time: i64,
    },
    CreateCharacter {
        #[serde(default)]
        player_id:   Option<PlayerId>,
        #[serde(default)]
        universe_id: Option<UniverseId>,
        #[serde(default)]
        parent_id:   Option<CharacterId>,
    },
}

impl Action {
    /// Stable variant name. Matches the `kind` tag of the serialized payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreatePlayer { .. }     => "CreatePlayer",
            Self::CreateUniverse { .. }   => "CreateUniverse",
            Self::CreateLocation { .. }   => "CreateLocation",
            Self::ConnectLocations { .. } => "ConnectLocations",
            Self::CreateCharacter { .. }  => "CreateCharacter",
        }
    }

    /// The universe this action targets, if any.
    pub fn universe_id(&self) -> Option<UniverseId> {
        match self {
            Self::CreateLocation { universe_id, .. }
            | Self::ConnectLocations { universe_id, .. } => Some(*universe_id),
            Self::CreateCharacter { universe_id, .. }    => *universe_id,
            Self::CreatePlayer { .. }
            | Self::CreateUniverse { .. }                => None,
        }
    }

    /// Whether only the root character may apply this action.
    pub fn is_root_only(&self) -> bool {
        match self {
            Self::CreatePlayer { .. }
            | Self::CreateUniverse { .. }
            | Self::CreateLocation { .. }
            | Self::ConnectLocations { .. }
            | Self::CreateCharacter { .. } => true,
        }
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}
