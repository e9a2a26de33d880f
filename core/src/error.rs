use thiserror::Error;

use crate::types::{CharacterId, Tick};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tick: expected {expected}, got {actual}")]
    TickMismatch { expected: Tick, actual: Tick },

    #[error("Action {action} permitted only for root character, got character {character_id}")]
    Unauthorized {
        action:       &'static str,
        character_id: CharacterId,
    },

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound { entity, key: key.to_string() }
    }

    pub fn conflict(entity: &'static str, key: impl ToString) -> Self {
        Self::Conflict { entity, key: key.to_string() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument { reason: reason.into() }
    }

    /// Coarse classification used by the diagnostic record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. }    => ErrorKind::Unauthorized,
            Self::NotFound { .. }        => ErrorKind::NotFound,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Conflict { .. }        => ErrorKind::Conflict,
            Self::Database(_)
            | Self::Serialization(_)
            | Self::Io(_)
            | Self::TickMismatch { .. }
            | Self::Other(_)             => ErrorKind::Storage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    InvalidArgument,
    Conflict,
    Storage,
}

pub type SimResult<T> = Result<T, SimError>;
