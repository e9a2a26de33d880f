//! Multiverse core: the state-mutation engine of a multi-world, turn-based
//! simulation.
//!
//! State is split across a root partition (players, universes, characters,
//! the action log and the tick) and one partition per universe (its travel
//! graph). `engine::Multiverse` applies typed actions against them and
//! advances the tick on commit.

pub mod action;
pub mod action_log;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod store;
pub mod types;

pub use action::Action;
pub use config::MultiverseConfig;
pub use engine::Multiverse;
pub use error::{ErrorKind, SimError, SimResult};
