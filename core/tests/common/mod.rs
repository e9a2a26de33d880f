//! Shared helpers for the integration tests.
#![allow(dead_code)]

use multiverse_core::{
    store::{CharacterRow, DirectionRow, LocationRow, UniverseRow},
    action_log::ActionLogEntry,
    types::{Tick, UniverseId, ROOT_CHARACTER_ID},
    Action, Multiverse, MultiverseConfig,
};
use tempfile::TempDir;

/// An engine on a private instance directory. The directory lives as long as the value.
pub struct TestInstance {
    pub dir: TempDir,
    pub mv:  Multiverse,
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn instance() -> TestInstance {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let mv = Multiverse::open(MultiverseConfig::new(dir.path())).expect("open multiverse");
    TestInstance { dir, mv }
}

pub fn instance_with(config: impl FnOnce(MultiverseConfig) -> MultiverseConfig) -> TestInstance {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let mv = Multiverse::open(config(MultiverseConfig::new(dir.path()))).expect("open multiverse");
    TestInstance { dir, mv }
}

impl TestInstance {
    /// Close the engine and open the same directory again.
    pub fn reopen(self) -> TestInstance {
        let TestInstance { dir, mv } = self;
        let config = mv.config().clone();
        mv.close().expect("close");
        let mv = Multiverse::open(config).expect("reopen");
        TestInstance { dir, mv }
    }
}

pub fn root(mv: &mut Multiverse, action: Action) {
    mv.apply(&action, ROOT_CHARACTER_ID);
}

pub fn player(id: &str) -> Action {
    Action::CreatePlayer { player_id: id.into() }
}

pub fn universe(parent_id: Option<UniverseId>) -> Action {
    Action::CreateUniverse { parent_id }
}

pub fn location(universe_id: UniverseId, name: &str, description: &str) -> Action {
    Action::CreateLocation {
        name: name.into(),
        universe_id,
        description: description.into(),
    }
}

pub fn connect(universe_id: UniverseId, from: &str, to: &str, travel_time: i64) -> Action {
    Action::ConnectLocations {
        from_name: from.into(),
        to_name: to.into(),
        universe_id,
        travel_time,
    }
}

pub fn character(
    player_id: Option<&str>,
    universe_id: Option<UniverseId>,
    parent_id: Option<i64>,
) -> Action {
    Action::CreateCharacter {
        player_id: player_id.map(Into::into),
        universe_id,
        parent_id,
    }
}

/// Direction rows as (from, to, travel_time, ordinal) tuples.
pub fn direction_tuples(rows: &[DirectionRow]) -> Vec<(String, String, i64, i64)> {
    rows.iter()
        .map(|d| (d.from_name.clone(), d.to_name.clone(), d.travel_time, d.ordinal))
        .collect()
}

/// Everything an action could touch, across all partitions.
#[derive(Debug, PartialEq)]
pub struct Snapshot {
    pub tick:       Tick,
    pub players:    Vec<String>,
    pub universes:  Vec<UniverseRow>,
    pub characters: Vec<CharacterRow>,
    pub actions:    Vec<ActionLogEntry>,
    pub graphs:     Vec<(UniverseId, Vec<LocationRow>, Vec<DirectionRow>)>,
}

pub fn snapshot(mv: &Multiverse) -> Snapshot {
    let root = mv.root();
    Snapshot {
        tick:       root.tick().expect("tick"),
        players:    root.players().expect("players"),
        universes:  root.universes().expect("universes"),
        characters: root.characters().expect("characters"),
        actions:    root.actions().expect("actions"),
        graphs: mv
            .universe_ids()
            .into_iter()
            .map(|id| {
                let store = mv.universe(id).expect("universe");
                (
                    id,
                    store.locations().expect("locations"),
                    store.directions().expect("directions"),
                )
            })
            .collect(),
    }
}
