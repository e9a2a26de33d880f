//! The action application engine.
//!
//! APPLY (per action, synchronous, one at a time):
//!   1. Authorization   root-only actions from any other character are refused.
//!   2. Validation      arguments and referenced rows, in a fixed order per kind.
//!   3. Mutation        inside a savepoint of the target partition's batch.
//!
//! COMMIT (per batch):
//!   1. Write current tick + 1 into the root partition's batch.
//!   2. Flush root. Only then does the in-memory tick advance.
//!   3. Flush universes in ascending id order.
//!
//! RULES:
//!   - `apply` never returns an error. Rejections are logged and kept as
//!     diagnostics; a rejected action leaves no trace in any partition.
//!   - Duplicate keys are a silent no-op, not a rejection.
//!   - Commit is not atomic across partitions.

use crate::{
    action::Action,
    action_log::{ActionLogEntry, Rejection},
    clock::TickClock,
    config::MultiverseConfig,
    error::{SimError, SimResult},
    registry::PartitionRegistry,
    store::PartitionStore,
    types::{CharacterId, Subtick, Tick, UniverseId, ROOT_CHARACTER_ID, ROOT_PLAYER_ID},
};

pub struct Multiverse {
    clock:      TickClock,
    registry:   PartitionRegistry,
    rejections: Vec<Rejection>,
}

impl Multiverse {
    /// Open (or bootstrap) the instance described by `config`.
    pub fn open(config: MultiverseConfig) -> SimResult<Self> {
        let registry = PartitionRegistry::open(config)?;
        let tick = registry.root().tick()?;
        log::info!("tick={tick} engine: ready");
        Ok(Self {
            clock: TickClock::resume_at(tick),
            registry,
            rejections: Vec::new(),
        })
    }

    /// Flush every partition and release it.
    pub fn close(self) -> SimResult<()> {
        log::info!("tick={} engine: closing", self.clock.current_tick());
        self.registry.close_all()
    }

    /// The tick actions recorded right now are attributed to.
    pub fn tick(&self) -> Tick {
        self.clock.current_tick()
    }

    pub fn config(&self) -> &MultiverseConfig {
        self.registry.config()
    }

    // ── Read accessors ────────────────────────────────────────────

    pub fn root(&self) -> &PartitionStore {
        self.registry.root()
    }

    pub fn universe(&self, universe_id: UniverseId) -> SimResult<&PartitionStore> {
        self.registry.get(universe_id)
    }

    pub fn parent_universe(&self, universe_id: UniverseId) -> SimResult<Option<UniverseId>> {
        self.registry.parent_of(universe_id)
    }

    pub fn universe_ids(&self) -> Vec<UniverseId> {
        self.registry.universe_ids().collect()
    }

    /// Actions refused since the last `take_rejections`, oldest first.
    ///
    /// The buffer holds at most `config.max_rejections` entries; older ones
    /// are dropped first. Long-running callers should drain it with
    /// `take_rejections`.
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn take_rejections(&mut self) -> Vec<Rejection> {
        std::mem::take(&mut self.rejections)
    }

    // ── Apply ─────────────────────────────────────────────────────

    /// Apply one action on behalf of `character_id`.
    ///
    /// Never fails: a refused action is logged, recorded in `rejections()`
    /// and otherwise has no effect.
    pub fn apply(&mut self, action: &Action, character_id: CharacterId) {
        let tick = self.clock.current_tick();
        log::debug!("tick={tick} apply: {} by character {character_id}: {action:?}", action.kind());

        match self.try_apply(action, character_id) {
            Ok(()) => {}
            Err(SimError::Conflict { entity, key }) => {
                log::debug!("tick={tick} apply: {} skipped, {entity} '{key}' already exists", action.kind());
            }
            Err(e) => {
                log::error!("tick={tick} apply: {} rejected: {e}; action={action:?}", action.kind());
                self.push_rejection(Rejection {
                    tick,
                    character_id,
                    kind: e.kind(),
                    reason: e.to_string(),
                    action: action.clone(),
                    at: chrono::Utc::now(),
                });
            }
        }
    }

    fn push_rejection(&mut self, rejection: Rejection) {
        let cap = self.registry.config().max_rejections;
        if cap == 0 {
            return;
        }
        if self.rejections.len() >= cap {
            let excess = self.rejections.len() + 1 - cap;
            self.rejections.drain(..excess);
        }
        self.rejections.push(rejection);
    }

    fn try_apply(&mut self, action: &Action, character_id: CharacterId) -> SimResult<()> {
        Self::authorize(action, character_id)?;

        match action {
            Action::CreatePlayer { player_id } => self.create_player(player_id),
            Action::CreateUniverse { parent_id } => self.create_universe(*parent_id),
            Action::CreateLocation { name, universe_id, description } => {
                self.create_location(*universe_id, name, description)
            }
            Action::ConnectLocations { from_name, to_name, universe_id, travel_time } => {
                self.connect_locations(*universe_id, from_name, to_name, *travel_time)
            }
            Action::CreateCharacter { player_id, universe_id, parent_id } => {
                self.create_character(player_id.as_deref(), *universe_id, *parent_id)
            }
        }
    }

    fn authorize(action: &Action, character_id: CharacterId) -> SimResult<()> {
        if action.is_root_only() && character_id != ROOT_CHARACTER_ID {
            return Err(SimError::Unauthorized {
                action: action.kind(),
                character_id,
            });
        }
        Ok(())
    }

    fn create_player(&mut self, player_id: &str) -> SimResult<()> {
        self.registry.root_mut().atomically(|tx| {
            if tx.player_exists(player_id)? {
                return Err(SimError::conflict("player", player_id));
            }
            tx.insert_player(player_id)
        })
    }

    fn create_universe(&mut self, parent_id: Option<UniverseId>) -> SimResult<()> {
        if let Some(parent_id) = parent_id {
            if !self.registry.contains(parent_id) {
                return Err(SimError::not_found("universe", parent_id));
            }
        }
        let universe_id = self.registry.create_universe(parent_id)?;
        log::info!("tick={} apply: universe {universe_id} created", self.clock.current_tick());
        Ok(())
    }

    fn create_location(&mut self, universe_id: UniverseId, name: &str, description: &str) -> SimResult<()> {
        self.registry.get_mut(universe_id)?.atomically(|tx| {
            if tx.location_exists(name)? {
                return Err(SimError::conflict("location", name));
            }
            tx.insert_location(name, description)
        })
    }

    fn connect_locations(
        &mut self,
        universe_id: UniverseId,
        from_name:   &str,
        to_name:     &str,
        travel_time: i64,
    ) -> SimResult<()> {
        if from_name == to_name {
            return Err(SimError::invalid(format!("cannot connect location '{from_name}' to itself")));
        }
        if travel_time < 0 {
            return Err(SimError::invalid(format!("travel time cannot be negative, got {travel_time}")));
        }

        self.registry.get_mut(universe_id)?.atomically(|tx| {
            for name in [from_name, to_name] {
                if !tx.location_exists(name)? {
                    return Err(SimError::not_found("location", name));
                }
            }
            if tx.direction_exists(from_name, to_name)? || tx.direction_exists(to_name, from_name)? {
                return Err(SimError::conflict("direction", format!("{from_name}<->{to_name}")));
            }
            // Each ordinal is the out-degree of its origin before the insert.
            tx.insert_direction(from_name, to_name, travel_time, tx.out_degree(from_name)?)?;
            tx.insert_direction(to_name, from_name, travel_time, tx.out_degree(to_name)?)
        })
    }

    fn create_character(
        &mut self,
        player_id:   Option<&str>,
        universe_id: Option<UniverseId>,
        parent_id:   Option<CharacterId>,
    ) -> SimResult<()> {
        if player_id.is_some() == parent_id.is_some() {
            return Err(SimError::invalid("exactly one of player_id or parent_id must be set"));
        }
        if player_id == Some(ROOT_PLAYER_ID) {
            return Err(SimError::invalid("no additional characters are allowed for the root player"));
        }

        let character_id = self.registry.root_mut().atomically(|tx| {
            // Existence checks run in a fixed order: universe, then player or parent.
            if let Some(universe_id) = universe_id {
                if !tx.universe_exists(universe_id)? {
                    return Err(SimError::not_found("universe", universe_id));
                }
            }
            if let Some(player_id) = player_id {
                if !tx.player_exists(player_id)? {
                    return Err(SimError::not_found("player", player_id));
                }
            }
            if let Some(parent_id) = parent_id {
                if !tx.character_exists(parent_id)? {
                    return Err(SimError::not_found("character", parent_id));
                }
            }
            tx.insert_character(player_id, universe_id, parent_id)
        })?;
        log::debug!("tick={} apply: character {character_id} created", self.clock.current_tick());
        Ok(())
    }

    // ── Action log & tick ─────────────────────────────────────────

    /// Append `action` to the log under the current tick and `subtick`.
    ///
    /// Independent of `apply`: the caller decides what is logged.
    /// A (tick, subtick) collision is a caller error and comes back as `Conflict`.
    pub fn record_action(
        &mut self,
        subtick: Subtick,
        character_id: CharacterId,
        action: &Action,
    ) -> SimResult<()> {
        let tick = self.clock.current_tick();
        log::debug!("tick={tick} log: subtick={subtick} character={character_id} {action:?}");

        let entry = ActionLogEntry::new(tick, subtick, character_id, action)?;
        let local = entry
            .universe_id
            .filter(|_| self.registry.config().local_action_log);
        if let Some(universe_id) = local {
            // Resolve before touching root so a missing partition writes nothing.
            self.registry.get(universe_id)?;
        }

        self.registry.root_mut().atomically(|tx| tx.insert_action(&entry))?;
        if let Some(universe_id) = local {
            self.registry
                .get_mut(universe_id)?
                .atomically(|tx| tx.insert_local_action(&entry))?;
        }
        Ok(())
    }

    /// Close the current batch: advance the tick and flush every partition.
    /// Returns the new tick.
    pub fn commit(&mut self) -> SimResult<Tick> {
        let next_tick = self.clock.next_tick();
        let stored = self
            .registry
            .root_mut()
            .atomically(|tx| tx.set_tick(next_tick))?;
        // A failed flush keeps the batch open; the retry rewrites the same value.
        self.registry.flush_root()?;
        self.clock.advance_to(stored)?;

        self.registry.flush_universes()?;
        log::info!("tick={next_tick} commit: {} partitions flushed", self.registry.universe_ids().count() + 1);
        Ok(next_tick)
    }
}
