//! Partition registry. Owns every open partition.
//!
//! RULE: Only the registry opens or closes a partition.
//! Callers borrow stores through `root()` / `get()`; they never keep handles.
//!
//! Universe partitions are indexed by id in a BTreeMap, so anything that
//! walks them (flush, close) does so in ascending id order.

use crate::{
    config::MultiverseConfig,
    error::{SimError, SimResult},
    store::PartitionStore,
    types::UniverseId,
};
use std::collections::BTreeMap;

pub struct UniversePartition {
    pub store:     PartitionStore,
    pub parent_id: Option<UniverseId>,
}

pub struct PartitionRegistry {
    config:    MultiverseConfig,
    root:      PartitionStore,
    universes: BTreeMap<UniverseId, UniversePartition>,
}

impl PartitionRegistry {
    /// Open the root partition (bootstrapping it if absent), then every
    /// universe partition it lists.
    pub fn open(config: MultiverseConfig) -> SimResult<Self> {
        std::fs::create_dir_all(&config.instance_dir)?;
        let root = PartitionStore::open(&config.root_path(), config.wal)?;
        root.migrate_root()?;

        let mut registry = Self {
            config,
            root,
            universes: BTreeMap::new(),
        };
        for universe in registry.root.universes()? {
            let store = registry.open_partition(universe.id)?;
            registry.register(universe.id, universe.parent_id, store)?;
        }
        log::info!(
            "registry: opened {} with {} universes",
            registry.config.instance_dir.display(),
            registry.universes.len()
        );
        Ok(registry)
    }

    pub fn config(&self) -> &MultiverseConfig {
        &self.config
    }

    pub fn root(&self) -> &PartitionStore {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut PartitionStore {
        &mut self.root
    }

    pub fn contains(&self, universe_id: UniverseId) -> bool {
        self.universes.contains_key(&universe_id)
    }

    pub fn get(&self, universe_id: UniverseId) -> SimResult<&PartitionStore> {
        self.universes
            .get(&universe_id)
            .map(|u| &u.store)
            .ok_or_else(|| SimError::not_found("universe", universe_id))
    }

    pub fn get_mut(&mut self, universe_id: UniverseId) -> SimResult<&mut PartitionStore> {
        self.universes
            .get_mut(&universe_id)
            .map(|u| &mut u.store)
            .ok_or_else(|| SimError::not_found("universe", universe_id))
    }

    pub fn parent_of(&self, universe_id: UniverseId) -> SimResult<Option<UniverseId>> {
        self.universes
            .get(&universe_id)
            .map(|u| u.parent_id)
            .ok_or_else(|| SimError::not_found("universe", universe_id))
    }

    /// Registered universe ids, ascending.
    pub fn universe_ids(&self) -> impl Iterator<Item = UniverseId> + '_ {
        self.universes.keys().copied()
    }

    /// Create and register the partition for a universe whose record was
    /// just inserted into the root partition.
    pub fn create(&mut self, universe_id: UniverseId, parent_id: Option<UniverseId>) -> SimResult<()> {
        if self.contains(universe_id) {
            return Err(SimError::conflict("universe partition", universe_id));
        }
        let store = self.open_partition(universe_id)?;
        self.register(universe_id, parent_id, store)
    }

    /// Insert a universe record and create its partition as one step.
    /// The record stays out of the root batch unless the partition exists.
    pub fn create_universe(&mut self, parent_id: Option<UniverseId>) -> SimResult<UniverseId> {
        let config = &self.config;
        let universes = &self.universes;
        let (universe_id, store) = self.root.atomically(|tx| {
            let universe_id = tx.insert_universe(parent_id)?;
            if universes.contains_key(&universe_id) {
                return Err(SimError::conflict("universe partition", universe_id));
            }
            let store = Self::open_partition_at(config, universe_id)?;
            Ok((universe_id, store))
        })?;
        self.register(universe_id, parent_id, store)?;
        Ok(universe_id)
    }

    /// Flush the root partition.
    pub fn flush_root(&mut self) -> SimResult<()> {
        self.root.flush()
    }

    /// Flush every universe partition in ascending id order.
    pub fn flush_universes(&mut self) -> SimResult<()> {
        for (universe_id, universe) in self.universes.iter_mut() {
            universe.store.flush().map_err(|e| {
                log::error!("registry: flush of universe {universe_id} failed: {e}");
                e
            })?;
        }
        Ok(())
    }

    /// Flush and release every partition, root first.
    pub fn close_all(self) -> SimResult<()> {
        let Self { root, universes, .. } = self;
        root.close()?;
        for (_, universe) in universes {
            universe.store.close()?;
        }
        Ok(())
    }

    fn open_partition(&self, universe_id: UniverseId) -> SimResult<PartitionStore> {
        Self::open_partition_at(&self.config, universe_id)
    }

    fn open_partition_at(config: &MultiverseConfig, universe_id: UniverseId) -> SimResult<PartitionStore> {
        let store = PartitionStore::open(&config.universe_path(universe_id), config.wal)?;
        store.migrate_universe()?;
        Ok(store)
    }

    fn register(
        &mut self,
        universe_id: UniverseId,
        parent_id: Option<UniverseId>,
        store: PartitionStore,
    ) -> SimResult<()> {
        log::info!("registry: universe {universe_id} open (parent {parent_id:?})");
        self.universes
            .insert(universe_id, UniversePartition { store, parent_id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(dir: &tempfile::TempDir) -> PartitionRegistry {
        PartitionRegistry::open(MultiverseConfig::new(dir.path())).unwrap()
    }

    #[test]
    fn unknown_universe_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        assert!(matches!(
            registry.get(1),
            Err(SimError::NotFound { entity: "universe", .. })
        ));
    }

    #[test]
    fn create_universe_assigns_ids_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry(&dir);

        assert_eq!(registry.create_universe(None).unwrap(), 1);
        assert_eq!(registry.create_universe(Some(1)).unwrap(), 2);

        assert!(dir.path().join("1.db").is_file());
        assert!(dir.path().join("2.db").is_file());
        assert_eq!(registry.parent_of(2).unwrap(), Some(1));
        assert_eq!(registry.universe_ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn create_refuses_registered_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry(&dir);
        registry.create_universe(None).unwrap();
        assert!(matches!(
            registry.create(1, None),
            Err(SimError::Conflict { .. })
        ));
    }

    #[test]
    fn reopen_registers_committed_universes() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry(&dir);
        registry.create_universe(None).unwrap();
        registry.create_universe(Some(1)).unwrap();
        registry.close_all().unwrap();

        let registry = self::registry(&dir);
        assert_eq!(registry.universe_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(registry.parent_of(2).unwrap(), Some(1));
    }
}
