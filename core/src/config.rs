//! Instance configuration: where partitions live and how they are opened.

use crate::types::UniverseId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiverseConfig {
    /// Directory holding the root partition and one file per universe.
    pub instance_dir: PathBuf,
    #[serde(default = "default_root_file")]
    pub root_file: String,
    /// Switch partitions to WAL journaling on open.
    #[serde(default = "default_wal")]
    pub wal: bool,
    /// Mirror recorded actions into the owning universe's partition.
    #[serde(default)]
    pub local_action_log: bool,
    /// How many rejections the engine keeps before dropping the oldest.
    #[serde(default = "default_max_rejections")]
    pub max_rejections: usize,
}

fn default_root_file() -> String {
    "multiverse.db".into()
}

fn default_wal() -> bool {
    true
}

fn default_max_rejections() -> usize {
    1024
}

impl MultiverseConfig {
    pub fn new(instance_dir: impl Into<PathBuf>) -> Self {
        Self {
            instance_dir:     instance_dir.into(),
            root_file:        default_root_file(),
            wal:              default_wal(),
            local_action_log: false,
            max_rejections:   default_max_rejections(),
        }
    }

    pub fn with_local_action_log(mut self, enabled: bool) -> Self {
        self.local_action_log = enabled;
        self
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: MultiverseConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        Ok(config)
    }

    pub fn root_path(&self) -> PathBuf {
        self.instance_dir.join(&self.root_file)
    }

    pub fn universe_path(&self, universe_id: UniverseId) -> PathBuf {
        self.instance_dir.join(format!("{universe_id}.db"))
    }
}
