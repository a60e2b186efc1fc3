//! Runtime configuration for the save system.
//!
//! One JSON file names the save root, the recognized entity kinds, and
//! the transition poll interval. Everything else is compiled in.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConfig {
    /// Directory both save records live under.
    pub save_root: String,
    /// Entity kinds the temp record starts with slots for.
    pub entity_kinds: Vec<String>,
    /// Milliseconds between fade polls during a scene transition.
    pub fade_poll_ms: u64,
}

impl SaveConfig {
    /// Load from a JSON file.
    /// In tests, use SaveConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SaveConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn fade_poll_interval(&self) -> Duration {
        Duration::from_millis(self.fade_poll_ms)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            save_root: "save-data".into(),
            entity_kinds: vec!["animal".into(), "exhibit".into(), "keeper".into()],
            fade_poll_ms: 50,
        }
    }
}
