//! Runtime configuration: timer periods and where saves go.
//!
//! Game-balance numbers (costs, yields, caps) are NOT configuration;
//! they live in catalog.rs.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SLOT_KEY: &str = "star-miner-game-state";

/// Longest accepted timer period: one day.
pub const MAX_PERIOD_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Period of the online passive-accrual tick.
    pub idle_tick_ms: u64,
    /// Period of the unconditional backstop save.
    pub autosave_ms:  u64,
    /// Quiet window that coalesces bursts of actions into one save.
    pub debounce_ms:  u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_tick_ms: 1_000,
            autosave_ms:  30_000,
            debounce_ms:  100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Key of the single save slot.
    pub slot_key: String,
    /// SQLite file used by the runner.
    pub db_path:  String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            db_path:  "star-miner.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub scheduler: SchedulerConfig,
    pub storage:   StorageConfig,
}

impl GameConfig {
    /// Load from the data/ directory.
    /// Missing sections or fields take their defaults.
    /// In tests, use GameConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/game_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            storage:   StorageConfig {
                slot_key: DEFAULT_SLOT_KEY.to_string(),
                db_path:  ":memory:".to_string(),
            },
        }
    }

    pub fn validate(&self) -> GameResult<()> {
        let s = &self.scheduler;
        for (name, value) in [
            ("idle_tick_ms", s.idle_tick_ms),
            ("autosave_ms", s.autosave_ms),
            ("debounce_ms", s.debounce_ms),
        ] {
            if value == 0 || value > MAX_PERIOD_MS {
                let reason =
                    format!("scheduler.{name} must be in 1..={MAX_PERIOD_MS}, got {value}");
                return Err(GameError::Config { reason });
            }
        }
        if self.storage.slot_key.is_empty() {
            return Err(GameError::Config { reason: "storage.slot_key must not be empty".into() });
        }
        Ok(())
    }
}
