//! Layered configuration loading using figment.
//!
//! Sources, highest priority first:
//! 1. Command-line flags (applied by the binary after loading)
//! 2. Environment variables (`PULSE_*` prefix, `__` as section separator)
//! 3. Project-level `.taskpulse/config.toml`
//! 4. User-level `<config dir>/taskpulse/config.toml`
//! 5. Built-in defaults
//!
//! `PULSE_STORE__PATH=/tmp/tasks.json` maps to `store.path`,
//! `PULSE_DASHBOARD__DAILY_TARGET=60` to `dashboard.daily_target`.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON file holding the task list.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        StoreConfig {
            path: home.join(".taskpulse").join("tasks.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Completion percentage the dashboard compares today's rate against.
    pub daily_target: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig { daily_target: 80 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// Number of day groups `history` prints unless `--limit` is given.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig { limit: 30 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PulseConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl PulseConfig {
    /// Load and validate configuration from every source.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::global_config_path())
    }

    /// Load with an explicit user-level file in place of the one under the config dir.
    pub fn load_from(global: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config: PulseConfig = Self::figment_from(global).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain with `global` as the user-level file. `None` skips that layer.
    pub fn figment_from(global: Option<PathBuf>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = global {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".taskpulse/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("PULSE_").split("__"))
    }

    /// Reject values outside their allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dashboard.daily_target > 100 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.daily_target".into(),
                reason: format!("{} is not a percentage (0-100)", self.dashboard.daily_target),
            });
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.path".into(),
                reason: "path must not be empty".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskpulse").join("config.toml"))
    }
}
