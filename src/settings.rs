//! Persisted reader preferences: default category and auto-refresh interval.
//!
//! Settings live under a single key (`newsSettings`) as a JSON object
//! `{"defaultCategory": ..., "refreshIntervalMs": ...}`. Loading never fails:
//! absent or unreadable data falls back to [`Settings::default`] and is logged.
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the settings object.
pub const SETTINGS_KEY: &str = "newsSettings";

/// Category selected on first launch.
pub const DEFAULT_CATEGORY: &str = "business";

/// User preferences. `refresh_interval_ms == 0` disables auto-refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub default_category: String,
    pub refresh_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            refresh_interval_ms: 0,
        }
    }
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Reads and writes [`Settings`] through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted settings, falling back to defaults.
    ///
    /// - Key absent → defaults
    /// - Backend error or malformed JSON → defaults, logged at warn
    /// - Empty `defaultCategory` → treated as malformed
    pub fn load(&self) -> Settings {
        let raw = match self.store.get_item(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No stored settings, using defaults");
                return Settings::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored settings, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) if !settings.default_category.trim().is_empty() => settings,
            Ok(_) => {
                tracing::warn!("Stored settings have an empty default category, using defaults");
                Settings::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored settings are malformed, using defaults");
                Settings::default()
            }
        }
    }

    /// Persist `settings`, replacing whatever was stored before.
    pub fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let raw = serde_json::to_string(settings)?;
        self.store.set_item(SETTINGS_KEY, &raw)?;
        tracing::debug!(
            default_category = %settings.default_category,
            refresh_interval_ms = settings.refresh_interval_ms,
            "Saved settings"
        );
        Ok(())
    }
}
