//! Tunable settings for the store, history policy and editor.
//!
//! # Responsibility
//! - Carry every threshold and debounce window as plain serde values.
//! - Parse partial JSON documents over the built-in defaults.
//!
//! # Invariants
//! - Missing fields always fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key-value namespace shared by the app, the widget and other companions.
pub const DEFAULT_NAMESPACE: &str = "group.jotcache.shared";

/// Snapshot thresholds and retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPolicyConfig {
    /// Minimum age of the latest snapshot before a new one is taken.
    pub min_interval_ms: i64,
    /// Plain-text length change (in chars) that forces a snapshot.
    pub min_length_delta: usize,
    /// Entries kept per note after pruning.
    pub retention_limit: usize,
}

impl Default for HistoryPolicyConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 10 * 60 * 1000,
            min_length_delta: 50,
            retention_limit: 20,
        }
    }
}

/// Shared store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub namespace: String,
    pub history: HistoryPolicyConfig,
    /// Quiet window before observers hear about note writes.
    pub notify_debounce_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            history: HistoryPolicyConfig::default(),
            notify_debounce_ms: 400,
        }
    }
}

impl StoreConfig {
    /// Parses a JSON object; absent fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn notify_debounce(&self) -> Duration {
        Duration::from_millis(self.notify_debounce_ms)
    }
}

/// Editor-side settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet window between the last edit and the autosave write.
    pub autosave_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 200,
        }
    }
}

impl EditorConfig {
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
