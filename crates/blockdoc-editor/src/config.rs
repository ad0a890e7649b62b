//! Editor configuration.
//!
//! [`EditorConfig`] groups the history bounds, the autosave timer periods
//! and keyboard shortcut overrides. Every field has a default, so an empty
//! JSON object is a valid configuration. Durations are written in
//! milliseconds.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::shortcuts::EditorCommand;

/// Bounds of the action log and snapshot cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum retained actions. Older edits become permanent once pruned.
    pub max_history_size: usize,
    /// Take an automatic snapshot every this many recorded actions
    /// (0 disables the action-count trigger).
    pub snapshot_interval_actions: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            max_history_size: 100,
            snapshot_interval_actions: 10,
        }
    }
}

impl HistoryConfig {
    /// Snapshots retained before pruning.
    pub fn max_snapshots(&self) -> usize {
        self.max_history_size.saturating_mul(2).max(1)
    }
}

/// Timer periods for the autosave bridge and periodic snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutosaveConfig {
    /// Period of the timed snapshot.
    #[serde(with = "millis")]
    pub auto_save_interval: Duration,
    /// Period of the recovery-record backstop write.
    #[serde(with = "millis")]
    pub storage_interval: Duration,
    /// Minimum gap between change-driven recovery writes.
    #[serde(with = "millis")]
    pub persist_debounce: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        AutosaveConfig {
            auto_save_interval: Duration::from_secs(30),
            storage_interval: Duration::from_secs(5),
            persist_debounce: Duration::from_millis(500),
        }
    }
}

/// Per-command shortcut overrides, each a comma-separated chord list
/// such as `"ctrl+z, meta+z"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutConfig(pub BTreeMap<EditorCommand, String>);

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub autosave: AutosaveConfig,
    pub shortcuts: ShortcutConfig,
}

impl EditorConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, EditorError> {
        let config: EditorConfig =
            serde_json::from_str(raw).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.history.max_history_size == 0 {
            return Err(EditorError::Config(
                "history.maxHistorySize must be at least 1".to_string(),
            ));
        }
        if self.autosave.auto_save_interval.is_zero() {
            return Err(EditorError::Config(
                "autosave.autoSaveInterval must be non-zero".to_string(),
            ));
        }
        if self.autosave.storage_interval.is_zero() {
            return Err(EditorError::Config(
                "autosave.storageInterval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serde adapter storing a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history.max_history_size, 100);
        assert_eq!(config.history.snapshot_interval_actions, 10);
        assert_eq!(config.history.max_snapshots(), 200);
        assert_eq!(config.autosave.auto_save_interval, Duration::from_secs(30));
        assert_eq!(config.autosave.storage_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            EditorConfig::from_json_str("{}").unwrap(),
            EditorConfig::default()
        );
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = EditorConfig::from_json_str(
            r#"{
                "history": { "maxHistorySize": 20 },
                "autosave": { "storageInterval": 1000 },
                "shortcuts": { "undo": "ctrl+u" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.history.max_history_size, 20);
        assert_eq!(config.history.snapshot_interval_actions, 10);
        assert_eq!(config.autosave.storage_interval, Duration::from_secs(1));
        assert_eq!(
            config.shortcuts.0.get(&EditorCommand::Undo).map(String::as_str),
            Some("ctrl+u")
        );
    }

    #[test]
    fn test_zero_history_rejected() {
        let err = EditorConfig::from_json_str(r#"{ "history": { "maxHistorySize": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = EditorConfig::default();
        config.autosave.storage_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            EditorConfig::from_json_str("{"),
            Err(EditorError::Config(_))
        ));
    }
}
