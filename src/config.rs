//! Engine configuration and settings persistence.
//!
//! This module encapsulates the tuning knobs of the viewport engine and a
//! generic API for persisting serializable settings to host storage.

use serde::{Deserialize, Serialize};

use crate::traits::Storage;

/// Tuning knobs for the viewport engine.
///
/// All values that affect interaction feel or memory use live here so hosts
/// can persist and restore them between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Committed width of the label column as a fraction of the container (0..1).
    pub label_column_fraction: f64,
    /// Committed width of the timeline column as a fraction of the container (0..1).
    pub timeline_column_fraction: f64,
    /// Idle window after the last wheel event before a zoom/pan gesture ends, in ms.
    pub gesture_idle_ms: f64,
    /// Idle window after the last label sub-scroll event before the offset is
    /// committed and bounds are checked, in ms.
    pub sub_scroll_settle_ms: f64,
    /// Duration of the eased out-of-bounds recovery animation, in ms.
    pub recovery_animation_ms: f64,
    /// Padding between a bar edge and its inline label, in px.
    pub label_padding_px: f64,
    /// Extra slack allowed past the widest label row when sub-scrolling, in px.
    pub sub_scroll_margin_px: f64,
    /// Horizontal indentation per tree depth level, in px.
    pub depth_indent_px: f64,
    /// Minimum rendered bar width so sub-pixel intervals stay visible, in px.
    pub min_bar_px: f64,
    /// Maximum number of cached row width measurements (LRU eviction).
    pub row_width_cache_capacity: usize,
    /// Maximum number of cached text width measurements (LRU eviction).
    pub text_width_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            label_column_fraction: 0.5,
            timeline_column_fraction: 0.5,
            gesture_idle_ms: 100.0,
            sub_scroll_settle_ms: 300.0,
            recovery_animation_ms: 300.0,
            label_padding_px: 8.0,
            sub_scroll_margin_px: 16.0,
            depth_indent_px: 20.0,
            min_bar_px: 1.0,
            row_width_cache_capacity: 4096,
            text_width_cache_capacity: 4096,
        }
    }
}

/// Coordinates generic settings persistence.
///
/// Provides type-safe loading and saving of any serializable settings to the
/// host's [`Storage`]. Settings are stored as JSON strings.
pub struct SettingsCoordinator;

impl SettingsCoordinator {
    /// Loads a setting from storage with a default fallback.
    ///
    /// # Returns
    /// The deserialized value if found and valid, otherwise `T::default()`.
    pub fn load_setting<T>(storage: Option<&dyn Storage>, key: &str) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        Self::try_load_setting(storage, key).unwrap_or_default()
    }

    /// Saves a setting to storage.
    pub fn save_setting<T>(storage: &mut dyn Storage, key: &str, value: &T)
    where
        T: Serialize,
    {
        if let Ok(json_str) = serde_json::to_string(value) {
            storage.set_string(key, json_str);
        }
    }

    /// Attempts to load a setting, returning `None` if not found or invalid.
    pub fn try_load_setting<T>(storage: Option<&dyn Storage>, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let storage = storage?;
        let json_str = storage.get_string(key)?;
        serde_json::from_str(&json_str).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Simple mock storage for testing
    #[derive(Default)]
    struct MockStorage {
        data: HashMap<String, String>,
    }

    impl Storage for MockStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.data.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.data.insert(key.to_string(), value);
        }
    }

    #[test]
    fn test_save_and_load_simple() {
        let mut storage = MockStorage::default();

        SettingsCoordinator::save_setting(&mut storage, "test_key", &42i32);

        let loaded: i32 = SettingsCoordinator::load_setting(Some(&storage), "test_key");
        assert_eq!(loaded, 42);
    }

    #[test]
    fn test_load_with_default() {
        let storage = MockStorage::default();

        let loaded: i32 = SettingsCoordinator::load_setting(Some(&storage), "missing_key");
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_try_load_setting() {
        let mut storage = MockStorage::default();

        let result: Option<i32> = SettingsCoordinator::try_load_setting(Some(&storage), "missing");
        assert_eq!(result, None);

        SettingsCoordinator::save_setting(&mut storage, "test", &123i32);
        let result: Option<i32> = SettingsCoordinator::try_load_setting(Some(&storage), "test");
        assert_eq!(result, Some(123));
    }

    #[test]
    fn test_engine_config_round_trips() {
        let mut storage = MockStorage::default();
        let mut config = EngineConfig::default();
        config.label_column_fraction = 0.35;
        config.timeline_column_fraction = 0.65;
        config.row_width_cache_capacity = 128;

        SettingsCoordinator::save_setting(&mut storage, "engine_config", &config);
        let loaded: EngineConfig =
            SettingsCoordinator::load_setting(Some(&storage), "engine_config");

        assert_eq!(loaded.label_column_fraction, 0.35);
        assert_eq!(loaded.timeline_column_fraction, 0.65);
        assert_eq!(loaded.row_width_cache_capacity, 128);
    }
}
