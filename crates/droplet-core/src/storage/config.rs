//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Reminder intervals (base, first snooze, minimum snooze floor)
//! - Notification preferences (sound)
//! - Launch-at-login flag (registration itself is a shell concern)
//!
//! Configuration is stored at `~/.config/droplet/config.toml`.
//!
//! Interval floors are applied when values are *read*, never when they are
//! written: a corrupted or hand-edited file is tolerated and clamped, not
//! rejected.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Floor for the base reminder interval, seconds.
pub const BASE_INTERVAL_FLOOR_SECS: u64 = 60;
/// Floor for the first-snooze delay, seconds.
pub const FIRST_SNOOZE_FLOOR_SECS: u64 = 10;
/// Floor below which the snooze delay may never shrink, seconds.
pub const MIN_INTERVAL_FLOOR_SECS: u64 = 5;

/// Reminder interval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Time between reminders after an acknowledgment.
    #[serde(default = "default_base_interval")]
    pub base_interval_secs: u64,
    /// Delay granted by the first snooze after an acknowledgment.
    #[serde(default = "default_first_snooze")]
    pub first_snooze_secs: u64,
    /// Floor for the halving snooze decay.
    #[serde(default = "default_min_interval")]
    pub min_interval_secs: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/droplet/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub launch_at_login: bool,
}

// Default functions
fn default_base_interval() -> u64 {
    1800
}
fn default_first_snooze() -> u64 {
    600
}
fn default_min_interval() -> u64 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            base_interval_secs: default_base_interval(),
            first_snooze_secs: default_first_snooze(),
            min_interval_secs: default_min_interval(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminder: ReminderConfig::default(),
            notifications: NotificationsConfig::default(),
            launch_at_login: false,
        }
    }
}

impl Config {
    // ── Floor-clamped reads ──────────────────────────────────────────

    /// Base reminder interval, clamped to its floor.
    pub fn base_interval_secs(&self) -> u64 {
        self.reminder.base_interval_secs.max(BASE_INTERVAL_FLOOR_SECS)
    }

    /// First-snooze delay, clamped to its floor.
    pub fn first_snooze_secs(&self) -> u64 {
        self.reminder.first_snooze_secs.max(FIRST_SNOOZE_FLOOR_SECS)
    }

    /// Minimum snooze interval, clamped to its floor.
    pub fn min_interval_secs(&self) -> u64 {
        self.reminder.min_interval_secs.max(MIN_INTERVAL_FLOOR_SECS)
    }

    pub fn sound_enabled(&self) -> bool {
        self.notifications.sound_enabled
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/droplet"),
            message: e.to_string(),
        })?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/droplet"),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    // ── Settings-store surface ───────────────────────────────────────

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        self.save()?;
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.reminder.base_interval_secs, 1800);
        assert_eq!(parsed.reminder.first_snooze_secs, 600);
        assert_eq!(parsed.reminder.min_interval_secs, 15);
        assert!(parsed.notifications.sound_enabled);
        assert!(!parsed.launch_at_login);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.reminder.base_interval_secs, 1800);
        assert!(parsed.notifications.sound_enabled);
    }

    #[test]
    fn partial_section_keeps_field_defaults() {
        let parsed: Config = toml::from_str(
            "[reminder]\nbase_interval_secs = 3600\n",
        )
        .unwrap();
        assert_eq!(parsed.reminder.base_interval_secs, 3600);
        assert_eq!(parsed.reminder.first_snooze_secs, 600);
        assert_eq!(parsed.reminder.min_interval_secs, 15);
    }

    #[test]
    fn floors_are_applied_on_read_not_stored() {
        let mut cfg = Config::default();
        cfg.reminder.base_interval_secs = 5;
        cfg.reminder.first_snooze_secs = 1;
        cfg.reminder.min_interval_secs = 0;

        assert_eq!(cfg.base_interval_secs(), 60);
        assert_eq!(cfg.first_snooze_secs(), 10);
        assert_eq!(cfg.min_interval_secs(), 5);
        // The raw values survive untouched.
        assert_eq!(cfg.reminder.base_interval_secs, 5);
    }

    #[test]
    fn values_above_floor_pass_through() {
        let cfg = Config::default();
        assert_eq!(cfg.base_interval_secs(), 1800);
        assert_eq!(cfg.first_snooze_secs(), 600);
        assert_eq!(cfg.min_interval_secs(), 15);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reminder.base_interval_secs").as_deref(), Some("1800"));
        assert_eq!(cfg.get("notifications.sound_enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("launch_at_login").as_deref(), Some("false"));
        assert!(cfg.get("reminder.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "reminder.min_interval_secs", "30").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "reminder.min_interval_secs").unwrap(),
            &serde_json::Value::Number(30.into())
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "notifications.sound_enabled", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "notifications.sound_enabled").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "reminder.nonexistent", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result =
            Config::set_json_value_by_path(&mut json, "notifications.sound_enabled", "maybe");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
