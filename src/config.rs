use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// When the "Tasks Due Today" summary dialog is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueSummaryMode {
    /// After every reload of the task table, including right after edits
    #[default]
    EveryReload,
    /// Only after the initial load
    StartupOnly,
    Off,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_reminder_interval_minutes")]
    pub reminder_interval_minutes: u64,
    #[serde(default = "default_notification_tick_ms")]
    pub notification_tick_ms: u64,
    #[serde(default)]
    pub due_summary: DueSummaryMode,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_actions")]
    pub actions: String,
    #[serde(default = "default_cycle_status")]
    pub cycle_status: String,
    #[serde(default = "default_toggle_reminder")]
    pub toggle_reminder: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_reverse_sort")]
    pub reverse_sort: String,
    #[serde(default = "default_dismiss_reminder")]
    pub dismiss_reminder: String,
    #[serde(default = "default_reload")]
    pub reload: String,
    #[serde(default = "default_help")]
    pub help: String,
}

/// Colors accept names ("yellow"), hex ("#FFA500") or rgb(r,g,b)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_completed")]
    pub completed: String,
    #[serde(default = "default_in_progress")]
    pub in_progress: String,
    #[serde(default = "default_due_today")]
    pub due_today: String,
    #[serde(default = "default_overdue")]
    pub overdue: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            reminder_interval_minutes: default_reminder_interval_minutes(),
            notification_tick_ms: default_notification_tick_ms(),
            due_summary: DueSummaryMode::default(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            theme: Theme::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            save: default_save(),
            delete: default_delete(),
            actions: default_actions(),
            cycle_status: default_cycle_status(),
            toggle_reminder: default_toggle_reminder(),
            sort: default_sort(),
            reverse_sort: default_reverse_sort(),
            dismiss_reminder: default_dismiss_reminder(),
            reload: default_reload(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            accent: default_accent(),
            highlight_bg: default_highlight_bg(),
            completed: default_completed(),
            in_progress: default_in_progress(),
            due_today: default_due_today(),
            overdue: default_overdue(),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    // Fallback only; the profile's path is applied at load time
    if let Some(data_dir) = utils::get_data_dir(utils::Profile::Prod) {
        data_dir.join("to-do.db").to_string_lossy().to_string()
    } else {
        "~/.local/share/todo/to-do.db".to_string()
    }
}

fn default_reminder_interval_minutes() -> u64 {
    60
}

fn default_notification_tick_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_actions() -> String {
    "m".to_string()
}

fn default_cycle_status() -> String {
    "Space".to_string()
}

fn default_toggle_reminder() -> String {
    "r".to_string()
}

fn default_sort() -> String {
    "s".to_string()
}

fn default_reverse_sort() -> String {
    "S".to_string()
}

fn default_dismiss_reminder() -> String {
    "x".to_string()
}

fn default_reload() -> String {
    "F5".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_fg() -> String {
    "#D4D4D4".to_string()
}

fn default_bg() -> String {
    "#1E1E1E".to_string()
}

fn default_accent() -> String {
    "#007ACC".to_string()
}

fn default_highlight_bg() -> String {
    "#333333".to_string()
}

fn default_completed() -> String {
    "#6A9955".to_string()
}

fn default_in_progress() -> String {
    "#FFA500".to_string()
}

fn default_due_today() -> String {
    "#FFFF00".to_string()
}

fn default_overdue() -> String {
    "#F44747".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid key binding for '{action}': {message}")]
    KeyBinding { action: String, message: String },
}

impl Config {
    /// Load configuration from the profile's config file, creating it with
    /// defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            let mut config = Self::load_from(&config_path)?;
            // Dev and prod never share a database
            if profile == utils::Profile::Dev {
                config.database_path = Self::default_database_path_for_profile(profile);
            }
            Ok(config)
        } else {
            let mut config = Config {
                database_path: Self::default_database_path_for_profile(profile),
                ..Config::default()
            };
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!(path = %config_path.display(), error = %e, "could not write default config");
            }
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        let config: Config = toml::from_str(&contents)?;
        config.key_bindings.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("to-do.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/todo-dev/to-do.db".to_string(),
                utils::Profile::Prod => "~/.local/share/todo/to-do.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_minutes.max(1).saturating_mul(60))
    }

    pub fn notification_tick(&self) -> Duration {
        Duration::from_millis(self.notification_tick_ms.max(50))
    }
}

impl KeyBindings {
    /// Pairs of (action name, key spec), in help-overlay order
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("New task", self.new.as_str()),
            ("Edit task", self.edit.as_str()),
            ("Save form", self.save.as_str()),
            ("Delete task", self.delete.as_str()),
            ("Task actions", self.actions.as_str()),
            ("Cycle status", self.cycle_status.as_str()),
            ("Toggle reminder", self.toggle_reminder.as_str()),
            ("Sort column", self.sort.as_str()),
            ("Reverse sort", self.reverse_sort.as_str()),
            ("Dismiss reminder", self.dismiss_reminder.as_str()),
            ("Reload", self.reload.as_str()),
            ("Help", self.help.as_str()),
            ("Quit", self.quit.as_str()),
        ]
    }

    /// Every binding must parse; caught at load time rather than on keypress
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (action, spec) in self.entries() {
            utils::parse_key_binding(spec).map_err(|message| ConfigError::KeyBinding {
                action: action.to_string(),
                message,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            database_path = "/tmp/tasks.db"
            due_summary = "startup_only"

            [key_bindings]
            quit = "Ctrl+q"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, "/tmp/tasks.db");
        assert_eq!(config.due_summary, DueSummaryMode::StartupOnly);
        assert_eq!(config.reminder_interval_minutes, 60);
        assert_eq!(config.key_bindings.quit, "Ctrl+q");
        assert_eq!(config.key_bindings.new, "n");
        assert_eq!(config.theme.overdue, "#F44747");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config {
            reminder_interval_minutes: 15,
            due_summary: DueSummaryMode::Off,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.reminder_interval_minutes, 15);
        assert_eq!(loaded.due_summary, DueSummaryMode::Off);
        assert_eq!(loaded.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn bad_key_binding_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[key_bindings]\nhelp = \"Meta+h\"\n").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::KeyBinding { action, .. }) => assert_eq!(action, "Help"),
            other => panic!("expected key binding error, got {other:?}"),
        }
    }

    #[test]
    fn durations_have_floors() {
        let config = Config {
            reminder_interval_minutes: 0,
            notification_tick_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.reminder_interval(), Duration::from_secs(60));
        assert_eq!(config.notification_tick(), Duration::from_millis(50));
    }

    #[test]
    fn huge_reminder_interval_saturates() {
        let config = Config {
            reminder_interval_minutes: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.reminder_interval(), Duration::from_secs(u64::MAX));
    }
}
