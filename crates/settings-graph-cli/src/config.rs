//! CLI configuration management.
//!
//! Values come from the config file, then environment variables (a `.env`
//! file in the working directory is honoured), then CLI arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use settings_graph_engine::{EvaluatorConfig, ValueHistory};

/// Overrides the directory holding `config.json`.
pub const ENV_CONFIG_DIR: &str = "SGV_CONFIG_DIR";
pub const ENV_PROFILE: &str = "SGV_PROFILE";
pub const ENV_HISTORY_WINDOW: &str = "SGV_HISTORY_WINDOW";

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform profile used when `--profile` is not given: a built-in name
    /// or a path to a JSON profile.
    pub profile: String,

    /// Number of value changes remembered per setting.
    pub history_window: usize,

    /// Log every edit-state change.
    pub log_changes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: "desktop".to_string(),
            history_window: ValueHistory::DEFAULT_WINDOW,
            log_changes: false,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            _ => Self::default(),
        };

        // Environment variables take precedence over the file
        if let Ok(profile) = std::env::var(ENV_PROFILE) {
            config.profile = profile;
        }
        if let Ok(window) = std::env::var(ENV_HISTORY_WINDOW) {
            config.history_window = window
                .parse()
                .with_context(|| format!("{ENV_HISTORY_WINDOW} must be a positive integer"))?;
        }

        Ok(config)
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
            return Some(PathBuf::from(dir).join("config.json"));
        }
        ProjectDirs::from("dev", "settings-graph", "sgv")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Evaluator settings derived from the CLI configuration.
    pub fn evaluator(&self, verbose: bool) -> EvaluatorConfig {
        if verbose || self.log_changes {
            EvaluatorConfig::verbose()
        } else {
            EvaluatorConfig::default()
        }
    }
}
