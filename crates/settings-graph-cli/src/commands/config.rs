//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::{Context, Result};
use settings_graph_video::PlatformProfile;

use crate::config::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("sgv Configuration");
    println!("{:-<40}", "");

    println!("Profile:          {}", config.profile);
    println!("History Window:   {}", config.history_window);
    println!("Log Changes:      {}", config.log_changes);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "profile" => {
            // Fail early on names that would break every later command.
            PlatformProfile::resolve(value)
                .with_context(|| format!("Failed to resolve profile `{}`", value))?;
            config.profile = value.to_string();
            println!("Set profile to: {}", value);
        }
        "history-window" | "history" => {
            let window: usize = value
                .parse()
                .with_context(|| format!("Invalid history window: {}", value))?;
            if window == 0 {
                anyhow::bail!("history-window must be at least 1");
            }
            config.history_window = window;
            println!("Set history-window to: {}", window);
        }
        "log-changes" => {
            config.log_changes = value
                .parse()
                .with_context(|| format!("Invalid boolean: {}", value))?;
            println!("Set log-changes to: {}", config.log_changes);
        }
        _ => {
            anyhow::bail!(
                "Unknown config key: {}. Valid keys: profile, history-window, log-changes",
                key
            );
        }
    }

    config.save()?;
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "profile" => config.profile.clone(),
        "history-window" | "history" => config.history_window.to_string(),
        "log-changes" => config.log_changes.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
