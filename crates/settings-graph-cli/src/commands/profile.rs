//! Profile command implementation.

use anyhow::{Context, Result};
use settings_graph_video::PlatformProfile;

use crate::config::Config;

/// Print a profile as JSON. The output can be edited and passed back with
/// `--profile <file.json>`.
pub fn show(name: &str) -> Result<()> {
    let profile = PlatformProfile::resolve(name)
        .with_context(|| format!("Failed to resolve profile `{}`", name))?;
    println!("{}", profile.to_json()?);
    Ok(())
}

/// List the built-in profiles, marking the configured one.
pub fn list(config: &Config) {
    println!("Built-in profiles:");
    for name in PlatformProfile::BUILT_IN {
        let marker = if name == config.profile { "*" } else { " " };
        println!(" {} {}", marker, name);
    }
}
