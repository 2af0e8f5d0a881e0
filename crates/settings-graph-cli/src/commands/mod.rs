//! CLI command implementations.

pub mod action;
pub mod config;
pub mod profile;
pub mod set;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use settings_graph_engine::{
    DependencyEvaluator, EvaluationPass, SettingId, SettingValue, SettingsTree,
};
use settings_graph_video::{
    open_menu, register_video_settings, PlatformProfile, VideoSettingsStore,
};
use tracing::debug;

use crate::config::Config;

/// Where the menu comes from.
#[derive(Args, Debug, Default, Clone)]
pub struct MenuArgs {
    /// Platform profile: desktop, console, mobile or a path to a JSON profile.
    #[arg(short, long)]
    pub profile: Option<String>,

    /// JSON file holding setting values between invocations.
    #[arg(short, long)]
    pub store: Option<PathBuf>,
}

/// An opened menu and the profile it was built for.
pub struct Menu {
    pub profile: PlatformProfile,
    pub evaluator: DependencyEvaluator<VideoSettingsStore>,
}

impl Menu {
    pub fn tree(&self) -> &SettingsTree<VideoSettingsStore> {
        self.evaluator.tree()
    }
}

/// Resolve the profile, load or create the store and evaluate the menu.
pub fn open(config: &Config, args: &MenuArgs, verbose: bool) -> Result<Menu> {
    let name = args.profile.as_deref().unwrap_or(&config.profile);
    let profile = PlatformProfile::resolve(name)
        .with_context(|| format!("Failed to resolve profile `{}`", name))?;

    let store = match &args.store {
        Some(path) if path.exists() => load_store(path)?,
        _ => VideoSettingsStore::for_profile(&profile),
    };

    let mut tree =
        SettingsTree::new(store, profile.oracle.clone()).with_history_window(config.history_window);
    register_video_settings(&mut tree, &profile)?;
    let evaluator = open_menu(tree, config.evaluator(verbose))?;

    debug!(profile = %profile.name, settings = evaluator.tree().len(), "menu_opened");
    Ok(Menu { profile, evaluator })
}

fn load_store(path: &Path) -> Result<VideoSettingsStore> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read store from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse store file {}", path.display()))
}

/// Write the store back when `--store` was given.
pub fn save_store(args: &MenuArgs, menu: &Menu) -> Result<()> {
    let Some(path) = &args.store else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(menu.tree().store())?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write store to {}", path.display()))?;
    debug!(path = %path.display(), "store_saved");
    Ok(())
}

/// One aligned line for a setting: name, value and edit state.
pub fn format_row(tree: &SettingsTree<VideoSettingsStore>, id: SettingId) -> Option<String> {
    let node = tree.node(id)?;
    let state = node.edit_state();
    let value = if node.is_action() {
        "[action]".to_string()
    } else {
        node.value_label().unwrap_or_else(|| "(unset)".to_string())
    };
    let status = if state.is_enabled() {
        String::new()
    } else {
        format!(
            "{} ({})",
            state.severity().label(),
            state.reasons().collect::<Vec<_>>().join("; ")
        )
    };
    Some(
        format!("{:<34} {:<24} {}", node.name(), value, status)
            .trim_end()
            .to_string(),
    )
}

/// Current value of every setting, for diffing around an edit.
pub fn snapshot_values(
    tree: &SettingsTree<VideoSettingsStore>,
) -> Vec<(SettingId, Option<SettingValue>)> {
    tree.nodes()
        .map(|node| (node.id(), node.value().cloned()))
        .collect()
}

/// Print the settings whose value differs from `before`.
pub fn print_value_changes(
    tree: &SettingsTree<VideoSettingsStore>,
    before: &[(SettingId, Option<SettingValue>)],
) {
    let changed: Vec<_> = before
        .iter()
        .filter(|(id, old)| tree.value(*id) != old.as_ref())
        .filter_map(|(id, _)| tree.node(*id))
        .collect();
    if changed.is_empty() {
        return;
    }
    println!("   Values changed:");
    for node in changed {
        println!(
            "   • {:<34} {}",
            node.name(),
            node.value_label().unwrap_or_else(|| "(unset)".to_string())
        );
    }
}

/// Print the settings whose edit state changed in `pass`.
pub fn print_changes(tree: &SettingsTree<VideoSettingsStore>, pass: &EvaluationPass) {
    if pass.changed.is_empty() {
        println!("   No edit states changed");
        return;
    }
    println!("   Edit states changed:");
    for id in &pass.changed {
        if let Some(row) = format_row(tree, *id) {
            println!("   • {}", row);
        }
    }
}
