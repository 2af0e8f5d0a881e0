//! Show command implementation.
//!
//! Prints the menu grouped by collection.

use anyhow::Result;
use settings_graph_video::platform::FACT_FRAME_PACING_MODE;
use tracing::warn;

use super::{format_row, Menu};

/// Print the menu, or its presentation rows as JSON.
pub fn execute(menu: &Menu, all: bool, json: bool) -> Result<()> {
    let tree = menu.tree();

    if json {
        let rows: Vec<_> = tree
            .presentations()
            .into_iter()
            .filter(|row| all || row.visible)
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("🎮 Video settings ({})", menu.profile.name);
    match tree.oracle_fact(FACT_FRAME_PACING_MODE) {
        Ok(mode) => println!("   Frame pacing: {}", mode),
        Err(err) => {
            warn!(error = %err, "oracle_unavailable");
            println!("   Frame pacing: unavailable");
        }
    }
    println!("{:─<72}", "");

    for collection in tree.collections() {
        let visible = tree.collection_visible(&collection.path);
        if !visible && !all {
            continue;
        }
        let members: Vec<String> = collection
            .settings
            .iter()
            .filter(|id| all || tree.edit_state(**id).is_some_and(|s| s.is_visible()))
            .filter_map(|id| format_row(tree, *id))
            .collect();
        if members.is_empty() {
            continue;
        }

        let suffix = if visible { "" } else { " (hidden)" };
        println!();
        println!("📂 {}{}", collection.path, suffix);
        for row in members {
            println!("   {}", row);
        }
    }

    let ungrouped: Vec<String> = tree
        .nodes()
        .filter(|node| node.collection().is_none())
        .filter(|node| all || node.edit_state().is_visible())
        .filter_map(|node| format_row(tree, node.id()))
        .collect();
    if !ungrouped.is_empty() {
        println!();
        println!("📂 (ungrouped)");
        for row in ungrouped {
            println!("   {}", row);
        }
    }

    Ok(())
}
