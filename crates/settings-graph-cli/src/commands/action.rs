//! Action command implementation.

use anyhow::{bail, Result};

use super::{print_changes, print_value_changes, snapshot_values, Menu};

/// Run an action setting and report what it requested and changed.
pub fn execute(menu: &mut Menu, name: &str, force: bool) -> Result<()> {
    let tree = menu.tree();
    let id = tree.require(name)?;
    if let Some(state) = tree.edit_state(id) {
        if !state.is_enabled() && !force {
            bail!(
                "`{}` is {}: {} (use --force to run anyway)",
                name,
                state.severity().label(),
                state.reasons().collect::<Vec<_>>().join("; ")
            );
        }
    }

    let before = snapshot_values(tree);
    let pass = menu.evaluator.run_action(id)?;
    let requested = menu.evaluator.tree_mut().store_mut().drain_actions();

    println!("▶️  Ran {}", name);
    for action in &requested {
        println!("   Requested: {}", action);
    }
    let tree = menu.tree();
    print_value_changes(tree, &before);
    print_changes(tree, &pass);
    Ok(())
}
