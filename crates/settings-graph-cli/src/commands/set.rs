//! Set command implementation.

use anyhow::{anyhow, bail, Result};
use tracing::info;

use super::{print_changes, print_value_changes, snapshot_values, Menu};

/// Parse `value` against the setting's domain and commit it.
///
/// Settings that are not editable are refused unless `force` is set.
pub fn execute(menu: &mut Menu, name: &str, value: &str, force: bool, json: bool) -> Result<()> {
    let tree = menu.tree();
    let id = tree.require(name)?;
    let Some(node) = tree.node(id) else {
        bail!("Unknown setting: {}", name);
    };

    if node.is_action() {
        bail!("`{}` is an action; run it with `sgv action {}`", name, name);
    }

    let state = node.edit_state();
    if !state.is_enabled() && !force {
        bail!(
            "`{}` is {}: {} (use --force to apply anyway)",
            name,
            state.severity().label(),
            state.reasons().collect::<Vec<_>>().join("; ")
        );
    }

    let parsed = node.domain().parse(value).ok_or_else(|| {
        let options: Vec<_> = node
            .domain()
            .options()
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        if options.is_empty() {
            anyhow!("`{}` is not a valid value for `{}`", value, name)
        } else {
            anyhow!(
                "`{}` is not a valid value for `{}`. Options: {}",
                value,
                name,
                options.join(", ")
            )
        }
    })?;

    let before = snapshot_values(tree);
    let pass = menu.evaluator.set_value(id, parsed)?;
    info!(setting = name, value, changed = pass.changed.len(), "cli_set");

    if json {
        println!("{}", serde_json::to_string_pretty(&pass)?);
        return Ok(());
    }

    let tree = menu.tree();
    let label = tree
        .node(id)
        .and_then(|node| node.value_label())
        .unwrap_or_else(|| value.to_string());
    println!("✅ Set {} to {}", name, label);
    print_value_changes(tree, &before);
    print_changes(tree, &pass);
    Ok(())
}
