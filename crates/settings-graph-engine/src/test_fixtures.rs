//! Small in-memory trees for unit tests.

use std::collections::HashMap;

use settings_graph_core::{OracleContext, SettingOption, SettingValue};

use crate::condition::EditCondition;
use crate::error::WriteError;
use crate::node::SettingBuilder;
use crate::tree::SettingsTree;

/// Key/value store with a few canned accessors.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub values: HashMap<String, SettingValue>,
}

impl MemoryStore {
    pub fn get_level(&self) -> Option<SettingValue> {
        self.values.get("level").cloned()
    }

    /// Writes the level and mirrors it into `mirror`.
    pub fn set_level_and_mirror(&mut self, value: &SettingValue) -> Result<(), WriteError> {
        self.values.insert("level".into(), value.clone());
        self.values.insert("mirror".into(), value.clone());
        Ok(())
    }

    pub fn get_mirror(&self) -> Option<SettingValue> {
        self.values.get("mirror").cloned()
    }

    pub fn set_mirror(&mut self, value: &SettingValue) -> Result<(), WriteError> {
        self.values.insert("mirror".into(), value.clone());
        Ok(())
    }
}

/// WindowMode plus a Resolution that is disabled in windowed fullscreen.
pub fn window_tree() -> SettingsTree<()> {
    let mut tree = SettingsTree::new((), OracleContext::new());
    let mode = tree
        .register(
            SettingBuilder::discrete(
                "WindowMode",
                [
                    SettingOption::enumeration("Fullscreen", "Fullscreen"),
                    SettingOption::enumeration("WindowedFullscreen", "Windowed Fullscreen"),
                    SettingOption::enumeration("Windowed", "Windowed"),
                ],
            )
            .default_value(SettingValue::enumeration("Fullscreen")),
        )
        .unwrap();
    tree.register(
        SettingBuilder::discrete(
            "Resolution",
            [
                SettingOption::enumeration("1920x1080", "1920 x 1080"),
                SettingOption::enumeration("2560x1440", "2560 x 1440"),
            ],
        )
        .default_value(SettingValue::enumeration("1920x1080"))
        .condition(EditCondition::disable_if_value(
            mode,
            SettingValue::enumeration("WindowedFullscreen"),
            "Resolution must match the desktop in windowed fullscreen.",
        )),
    )
    .unwrap();
    tree
}

/// A <- B, A <- C, B <- D, C <- D, with B, C and D disabled while A is off.
pub fn diamond_tree() -> SettingsTree<()> {
    let mut tree = SettingsTree::new((), OracleContext::new());
    let a = tree
        .register(SettingBuilder::toggle("A").default_value(true))
        .unwrap();
    let b = tree
        .register(
            SettingBuilder::toggle("B")
                .default_value(true)
                .condition(EditCondition::enable_if_value(a, true, "A is off")),
        )
        .unwrap();
    let c = tree
        .register(
            SettingBuilder::toggle("C")
                .default_value(true)
                .condition(EditCondition::enable_if_value(a, true, "A is off")),
        )
        .unwrap();
    tree.register(
        SettingBuilder::toggle("D")
            .default_value(true)
            .condition(EditCondition::enable_if_value(b, true, "B is off"))
            .condition(EditCondition::enable_if_value(c, true, "C is off")),
    )
    .unwrap();
    tree
}
