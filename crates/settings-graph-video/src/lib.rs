//! The video settings menu, expressed with the settings-graph engine.
//!
//! [`build_video_settings`] turns a [`PlatformProfile`] and a
//! [`VideoSettingsStore`] into a settings tree with the usual collections:
//! Display, Graphics, Graphics Quality, Nvidia DLSS, Advanced Graphics and
//! Frame Rates. Every setting reads and writes the store through the static
//! accessor table in [`accessors`].

/// Declares a string-keyed enum with its option list.
macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $key:literal, $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn options() -> Vec<settings_graph_engine::SettingOption> {
                Self::ALL
                    .iter()
                    .map(|v| settings_graph_engine::SettingOption::enumeration(v.key(), v.label()))
                    .collect()
            }
        }
    };
}

pub mod accessors;
mod error;
pub mod platform;
mod registry;
mod store;

pub use error::{VideoError, VideoResult};
pub use platform::{DeviceProfileVariant, FramePacingMode, PlatformProfile, Resolution};
pub use registry::{
    build_video_settings, names, open_menu, register_video_settings, video_menu, COLLECTIONS,
};
pub use store::{
    ColorBlindMode, DlssMode, LocalSettings, NvidiaReflex, QualityGroup, SharedSettings,
    VideoSettingsStore, WindowMode, ACTION_EDIT_SAFE_ZONE, CUSTOM_QUALITY, MAX_QUALITY,
};
