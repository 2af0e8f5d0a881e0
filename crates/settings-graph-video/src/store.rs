//! In-process models of the local (device) and shared (profile) settings
//! objects the video menu writes to.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::platform::{FramePacingMode, PlatformProfile, Resolution};

/// Named action recorded when the safe zone editor is requested.
pub const ACTION_EDIT_SAFE_ZONE: &str = "GameSettings.Action.EditSafeZone";

/// Overall quality value reported when the individual levels disagree.
pub const CUSTOM_QUALITY: i64 = -1;

/// Highest scalability level.
pub const MAX_QUALITY: i64 = 3;

keyed_enum! {
    WindowMode {
        Fullscreen => "Fullscreen", "Fullscreen",
        WindowedFullscreen => "WindowedFullscreen", "Windowed Fullscreen",
        Windowed => "Windowed", "Windowed",
    }
}

keyed_enum! {
    ColorBlindMode {
        Off => "Off", "Off",
        Deuteranope => "Deuteranope", "Deuteranope",
        Protanope => "Protanope", "Protanope",
        Tritanope => "Tritanope", "Tritanope",
    }
}

keyed_enum! {
    DlssMode {
        Off => "Off", "Off",
        Dlaa => "DLAA", "DLAA",
        Quality => "Quality", "Quality",
        Balanced => "Balanced", "Balanced",
        Performance => "Performance", "Performance",
        UltraPerformance => "Ultra_Performance", "Ultra Performance",
        Auto => "Auto", "Auto",
    }
}

keyed_enum! {
    NvidiaReflex {
        Disabled => "Disabled", "Disabled",
        Enabled => "Enabled", "Enabled",
        EnabledBoost => "Enabled_Boost", "Enabled Boost",
    }
}

/// Scalability groups that make up the overall quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityGroup {
    GlobalIllumination,
    Shadows,
    AntiAliasing,
    ViewDistance,
    Textures,
    VisualEffects,
    Reflections,
    PostProcessing,
}

impl QualityGroup {
    pub const COUNT: usize = 8;

    pub const ALL: [QualityGroup; Self::COUNT] = [
        QualityGroup::GlobalIllumination,
        QualityGroup::Shadows,
        QualityGroup::AntiAliasing,
        QualityGroup::ViewDistance,
        QualityGroup::Textures,
        QualityGroup::VisualEffects,
        QualityGroup::Reflections,
        QualityGroup::PostProcessing,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Device-local video settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub window_mode: WindowMode,
    pub resolution: Resolution,
    pub display_gamma: f64,
    /// 0.0 to 1.0 across the supported range of screen percentages.
    pub resolution_scale_normalized: f64,
    /// One level (0 to 3) per [`QualityGroup`].
    pub quality_levels: [i64; QualityGroup::COUNT],
    pub desired_device_profile_suffix: String,
    pub desired_mobile_frame_rate_limit: i64,
    pub dlss_mode: DlssMode,
    pub dlss_sharpness: i64,
    pub dlss_frame_generation: bool,
    pub nvidia_reflex: NvidiaReflex,
    pub vsync: bool,
    pub frame_rate_limit_on_battery: i64,
    pub frame_rate_limit_in_menu: i64,
    pub frame_rate_limit_when_backgrounded: i64,
    pub frame_rate_limit_always: i64,

    // Bookkeeping
    pub scalability_applied: u32,
    pub benchmark_runs: u32,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            window_mode: WindowMode::Fullscreen,
            resolution: Resolution::new(1920, 1080),
            display_gamma: 2.2,
            resolution_scale_normalized: 1.0,
            quality_levels: [MAX_QUALITY; QualityGroup::COUNT],
            desired_device_profile_suffix: String::new(),
            desired_mobile_frame_rate_limit: 30,
            dlss_mode: DlssMode::Off,
            dlss_sharpness: 0,
            dlss_frame_generation: false,
            nvidia_reflex: NvidiaReflex::Disabled,
            vsync: false,
            frame_rate_limit_on_battery: 60,
            frame_rate_limit_in_menu: 144,
            frame_rate_limit_when_backgrounded: 30,
            frame_rate_limit_always: 0,
            scalability_applied: 0,
            benchmark_runs: 0,
        }
    }
}

impl LocalSettings {
    /// Defaults for a given platform.
    ///
    /// Platform data is read from the profile's oracle here and never kept on
    /// the store, so a later oracle change cannot disagree with a stale copy.
    pub fn for_profile(profile: &PlatformProfile) -> Self {
        let mut local = Self {
            resolution: profile.desktop_resolution,
            desired_device_profile_suffix: profile.default_device_profile_suffix.clone(),
            ..Self::default()
        };
        if profile.frame_pacing_mode() == FramePacingMode::MobileStyle {
            local.reset_to_mobile_device_defaults(profile.mobile_default_frame_rate());
            local.window_mode = WindowMode::Fullscreen;
        }
        local
    }

    pub fn quality(&self, group: QualityGroup) -> i64 {
        self.quality_levels[group.index()]
    }

    pub fn set_quality(&mut self, group: QualityGroup, level: i64) {
        self.quality_levels[group.index()] = level.clamp(0, MAX_QUALITY);
    }

    /// The shared level of every group, or `None` when they differ.
    pub fn overall_quality_level(&self) -> Option<i64> {
        let first = self.quality_levels[0];
        self.quality_levels
            .iter()
            .all(|level| *level == first)
            .then_some(first)
    }

    pub fn set_overall_quality_level(&mut self, level: i64) {
        let level = level.clamp(0, MAX_QUALITY);
        self.quality_levels = [level; QualityGroup::COUNT];
    }

    /// Push the current scalability levels to the renderer.
    pub fn apply_scalability_settings(&mut self) {
        self.scalability_applied += 1;
        debug!(levels = ?self.quality_levels, "scalability_applied");
    }

    /// Benchmark the hardware and adopt the resulting quality `level`.
    pub fn run_auto_benchmark(&mut self, level: i64) {
        self.benchmark_runs += 1;
        self.set_overall_quality_level(level);
        self.resolution_scale_normalized = 1.0;
        info!(level, "auto_benchmark_complete");
    }

    pub fn reset_to_mobile_device_defaults(&mut self, frame_rate: i64) {
        self.set_overall_quality_level(1);
        self.resolution_scale_normalized = 1.0;
        self.desired_mobile_frame_rate_limit = frame_rate;
        debug!(
            frame_rate = self.desired_mobile_frame_rate_limit,
            "mobile_device_defaults_restored"
        );
    }
}

/// Settings that follow the player profile across devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedSettings {
    pub color_blind_mode: ColorBlindMode,
    /// 0 to 10.
    pub color_blind_strength: i64,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self {
            color_blind_mode: ColorBlindMode::Off,
            color_blind_strength: 10,
        }
    }
}

/// The store type of the video settings tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettingsStore {
    pub local: LocalSettings,
    pub shared: SharedSettings,
    /// Named actions requested by action settings, oldest first.
    pub pending_actions: Vec<String>,
}

impl VideoSettingsStore {
    pub fn for_profile(profile: &PlatformProfile) -> Self {
        Self {
            local: LocalSettings::for_profile(profile),
            ..Self::default()
        }
    }

    /// Take the requested named actions.
    pub fn drain_actions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_quality_level() {
        let mut local = LocalSettings::default();
        assert_eq!(local.overall_quality_level(), Some(3));

        local.set_quality(QualityGroup::Shadows, 1);
        assert_eq!(local.overall_quality_level(), None);

        local.set_overall_quality_level(9);
        assert_eq!(local.overall_quality_level(), Some(MAX_QUALITY));
    }

    #[test]
    fn test_mobile_profile_defaults() {
        let local = LocalSettings::for_profile(&PlatformProfile::mobile());
        assert_eq!(local.window_mode, WindowMode::Fullscreen);
        assert_eq!(local.desired_mobile_frame_rate_limit, 30);
        assert_eq!(local.overall_quality_level(), Some(1));
        assert_eq!(local.desired_device_profile_suffix, "_Low");
    }

    #[test]
    fn test_auto_benchmark_adopts_profile_level() {
        let desktop = PlatformProfile::desktop();
        let mut local = LocalSettings::for_profile(&desktop);
        local.set_quality(QualityGroup::Textures, 0);
        local.run_auto_benchmark(desktop.benchmark_quality_level());
        assert_eq!(local.benchmark_runs, 1);
        assert_eq!(local.overall_quality_level(), Some(3));
    }

    #[test]
    fn test_keyed_enums() {
        assert_eq!(DlssMode::from_key("Ultra_Performance"), Some(DlssMode::UltraPerformance));
        assert_eq!(DlssMode::UltraPerformance.label(), "Ultra Performance");
        assert_eq!(WindowMode::options().len(), 3);
        assert_eq!(NvidiaReflex::from_key("Boost"), None);
    }

    #[test]
    fn test_store_json_defaults() {
        let json = r#"{"shared":{"color_blind_strength":4}}"#;
        let store: VideoSettingsStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.shared.color_blind_strength, 4);
        assert_eq!(store.shared.color_blind_mode, ColorBlindMode::Off);
        assert_eq!(store.local, LocalSettings::default());
    }

    #[test]
    fn test_platform_fields_in_old_stores_are_ignored() {
        let json = r#"{"local":{"frame_pacing_mode":"MobileStyle","benchmark_quality_level":3}}"#;
        let store: VideoSettingsStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.local, LocalSettings::default());
        assert!(!serde_json::to_string(&store).unwrap().contains("frame_pacing_mode"));
    }
}
