//! Platform profiles: the oracle snapshot plus the construction-time data a
//! video menu is built from.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use settings_graph_engine::{OracleContext, OracleResult, SettingOption};
use tracing::debug;

use crate::error::{VideoError, VideoResult};

/// Platform supports switching between window modes.
pub const TRAIT_SUPPORTS_WINDOWED_MODE: &str = "Platform.Trait.SupportsWindowedMode";
/// Platform exposes a brightness calibration.
pub const TRAIT_NEEDS_BRIGHTNESS_ADJUSTMENT: &str = "Platform.Trait.NeedsBrightnessAdjustment";

pub const FLAG_PRIMARY_PLAYER: &str = "PlayingAsPrimaryPlayer";
pub const FLAG_GRANULAR_VIDEO_QUALITY: &str = "SupportsGranularVideoQualitySettings";
pub const FLAG_DLSS_SUPPORTED: &str = "DLSSSupported";
pub const FLAG_DLSS_HARDWARE_COMPATIBLE: &str = "DLSSHardwareCompatible";
pub const FLAG_CAN_RUN_AUTO_BENCHMARK: &str = "CanRunAutoBenchmark";

pub const FACT_FRAME_PACING_MODE: &str = "FramePacingMode";

pub const METRIC_TITLE_SAFE_PADDING: &str = "TitleSafePaddingSize";
pub const METRIC_MAX_REFRESH_RATE: &str = "MaxRefreshRate";
/// Frame rate a mobile device resets to.
pub const METRIC_MOBILE_DEFAULT_FRAME_RATE: &str = "MobileDefaultFrameRate";
/// Quality level an auto benchmark settles on for this hardware.
pub const METRIC_BENCHMARK_QUALITY_LEVEL: &str = "BenchmarkQualityLevel";

const DEFAULT_MOBILE_FRAME_RATE: i64 = 30;
const DEFAULT_BENCHMARK_QUALITY_LEVEL: i64 = 2;

keyed_enum! {
    /// How the platform paces frames; decides which frame-rate settings exist.
    FramePacingMode {
        DesktopStyle => "DesktopStyle", "Desktop",
        ConsoleStyle => "ConsoleStyle", "Console",
        MobileStyle => "MobileStyle", "Mobile",
    }
}

impl Default for FramePacingMode {
    fn default() -> Self {
        FramePacingMode::DesktopStyle
    }
}

impl FramePacingMode {
    /// Mode reported by `oracle`. Unknown keys read as desktop.
    pub fn from_oracle(oracle: &OracleContext) -> OracleResult<Self> {
        oracle
            .fact(FACT_FRAME_PACING_MODE)
            .map(|key| Self::from_key(key).unwrap_or_default())
    }
}

/// Frame rate a mobile device resets to, per `oracle`.
pub fn mobile_default_frame_rate(oracle: &OracleContext) -> i64 {
    oracle
        .metric(METRIC_MOBILE_DEFAULT_FRAME_RATE)
        .map(|rate| rate.round() as i64)
        .unwrap_or(DEFAULT_MOBILE_FRAME_RATE)
}

/// Quality level an auto benchmark settles on, per `oracle`.
pub fn benchmark_quality_level(oracle: &OracleContext) -> i64 {
    oracle
        .metric(METRIC_BENCHMARK_QUALITY_LEVEL)
        .map(|level| level.round() as i64)
        .unwrap_or(DEFAULT_BENCHMARK_QUALITY_LEVEL)
}

/// A display resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Stable key, e.g. `1920x1080`.
    pub fn key(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub fn label(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let (w, h) = key.split_once('x')?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }

    pub fn option(&self) -> SettingOption {
        SettingOption::enumeration(self.key(), self.label())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A user-facing device profile variant (console quality presets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfileVariant {
    pub suffix: String,
    pub display_name: String,
    /// Only offered when the display can refresh at least this fast.
    #[serde(default)]
    pub min_refresh_rate: f64,
}

impl DeviceProfileVariant {
    pub fn new(suffix: &str, display_name: &str, min_refresh_rate: f64) -> Self {
        Self {
            suffix: suffix.to_string(),
            display_name: display_name.to_string(),
            min_refresh_rate,
        }
    }
}

/// Everything a video menu needs to know about the platform it runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub name: String,
    pub oracle: OracleContext,
    pub resolutions: Vec<Resolution>,
    pub desktop_resolution: Resolution,
    #[serde(default)]
    pub device_profiles: Vec<DeviceProfileVariant>,
    #[serde(default)]
    pub default_device_profile_suffix: String,
    pub desktop_frame_rate_limits: Vec<i64>,
    #[serde(default)]
    pub mobile_frame_rates: Vec<i64>,
}

const DESKTOP_FRAME_RATE_LIMITS: [i64; 10] = [30, 60, 120, 144, 160, 165, 180, 200, 240, 360];

impl PlatformProfile {
    /// Windows-style desktop with DLSS capable hardware.
    pub fn desktop() -> Self {
        Self {
            name: "desktop".to_string(),
            oracle: OracleContext::new()
                .with_trait(TRAIT_SUPPORTS_WINDOWED_MODE)
                .with_flag(FLAG_PRIMARY_PLAYER, true)
                .with_flag(FLAG_GRANULAR_VIDEO_QUALITY, true)
                .with_flag(FLAG_DLSS_SUPPORTED, true)
                .with_flag(FLAG_DLSS_HARDWARE_COMPATIBLE, true)
                .with_flag(FLAG_CAN_RUN_AUTO_BENCHMARK, true)
                .with_fact(FACT_FRAME_PACING_MODE, FramePacingMode::DesktopStyle.key())
                .with_metric(METRIC_TITLE_SAFE_PADDING, 0.0)
                .with_metric(METRIC_MAX_REFRESH_RATE, 144.0)
                .with_metric(METRIC_BENCHMARK_QUALITY_LEVEL, 3.0),
            resolutions: vec![
                Resolution::new(1280, 720),
                Resolution::new(1920, 1080),
                Resolution::new(2560, 1440),
            ],
            desktop_resolution: Resolution::new(1920, 1080),
            device_profiles: Vec::new(),
            default_device_profile_suffix: String::new(),
            desktop_frame_rate_limits: DESKTOP_FRAME_RATE_LIMITS.to_vec(),
            mobile_frame_rates: Vec::new(),
        }
    }

    /// Console with fixed quality and a performance variant for fast TVs.
    pub fn console() -> Self {
        Self {
            name: "console".to_string(),
            oracle: OracleContext::new()
                .with_trait(TRAIT_NEEDS_BRIGHTNESS_ADJUSTMENT)
                .with_flag(FLAG_PRIMARY_PLAYER, true)
                .with_flag(FLAG_GRANULAR_VIDEO_QUALITY, false)
                .with_flag(FLAG_DLSS_SUPPORTED, false)
                .with_flag(FLAG_DLSS_HARDWARE_COMPATIBLE, false)
                .with_flag(FLAG_CAN_RUN_AUTO_BENCHMARK, false)
                .with_fact(FACT_FRAME_PACING_MODE, FramePacingMode::ConsoleStyle.key())
                .with_metric(METRIC_TITLE_SAFE_PADDING, 48.0)
                .with_metric(METRIC_MAX_REFRESH_RATE, 120.0)
                .with_metric(METRIC_BENCHMARK_QUALITY_LEVEL, 2.0),
            resolutions: vec![Resolution::new(3840, 2160)],
            desktop_resolution: Resolution::new(3840, 2160),
            device_profiles: vec![
                DeviceProfileVariant::new("", "Quality", 0.0),
                DeviceProfileVariant::new("_Perf", "Performance", 120.0),
            ],
            default_device_profile_suffix: String::new(),
            desktop_frame_rate_limits: DESKTOP_FRAME_RATE_LIMITS.to_vec(),
            mobile_frame_rates: Vec::new(),
        }
    }

    /// Phone with a 60 Hz panel.
    pub fn mobile() -> Self {
        Self {
            name: "mobile".to_string(),
            oracle: OracleContext::new()
                .with_flag(FLAG_PRIMARY_PLAYER, true)
                .with_flag(FLAG_GRANULAR_VIDEO_QUALITY, true)
                .with_flag(FLAG_DLSS_SUPPORTED, false)
                .with_flag(FLAG_DLSS_HARDWARE_COMPATIBLE, false)
                .with_flag(FLAG_CAN_RUN_AUTO_BENCHMARK, false)
                .with_fact(FACT_FRAME_PACING_MODE, FramePacingMode::MobileStyle.key())
                .with_metric(METRIC_TITLE_SAFE_PADDING, 24.0)
                .with_metric(METRIC_MAX_REFRESH_RATE, 60.0)
                .with_metric(METRIC_MOBILE_DEFAULT_FRAME_RATE, 30.0)
                .with_metric(METRIC_BENCHMARK_QUALITY_LEVEL, 1.0),
            resolutions: vec![Resolution::new(2400, 1080)],
            desktop_resolution: Resolution::new(2400, 1080),
            device_profiles: vec![
                DeviceProfileVariant::new("_Low", "Low", 0.0),
                DeviceProfileVariant::new("_High", "High", 0.0),
                DeviceProfileVariant::new("_120", "120 Hz", 120.0),
            ],
            default_device_profile_suffix: "_Low".to_string(),
            desktop_frame_rate_limits: DESKTOP_FRAME_RATE_LIMITS.to_vec(),
            mobile_frame_rates: vec![20, 30, 45, 60],
        }
    }

    pub const BUILT_IN: [&'static str; 3] = ["desktop", "console", "mobile"];

    pub fn built_in(name: &str) -> Option<Self> {
        match name {
            "desktop" => Some(Self::desktop()),
            "console" => Some(Self::console()),
            "mobile" => Some(Self::mobile()),
            _ => None,
        }
    }

    pub fn from_json(json: &str) -> VideoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> VideoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a profile from a JSON file.
    pub fn load(path: &Path) -> VideoResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let profile = Self::from_json(&json)?;
        debug!(profile = %profile.name, path = %path.display(), "platform_profile_loaded");
        Ok(profile)
    }

    /// A built-in name or a path to a JSON file.
    pub fn resolve(name_or_path: &str) -> VideoResult<Self> {
        if let Some(profile) = Self::built_in(name_or_path) {
            return Ok(profile);
        }
        let path = Path::new(name_or_path);
        if path.extension().is_some_and(|ext| ext == "json") {
            return Self::load(path);
        }
        Err(VideoError::UnknownProfile {
            name: name_or_path.to_string(),
        })
    }

    /// Frame pacing mode reported by the oracle, desktop when unreported.
    pub fn frame_pacing_mode(&self) -> FramePacingMode {
        FramePacingMode::from_oracle(&self.oracle).unwrap_or_default()
    }

    pub fn mobile_default_frame_rate(&self) -> i64 {
        mobile_default_frame_rate(&self.oracle)
    }

    pub fn benchmark_quality_level(&self) -> i64 {
        benchmark_quality_level(&self.oracle)
    }

    pub fn max_refresh_rate(&self) -> f64 {
        self.oracle.metric(METRIC_MAX_REFRESH_RATE).unwrap_or(60.0)
    }

    /// Device profile variants the display can actually drive.
    pub fn available_device_profiles(&self) -> Vec<&DeviceProfileVariant> {
        let max_refresh = self.max_refresh_rate();
        self.device_profiles
            .iter()
            .filter(|v| max_refresh >= v.min_refresh_rate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_profiles() {
        for name in PlatformProfile::BUILT_IN {
            let profile = PlatformProfile::built_in(name).unwrap();
            assert_eq!(profile.name, name);
        }
        assert!(PlatformProfile::built_in("toaster").is_none());
        assert_eq!(
            PlatformProfile::mobile().frame_pacing_mode(),
            FramePacingMode::MobileStyle
        );
    }

    #[test]
    fn test_device_profiles_filtered_by_refresh_rate() {
        let mobile = PlatformProfile::mobile();
        let suffixes: Vec<_> = mobile
            .available_device_profiles()
            .iter()
            .map(|v| v.suffix.as_str())
            .collect();
        assert_eq!(suffixes, vec!["_Low", "_High"]);

        assert_eq!(PlatformProfile::console().available_device_profiles().len(), 2);
    }

    #[test]
    fn test_platform_data_comes_from_the_oracle() {
        let mobile = PlatformProfile::mobile();
        assert_eq!(mobile.mobile_default_frame_rate(), 30);
        assert_eq!(mobile.benchmark_quality_level(), 1);
        assert_eq!(PlatformProfile::desktop().benchmark_quality_level(), 3);

        let bare = OracleContext::new();
        assert!(FramePacingMode::from_oracle(&bare).is_err());
        assert_eq!(benchmark_quality_level(&bare), 2);

        let odd = OracleContext::new().with_fact(FACT_FRAME_PACING_MODE, "Hovercraft");
        assert_eq!(FramePacingMode::from_oracle(&odd), Ok(FramePacingMode::DesktopStyle));
    }

    #[test]
    fn test_resolution_keys() {
        let res = Resolution::new(2560, 1440);
        assert_eq!(res.key(), "2560x1440");
        assert_eq!(Resolution::from_key("2560x1440"), Some(res));
        assert_eq!(Resolution::from_key("wide"), None);
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let profile = PlatformProfile::console();
        let json = profile.to_json().unwrap();
        assert_eq!(PlatformProfile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn test_resolve_rejects_unknown_names() {
        let err = PlatformProfile::resolve("toaster").unwrap_err();
        assert!(matches!(err, VideoError::UnknownProfile { .. }));
    }
}
