//! Static getter/setter table binding setting names to store fields.
//!
//! Every entry is a pair of plain functions over [`VideoSettingsStore`];
//! nothing here is resolved through reflection or string paths at runtime
//! beyond the one-time lookup by name in [`accessor`].

use settings_graph_engine::{Accessor, Getter, SettingValue, Setter, WriteError};

use crate::platform::Resolution;
use crate::registry::names;
use crate::store::{
    ColorBlindMode, DlssMode, NvidiaReflex, QualityGroup, VideoSettingsStore, WindowMode,
    CUSTOM_QUALITY,
};

/// One row of the accessor table.
pub struct AccessorEntry {
    pub name: &'static str,
    pub get: Getter<VideoSettingsStore>,
    pub set: Setter<VideoSettingsStore>,
}

impl AccessorEntry {
    pub fn accessor(&self) -> Accessor<VideoSettingsStore> {
        Accessor::new(self.get, self.set)
    }
}

/// Look up the accessor pair for a setting name.
pub fn accessor(name: &str) -> Option<Accessor<VideoSettingsStore>> {
    ACCESSORS
        .iter()
        .find(|entry| entry.name == name)
        .map(AccessorEntry::accessor)
}

// =============================================================================
// Value helpers
// =============================================================================

fn expect_enum<'a>(value: &'a SettingValue) -> Result<&'a str, WriteError> {
    value
        .as_enum()
        .ok_or_else(|| WriteError::new(format!("expected an enum value, got {}", value.kind())))
}

fn expect_int(value: &SettingValue) -> Result<i64, WriteError> {
    value
        .as_int()
        .ok_or_else(|| WriteError::new(format!("expected an integer, got {}", value.kind())))
}

fn expect_bool(value: &SettingValue) -> Result<bool, WriteError> {
    value
        .as_bool()
        .ok_or_else(|| WriteError::new(format!("expected a boolean, got {}", value.kind())))
}

fn expect_float(value: &SettingValue) -> Result<f64, WriteError> {
    value
        .as_float()
        .ok_or_else(|| WriteError::new(format!("expected a number, got {}", value.kind())))
}

fn parse_key<T>(value: &SettingValue, from_key: fn(&str) -> Option<T>) -> Result<T, WriteError> {
    let key = expect_enum(value)?;
    from_key(key).ok_or_else(|| WriteError::new(format!("unknown option `{key}`")))
}

// =============================================================================
// Display
// =============================================================================

fn get_window_mode(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::enumeration(store.local.window_mode.key()))
}

fn set_window_mode(store: &mut VideoSettingsStore, value: &SettingValue) -> Result<(), WriteError> {
    store.local.window_mode = parse_key(value, WindowMode::from_key)?;
    Ok(())
}

fn get_resolution(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::enumeration(store.local.resolution.key()))
}

fn set_resolution(store: &mut VideoSettingsStore, value: &SettingValue) -> Result<(), WriteError> {
    store.local.resolution = parse_key(value, Resolution::from_key)?;
    Ok(())
}

fn get_brightness(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Float(store.local.display_gamma))
}

fn set_brightness(store: &mut VideoSettingsStore, value: &SettingValue) -> Result<(), WriteError> {
    store.local.display_gamma = expect_float(value)?;
    Ok(())
}

// =============================================================================
// Graphics
// =============================================================================

fn get_color_blind_mode(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::enumeration(store.shared.color_blind_mode.key()))
}

fn set_color_blind_mode(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.shared.color_blind_mode = parse_key(value, ColorBlindMode::from_key)?;
    Ok(())
}

fn get_color_blind_strength(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Int(store.shared.color_blind_strength))
}

fn set_color_blind_strength(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.shared.color_blind_strength = expect_int(value)?;
    Ok(())
}

// =============================================================================
// Graphics quality
// =============================================================================

fn get_device_profile_suffix(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::enumeration(
        store.local.desired_device_profile_suffix.clone(),
    ))
}

fn set_device_profile_suffix(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.local.desired_device_profile_suffix = expect_enum(value)?.to_string();
    Ok(())
}

fn get_overall_quality(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Int(
        store.local.overall_quality_level().unwrap_or(CUSTOM_QUALITY),
    ))
}

fn set_overall_quality(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    let level = expect_int(value)?;
    if level == CUSTOM_QUALITY {
        return Err(WriteError::new(
            "Custom is reported, not chosen; change an individual quality level instead",
        ));
    }
    store.local.set_overall_quality_level(level);
    Ok(())
}

fn get_quality<const G: usize>(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Int(store.local.quality_levels[G]))
}

fn set_quality<const G: usize>(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.local.set_quality(QualityGroup::ALL[G], expect_int(value)?);
    Ok(())
}

fn get_resolution_scale(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Float(store.local.resolution_scale_normalized))
}

fn set_resolution_scale(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.local.resolution_scale_normalized = expect_float(value)?;
    Ok(())
}

fn get_mobile_frame_rate(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Int(store.local.desired_mobile_frame_rate_limit))
}

fn set_mobile_frame_rate(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.local.desired_mobile_frame_rate_limit = expect_int(value)?;
    Ok(())
}

// =============================================================================
// Nvidia DLSS
// =============================================================================

fn get_dlss_mode(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::enumeration(store.local.dlss_mode.key()))
}

fn set_dlss_mode(store: &mut VideoSettingsStore, value: &SettingValue) -> Result<(), WriteError> {
    store.local.dlss_mode = parse_key(value, DlssMode::from_key)?;
    Ok(())
}

fn get_dlss_sharpness(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Int(store.local.dlss_sharpness))
}

fn set_dlss_sharpness(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.local.dlss_sharpness = expect_int(value)?;
    Ok(())
}

fn get_frame_generation(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Bool(store.local.dlss_frame_generation))
}

fn set_frame_generation(
    store: &mut VideoSettingsStore,
    value: &SettingValue,
) -> Result<(), WriteError> {
    store.local.dlss_frame_generation = expect_bool(value)?;
    Ok(())
}

fn get_reflex(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::enumeration(store.local.nvidia_reflex.key()))
}

fn set_reflex(store: &mut VideoSettingsStore, value: &SettingValue) -> Result<(), WriteError> {
    store.local.nvidia_reflex = parse_key(value, NvidiaReflex::from_key)?;
    Ok(())
}

// =============================================================================
// Advanced graphics and frame rates
// =============================================================================

fn get_vsync(store: &VideoSettingsStore) -> Option<SettingValue> {
    Some(SettingValue::Bool(store.local.vsync))
}

fn set_vsync(store: &mut VideoSettingsStore, value: &SettingValue) -> Result<(), WriteError> {
    store.local.vsync = expect_bool(value)?;
    Ok(())
}

macro_rules! frame_rate_accessors {
    ($($get:ident, $set:ident => $field:ident;)+) => {
        $(
            fn $get(store: &VideoSettingsStore) -> Option<SettingValue> {
                Some(SettingValue::Int(store.local.$field))
            }

            fn $set(
                store: &mut VideoSettingsStore,
                value: &SettingValue,
            ) -> Result<(), WriteError> {
                store.local.$field = expect_int(value)?;
                Ok(())
            }
        )+
    };
}

frame_rate_accessors! {
    get_limit_on_battery, set_limit_on_battery => frame_rate_limit_on_battery;
    get_limit_in_menu, set_limit_in_menu => frame_rate_limit_in_menu;
    get_limit_backgrounded, set_limit_backgrounded => frame_rate_limit_when_backgrounded;
    get_limit_always, set_limit_always => frame_rate_limit_always;
}

// =============================================================================
// Table
// =============================================================================

const fn entry(
    name: &'static str,
    get: Getter<VideoSettingsStore>,
    set: Setter<VideoSettingsStore>,
) -> AccessorEntry {
    AccessorEntry { name, get, set }
}

/// Every value setting of the video menu. Actions have no entry.
pub static ACCESSORS: &[AccessorEntry] = &[
    entry(names::WINDOW_MODE, get_window_mode, set_window_mode),
    entry(names::RESOLUTION, get_resolution, set_resolution),
    entry(names::BRIGHTNESS, get_brightness, set_brightness),
    entry(names::COLOR_BLIND_MODE, get_color_blind_mode, set_color_blind_mode),
    entry(
        names::COLOR_BLIND_STRENGTH,
        get_color_blind_strength,
        set_color_blind_strength,
    ),
    entry(
        names::DEVICE_PROFILE_SUFFIX,
        get_device_profile_suffix,
        set_device_profile_suffix,
    ),
    entry(names::GRAPHICS_QUALITY_PRESETS, get_overall_quality, set_overall_quality),
    entry(names::RESOLUTION_SCALE, get_resolution_scale, set_resolution_scale),
    entry(
        names::GLOBAL_ILLUMINATION_QUALITY,
        get_quality::<0>,
        set_quality::<0>,
    ),
    entry(names::SHADOWS, get_quality::<1>, set_quality::<1>),
    entry(names::ANTI_ALIASING, get_quality::<2>, set_quality::<2>),
    entry(names::VIEW_DISTANCE, get_quality::<3>, set_quality::<3>),
    entry(names::TEXTURE_QUALITY, get_quality::<4>, set_quality::<4>),
    entry(names::VISUAL_EFFECT_QUALITY, get_quality::<5>, set_quality::<5>),
    entry(names::REFLECTION_QUALITY, get_quality::<6>, set_quality::<6>),
    entry(names::POST_PROCESSING_QUALITY, get_quality::<7>, set_quality::<7>),
    entry(names::FRAME_RATE_LIMIT_MOBILE, get_mobile_frame_rate, set_mobile_frame_rate),
    entry(names::DLSS_MODE, get_dlss_mode, set_dlss_mode),
    entry(names::DLSS_SHARPNESS, get_dlss_sharpness, set_dlss_sharpness),
    entry(names::DLSS_FRAME_GENERATION, get_frame_generation, set_frame_generation),
    entry(names::NVIDIA_REFLEX, get_reflex, set_reflex),
    entry(names::VERTICAL_SYNC, get_vsync, set_vsync),
    entry(names::FRAME_RATE_LIMIT_ON_BATTERY, get_limit_on_battery, set_limit_on_battery),
    entry(names::FRAME_RATE_LIMIT_IN_MENU, get_limit_in_menu, set_limit_in_menu),
    entry(
        names::FRAME_RATE_LIMIT_WHEN_BACKGROUNDED,
        get_limit_backgrounded,
        set_limit_backgrounded,
    ),
    entry(names::FRAME_RATE_LIMIT_ALWAYS, get_limit_always, set_limit_always),
];
