//! End-to-end tests of the video menu under the built-in platform profiles.

use settings_graph_engine::{
    DependencyEvaluator, EditState, SettingId, SettingValue, SettingsError, Severity,
};
use settings_graph_video::platform::{
    FACT_FRAME_PACING_MODE, FLAG_GRANULAR_VIDEO_QUALITY, FLAG_PRIMARY_PLAYER,
    METRIC_TITLE_SAFE_PADDING,
};
use settings_graph_video::{
    build_video_settings, names, open_menu, video_menu, PlatformProfile, QualityGroup,
    VideoSettingsStore, ACTION_EDIT_SAFE_ZONE, CUSTOM_QUALITY,
};

type Menu = DependencyEvaluator<VideoSettingsStore>;

// ============================================================================
// Helpers
// ============================================================================

fn id(menu: &Menu, name: &str) -> SettingId {
    menu.tree()
        .id_of(name)
        .unwrap_or_else(|| panic!("setting {name} is not registered"))
}

fn state(menu: &Menu, name: &str) -> EditState {
    menu.tree().edit_state(id(menu, name)).cloned().unwrap()
}

fn value(menu: &Menu, name: &str) -> Option<SettingValue> {
    menu.tree().value(id(menu, name)).cloned()
}

fn has_reason(state: &EditState, reason: &str) -> bool {
    state.reasons().any(|r| r == reason)
}

fn enumeration(key: &str) -> SettingValue {
    SettingValue::enumeration(key)
}

// ============================================================================
// Desktop
// ============================================================================

#[test]
fn test_desktop_menu_visibility() -> anyhow::Result<()> {
    let menu = video_menu(&PlatformProfile::desktop())?;

    assert!(state(&menu, names::WINDOW_MODE).is_enabled());
    assert!(state(&menu, names::RESOLUTION).is_enabled());
    assert!(state(&menu, names::GRAPHICS_QUALITY_PRESETS).is_enabled());
    assert!(state(&menu, names::SHADOWS).is_enabled());
    assert!(state(&menu, names::AUTO_SET_QUALITY).is_enabled());
    assert!(state(&menu, names::VERTICAL_SYNC).is_enabled());
    assert!(state(&menu, names::FRAME_RATE_LIMIT_IN_MENU).is_enabled());

    let brightness = state(&menu, names::BRIGHTNESS);
    assert_eq!(brightness.severity(), Severity::Hidden);
    assert!(has_reason(&brightness, "Platform does not require brightness adjustment."));

    // No title safe padding on desktop monitors.
    assert!(!state(&menu, names::SAFE_ZONE).is_visible());
    assert!(!state(&menu, names::FRAME_RATE_LIMIT_MOBILE).is_visible());

    // A single device profile variant is not worth a selector.
    assert!(menu.tree().id_of(names::DEVICE_PROFILE_SUFFIX).is_none());

    assert_eq!(value(&menu, names::FRAME_RATE_LIMIT_IN_MENU), Some(SettingValue::Int(144)));
    assert_eq!(value(&menu, names::GRAPHICS_QUALITY_PRESETS), Some(SettingValue::Int(3)));
    Ok(())
}

#[test]
fn test_resolution_disabled_in_windowed_fullscreen() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    let window_mode = id(&menu, names::WINDOW_MODE);
    let resolution = id(&menu, names::RESOLUTION);

    let pass = menu.set_value(window_mode, enumeration("WindowedFullscreen"))?;
    assert!(pass.was_evaluated(resolution));
    assert!(pass.changed.contains(&resolution));

    let disabled = state(&menu, names::RESOLUTION);
    assert_eq!(disabled.severity(), Severity::Disabled);
    assert!(disabled.reason_text().contains("native desktop resolution"));

    menu.set_value(window_mode, enumeration("Windowed"))?;
    assert!(state(&menu, names::RESOLUTION).is_enabled());
    Ok(())
}

#[test]
fn test_vsync_requires_fullscreen() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;

    menu.set_value_by_name(names::WINDOW_MODE, enumeration("Windowed"))?;
    let vsync = state(&menu, names::VERTICAL_SYNC);
    assert_eq!(vsync.severity(), Severity::Disabled);
    assert!(has_reason(
        &vsync,
        "This feature only works if 'Window Mode' is set to 'Fullscreen'."
    ));

    menu.set_value_by_name(names::WINDOW_MODE, enumeration("Fullscreen"))?;
    assert!(state(&menu, names::VERTICAL_SYNC).is_enabled());
    Ok(())
}

#[test]
fn test_dlss_dependents_follow_mode() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;

    assert!(state(&menu, names::DLSS_MODE).is_enabled());
    for name in [names::DLSS_SHARPNESS, names::DLSS_FRAME_GENERATION, names::NVIDIA_REFLEX] {
        assert_eq!(state(&menu, name).severity(), Severity::Disabled, "{name}");
    }
    assert!(has_reason(
        &state(&menu, names::DLSS_SHARPNESS),
        "Nvidia DLSS has to be supported and not off."
    ));
    assert!(has_reason(
        &state(&menu, names::DLSS_FRAME_GENERATION),
        "Nvidia DLSS has to be supported, hardware compatible and not off."
    ));

    let pass = menu.set_value_by_name(names::DLSS_MODE, enumeration("Quality"))?;
    assert_eq!(pass.changed.len(), 3);
    for name in [names::DLSS_SHARPNESS, names::DLSS_FRAME_GENERATION, names::NVIDIA_REFLEX] {
        assert!(state(&menu, name).is_enabled(), "{name}");
    }
    assert_eq!(
        menu.tree().store().local.dlss_mode,
        settings_graph_video::DlssMode::Quality
    );
    Ok(())
}

#[test]
fn test_preset_becomes_custom() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    let preset = id(&menu, names::GRAPHICS_QUALITY_PRESETS);
    let applied = menu.tree().store().local.scalability_applied;

    let pass = menu.set_value_by_name(names::SHADOWS, 1)?;
    assert!(pass.was_evaluated(preset));
    assert_eq!(
        value(&menu, names::GRAPHICS_QUALITY_PRESETS),
        Some(SettingValue::Int(CUSTOM_QUALITY))
    );
    assert_eq!(
        menu.tree().node(preset).and_then(|n| n.value_label()),
        Some("Custom".to_string())
    );
    assert_eq!(menu.tree().store().local.scalability_applied, applied + 1);

    // Custom is only ever derived.
    let err = menu.set_value(preset, CUSTOM_QUALITY).unwrap_err();
    assert!(matches!(err, SettingsError::AccessorWrite { .. }));
    Ok(())
}

#[test]
fn test_preset_fans_out_to_constituents() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    let shadows = id(&menu, names::SHADOWS);
    let textures = id(&menu, names::TEXTURE_QUALITY);

    let pass = menu.set_value_by_name(names::GRAPHICS_QUALITY_PRESETS, 1)?;
    assert!(pass.was_evaluated(shadows));
    assert!(pass.was_evaluated(textures));
    assert_eq!(value(&menu, names::SHADOWS), Some(SettingValue::Int(1)));
    assert_eq!(value(&menu, names::POST_PROCESSING_QUALITY), Some(SettingValue::Int(1)));
    assert_eq!(menu.tree().store().local.overall_quality_level(), Some(1));

    // Each setting is evaluated once even though the preset reads them all.
    let mut seen = pass.evaluated.clone();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), pass.evaluated.len());
    Ok(())
}

#[test]
fn test_auto_set_quality_runs_benchmark_on_desktop() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    menu.set_value_by_name(names::TEXTURE_QUALITY, 0)?;
    assert_eq!(
        value(&menu, names::GRAPHICS_QUALITY_PRESETS),
        Some(SettingValue::Int(CUSTOM_QUALITY))
    );

    let auto_set = id(&menu, names::AUTO_SET_QUALITY);
    let pass = menu.run_action(auto_set)?;
    assert!(pass.was_evaluated(id(&menu, names::TEXTURE_QUALITY)));
    assert!(pass.was_evaluated(id(&menu, names::GRAPHICS_QUALITY_PRESETS)));

    let local = &menu.tree().store().local;
    assert_eq!(local.benchmark_runs, 1);
    assert_eq!(local.quality(QualityGroup::Textures), 3);
    assert_eq!(value(&menu, names::GRAPHICS_QUALITY_PRESETS), Some(SettingValue::Int(3)));
    Ok(())
}

#[test]
fn test_value_settings_reject_out_of_domain_values() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    let before = menu.tree().store().clone();

    let err = menu
        .set_value_by_name(names::RESOLUTION, enumeration("640x480"))
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue { .. }));

    let err = menu.set_value_by_name(names::BRIGHTNESS, 3.5).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue { .. }));

    assert_eq!(menu.tree().store(), &before);
    Ok(())
}

#[test]
fn test_granular_quality_flip() -> anyhow::Result<()> {
    let profile = PlatformProfile::desktop();
    let mut menu = video_menu(&profile)?;

    let oracle = profile
        .oracle
        .clone()
        .with_flag(FLAG_GRANULAR_VIDEO_QUALITY, false);
    let pass = menu.on_oracle_changed(oracle)?;
    assert!(pass.had_changes());

    let shadows = state(&menu, names::SHADOWS);
    assert_eq!(shadows.severity(), Severity::Hidden);
    assert!(has_reason(&shadows, "Platform does not support Shadows"));
    assert!(has_reason(
        &state(&menu, names::RESOLUTION_SCALE),
        "Platform does not support 3D Resolution"
    ));
    // The preset itself only cares about frame pacing.
    assert!(state(&menu, names::GRAPHICS_QUALITY_PRESETS).is_enabled());

    menu.on_oracle_changed(profile.oracle.clone())?;
    assert!(state(&menu, names::SHADOWS).is_enabled());
    Ok(())
}

#[test]
fn test_missing_frame_pacing_fact_hides_dependents() -> anyhow::Result<()> {
    let profile = PlatformProfile::desktop();
    let mut menu = video_menu(&profile)?;

    let mut oracle = settings_graph_engine::OracleContext::new()
        .with_flag(FLAG_GRANULAR_VIDEO_QUALITY, true)
        .with_metric(METRIC_TITLE_SAFE_PADDING, 0.0);
    oracle.add_trait(settings_graph_video::platform::TRAIT_SUPPORTS_WINDOWED_MODE);
    menu.on_oracle_changed(oracle)?;

    let vsync = state(&menu, names::VERTICAL_SYNC);
    assert_eq!(vsync.severity(), Severity::Hidden);
    assert!(has_reason(&vsync, "oracle fact `FramePacingMode` is unavailable"));
    assert!(!state(&menu, names::FRAME_RATE_LIMIT_ALWAYS).is_visible());
    Ok(())
}

#[test]
fn test_restore_to_initial_after_edits() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    let window_mode = id(&menu, names::WINDOW_MODE);

    menu.set_value(window_mode, enumeration("Windowed"))?;
    assert_eq!(menu.tree().changed_since_initial(), vec![window_mode]);

    menu.restore_to_initial(window_mode)?;
    assert!(menu.tree().changed_since_initial().is_empty());
    assert!(state(&menu, names::VERTICAL_SYNC).is_enabled());
    Ok(())
}

// ============================================================================
// Console
// ============================================================================

#[test]
fn test_console_hides_granular_quality() -> anyhow::Result<()> {
    let menu = video_menu(&PlatformProfile::console())?;

    for name in [names::SHADOWS, names::VIEW_DISTANCE, names::RESOLUTION_SCALE] {
        assert!(!state(&menu, name).is_visible(), "{name}");
    }
    assert!(!state(&menu, names::GRAPHICS_QUALITY_PRESETS).is_visible());
    assert!(has_reason(
        &state(&menu, names::GRAPHICS_QUALITY_PRESETS),
        "Frame pacing mode didn't match requirement ConsoleStyle"
    ));
    assert!(has_reason(
        &state(&menu, names::AUTO_SET_QUALITY),
        "Auto quality not supported"
    ));

    assert!(!state(&menu, names::WINDOW_MODE).is_visible());
    assert!(state(&menu, names::BRIGHTNESS).is_enabled());
    assert!(state(&menu, names::SAFE_ZONE).is_enabled());

    let dlss = state(&menu, names::DLSS_MODE);
    assert_eq!(dlss.severity(), Severity::Disabled);
    assert!(has_reason(&dlss, "Nvidia DLSS has to be supported."));
    Ok(())
}

#[test]
fn test_console_device_profile_selector() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::console())?;
    let suffix = id(&menu, names::DEVICE_PROFILE_SUFFIX);
    assert!(state(&menu, names::DEVICE_PROFILE_SUFFIX).is_enabled());
    assert_eq!(value(&menu, names::DEVICE_PROFILE_SUFFIX), Some(enumeration("")));

    menu.set_value(suffix, enumeration("_Perf"))?;
    assert_eq!(menu.tree().store().local.desired_device_profile_suffix, "_Perf");
    Ok(())
}

#[test]
fn test_console_collection_visibility() -> anyhow::Result<()> {
    let menu = video_menu(&PlatformProfile::console())?;
    let tree = menu.tree();

    assert!(tree.collection_visible("Video"));
    assert!(tree.collection_visible("Video/Graphics"));
    assert!(tree.collection_visible("Video/GraphicsQuality"));
    // Disabled is still visible.
    assert!(tree.collection_visible("Video/NvidiaDLSS"));
    assert!(!tree.collection_visible("Video/Display"));
    assert!(!tree.collection_visible("Video/AdvancedGraphics"));
    assert!(!tree.collection_visible("Video/FrameRates"));
    Ok(())
}

#[test]
fn test_safe_zone_action_requests_editor() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::console())?;
    let safe_zone = id(&menu, names::SAFE_ZONE);

    let pass = menu.run_action(safe_zone)?;
    assert!(pass.was_evaluated(safe_zone));
    assert_eq!(
        menu.tree_mut().store_mut().drain_actions(),
        vec![ACTION_EDIT_SAFE_ZONE.to_string()]
    );
    assert!(menu.tree().store().pending_actions.is_empty());

    let err = menu
        .set_value(safe_zone, SettingValue::Bool(true))
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue { .. }));
    Ok(())
}

// ============================================================================
// Mobile
// ============================================================================

#[test]
fn test_mobile_auto_set_restores_device_defaults() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::mobile())?;
    assert!(state(&menu, names::AUTO_SET_QUALITY).is_enabled());
    assert!(state(&menu, names::FRAME_RATE_LIMIT_MOBILE).is_enabled());
    assert!(!state(&menu, names::FRAME_RATE_LIMIT_IN_MENU).is_visible());
    assert!(!state(&menu, names::VERTICAL_SYNC).is_visible());

    menu.set_value_by_name(names::GRAPHICS_QUALITY_PRESETS, 3)?;
    menu.set_value_by_name(names::FRAME_RATE_LIMIT_MOBILE, 60)?;

    menu.run_action(id(&menu, names::AUTO_SET_QUALITY))?;
    let local = &menu.tree().store().local;
    assert_eq!(local.benchmark_runs, 0);
    assert_eq!(local.overall_quality_level(), Some(1));
    assert_eq!(value(&menu, names::FRAME_RATE_LIMIT_MOBILE), Some(SettingValue::Int(30)));
    assert_eq!(value(&menu, names::GRAPHICS_QUALITY_PRESETS), Some(SettingValue::Int(1)));
    Ok(())
}

#[test]
fn test_auto_set_quality_follows_the_live_oracle() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    menu.tree_mut().store_mut().local.desired_mobile_frame_rate_limit = 60;
    menu.on_store_changed()?;

    // Same device, now reporting itself as a phone.
    menu.on_oracle_changed(PlatformProfile::mobile().oracle)?;
    assert!(state(&menu, names::AUTO_SET_QUALITY).is_enabled());

    menu.run_action(id(&menu, names::AUTO_SET_QUALITY))?;
    let local = &menu.tree().store().local;
    assert_eq!(local.benchmark_runs, 0);
    assert_eq!(local.overall_quality_level(), Some(1));
    assert_eq!(local.desired_mobile_frame_rate_limit, 30);
    assert_eq!(value(&menu, names::GRAPHICS_QUALITY_PRESETS), Some(SettingValue::Int(1)));
    Ok(())
}

#[test]
fn test_unanswerable_oracle_queries_hide_with_the_error() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    let oracle =
        settings_graph_engine::OracleContext::new().with_flag(FLAG_PRIMARY_PLAYER, true);
    menu.on_oracle_changed(oracle)?;

    let auto_set = state(&menu, names::AUTO_SET_QUALITY);
    assert_eq!(auto_set.severity(), Severity::Hidden);
    assert!(has_reason(&auto_set, "oracle fact `FramePacingMode` is unavailable"));

    let safe_zone = state(&menu, names::SAFE_ZONE);
    assert_eq!(safe_zone.severity(), Severity::Hidden);
    assert!(has_reason(&safe_zone, "oracle fact `TitleSafePaddingSize` is unavailable"));

    // Pacing known, benchmark capability still missing.
    let oracle = settings_graph_engine::OracleContext::new()
        .with_flag(FLAG_PRIMARY_PLAYER, true)
        .with_fact(FACT_FRAME_PACING_MODE, "DesktopStyle");
    menu.on_oracle_changed(oracle)?;
    let auto_set = state(&menu, names::AUTO_SET_QUALITY);
    assert!(has_reason(&auto_set, "oracle fact `CanRunAutoBenchmark` is unavailable"));
    assert!(!has_reason(&auto_set, "Auto quality not supported"));
    Ok(())
}

#[test]
fn test_auto_set_quality_fails_without_a_pacing_mode() -> anyhow::Result<()> {
    let mut menu = video_menu(&PlatformProfile::desktop())?;
    menu.on_oracle_changed(settings_graph_engine::OracleContext::new())?;

    let err = menu
        .run_action(id(&menu, names::AUTO_SET_QUALITY))
        .unwrap_err();
    assert!(matches!(err, SettingsError::AccessorWrite { .. }));
    assert_eq!(menu.tree().store().local.benchmark_runs, 0);
    Ok(())
}

#[test]
fn test_mobile_device_profiles_filtered_by_refresh_rate() -> anyhow::Result<()> {
    let menu = video_menu(&PlatformProfile::mobile())?;
    let node = menu
        .tree()
        .node_by_name(names::DEVICE_PROFILE_SUFFIX)
        .expect("two variants survive the 60 Hz filter");
    let suffixes: Vec<String> = node
        .domain()
        .options()
        .iter()
        .map(|o| o.value.to_string())
        .collect();
    assert_eq!(suffixes, vec!["_Low", "_High"]);
    assert_eq!(node.value(), Some(&enumeration("_Low")));
    Ok(())
}

// ============================================================================
// Profiles from disk
// ============================================================================

#[test]
fn test_profile_loaded_from_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("handheld.json");

    let mut profile = PlatformProfile::console();
    profile.name = "handheld".to_string();
    profile.oracle.set_metric("MaxRefreshRate", 60.0);
    std::fs::write(&path, profile.to_json()?)?;

    let loaded = PlatformProfile::resolve(path.to_str().unwrap())?;
    assert_eq!(loaded.name, "handheld");

    // Only the Quality variant fits a 60 Hz panel.
    let tree = build_video_settings(&loaded, VideoSettingsStore::for_profile(&loaded))?;
    assert!(tree.id_of(names::DEVICE_PROFILE_SUFFIX).is_none());

    let menu = open_menu(tree, settings_graph_engine::EvaluatorConfig::quiet())?;
    assert!(menu.pass_history().last().is_some_and(|p| p.rows.is_empty()));
    Ok(())
}
