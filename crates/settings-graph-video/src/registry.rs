//! Construction of the video settings menu.

use settings_graph_engine::{
    CapabilityGate, CommitContext, CompositeWhen, DependencyEvaluator, EditCondition,
    EvaluatorConfig, MatchPolarity, OracleContext, SettingBuilder, SettingId, SettingOption,
    SettingValue, SettingsTree, ValueDomain, Verdict, WriteError,
};
use tracing::{debug, info};

use crate::accessors;
use crate::error::{VideoError, VideoResult};
use crate::platform::{
    self, FramePacingMode, PlatformProfile, FACT_FRAME_PACING_MODE,
    FLAG_CAN_RUN_AUTO_BENCHMARK, FLAG_DLSS_HARDWARE_COMPATIBLE, FLAG_DLSS_SUPPORTED,
    FLAG_GRANULAR_VIDEO_QUALITY, FLAG_PRIMARY_PLAYER, METRIC_TITLE_SAFE_PADDING,
    TRAIT_NEEDS_BRIGHTNESS_ADJUSTMENT, TRAIT_SUPPORTS_WINDOWED_MODE,
};
use crate::store::{
    ColorBlindMode, DlssMode, NvidiaReflex, VideoSettingsStore, WindowMode,
    ACTION_EDIT_SAFE_ZONE, CUSTOM_QUALITY,
};

/// Setting dev names.
pub mod names {
    pub const WINDOW_MODE: &str = "WindowMode";
    pub const RESOLUTION: &str = "Resolution";
    pub const COLOR_BLIND_MODE: &str = "ColorBlindMode";
    pub const COLOR_BLIND_STRENGTH: &str = "ColorBlindStrength";
    pub const BRIGHTNESS: &str = "Brightness";
    pub const SAFE_ZONE: &str = "SafeZone";
    pub const DEVICE_PROFILE_SUFFIX: &str = "DeviceProfileSuffix";
    pub const FRAME_RATE_LIMIT_MOBILE: &str = "FrameRateLimit_Mobile";
    pub const AUTO_SET_QUALITY: &str = "AutoSetQuality";
    pub const GRAPHICS_QUALITY_PRESETS: &str = "GraphicsQualityPresets";
    pub const RESOLUTION_SCALE: &str = "ResolutionScale";
    pub const GLOBAL_ILLUMINATION_QUALITY: &str = "GlobalIlluminationQuality";
    pub const SHADOWS: &str = "Shadows";
    pub const ANTI_ALIASING: &str = "AntiAliasing";
    pub const VIEW_DISTANCE: &str = "ViewDistance";
    pub const TEXTURE_QUALITY: &str = "TextureQuality";
    pub const VISUAL_EFFECT_QUALITY: &str = "VisualEffectQuality";
    pub const REFLECTION_QUALITY: &str = "ReflectionQuality";
    pub const POST_PROCESSING_QUALITY: &str = "PostProcessingQuality";
    pub const DLSS_MODE: &str = "NvidiaDLSSMode";
    pub const DLSS_SHARPNESS: &str = "NvidiaDLSSSharpness";
    pub const DLSS_FRAME_GENERATION: &str = "NvidiaDLSSFrameGeneration";
    pub const NVIDIA_REFLEX: &str = "NvidiaReflex";
    pub const VERTICAL_SYNC: &str = "VerticalSync";
    pub const FRAME_RATE_LIMIT_ON_BATTERY: &str = "FrameRateLimit_OnBattery";
    pub const FRAME_RATE_LIMIT_IN_MENU: &str = "FrameRateLimit_InMenu";
    pub const FRAME_RATE_LIMIT_WHEN_BACKGROUNDED: &str = "FrameRateLimit_WhenBackgrounded";
    pub const FRAME_RATE_LIMIT_ALWAYS: &str = "FrameRateLimit_Always";
}

pub const VIDEO: &str = "Video";
pub const DISPLAY: &str = "Video/Display";
pub const GRAPHICS: &str = "Video/Graphics";
pub const GRAPHICS_QUALITY: &str = "Video/GraphicsQuality";
pub const NVIDIA_DLSS: &str = "Video/NvidiaDLSS";
pub const ADVANCED_GRAPHICS: &str = "Video/AdvancedGraphics";
pub const FRAME_RATES: &str = "Video/FrameRates";

/// Collection paths and display names, parents first.
pub const COLLECTIONS: [(&str, &str); 7] = [
    (VIDEO, "Video"),
    (DISPLAY, "Display"),
    (GRAPHICS, "Graphics"),
    (GRAPHICS_QUALITY, "Graphics Quality"),
    (NVIDIA_DLSS, "Nvidia DLSS"),
    (ADVANCED_GRAPHICS, "Advanced Graphics"),
    (FRAME_RATES, "Frame Rates"),
];

const PRIMARY_PLAYER_ONLY: &str = "Can only be changed by the primary player.";
const NO_WINDOW_MODE: &str = "Platform does not support window mode";
const DLSS_REQUIRED: &str = "Nvidia DLSS has to be supported.";
const DLSS_REQUIRED_AND_ON: &str = "Nvidia DLSS has to be supported and not off.";
const DLSS_REQUIRED_COMPATIBLE_AND_ON: &str =
    "Nvidia DLSS has to be supported, hardware compatible and not off.";

type Builder = SettingBuilder<VideoSettingsStore>;

// =============================================================================
// Entry points
// =============================================================================

/// Build the full video menu for `profile` over `store`.
pub fn build_video_settings(
    profile: &PlatformProfile,
    store: VideoSettingsStore,
) -> VideoResult<SettingsTree<VideoSettingsStore>> {
    let mut tree = SettingsTree::new(store, profile.oracle.clone());
    register_video_settings(&mut tree, profile)?;
    Ok(tree)
}

/// A ready-to-use menu: fresh store for the profile, every edit state
/// computed and the current values captured as initial values.
pub fn video_menu(
    profile: &PlatformProfile,
) -> VideoResult<DependencyEvaluator<VideoSettingsStore>> {
    let tree = build_video_settings(profile, VideoSettingsStore::for_profile(profile))?;
    open_menu(tree, EvaluatorConfig::default())
}

/// Evaluate every setting of `tree` and capture its initial values.
pub fn open_menu(
    tree: SettingsTree<VideoSettingsStore>,
    config: EvaluatorConfig,
) -> VideoResult<DependencyEvaluator<VideoSettingsStore>> {
    let mut evaluator = DependencyEvaluator::with_config(tree, config);
    evaluator.evaluate_all()?;
    evaluator.tree_mut().store_initial();
    Ok(evaluator)
}

/// Register the video collections and settings into an existing tree.
pub fn register_video_settings(
    tree: &mut SettingsTree<VideoSettingsStore>,
    profile: &PlatformProfile,
) -> VideoResult<()> {
    for (path, display_name) in COLLECTIONS {
        tree.add_collection(path, display_name)?;
    }

    let window_mode = register_display(tree, profile)?;
    register_graphics(tree)?;
    register_graphics_quality(tree, profile)?;
    register_nvidia(tree)?;
    register_advanced_graphics(tree, window_mode)?;
    register_frame_rates(tree, profile)?;

    info!(
        profile = %profile.name,
        settings = tree.len(),
        edges = tree.edge_count(),
        "video_settings_built"
    );
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Attach the accessor pair registered for the builder's name.
fn bound(builder: Builder) -> VideoResult<Builder> {
    let accessor = accessors::accessor(builder.name()).ok_or_else(|| VideoError::MissingAccessor {
        name: builder.name().to_string(),
    })?;
    Ok(builder.accessor(accessor.get, accessor.set))
}

fn primary_player() -> CapabilityGate {
    CapabilityGate::new(FLAG_PRIMARY_PLAYER, PRIMARY_PLAYER_ONLY)
}

/// Hidden unless the platform paces frames in `mode`.
fn frame_pacing(mode: FramePacingMode, polarity: MatchPolarity) -> EditCondition {
    EditCondition::fact(
        FACT_FRAME_PACING_MODE,
        mode.key(),
        polarity,
        format!("Frame pacing mode didn't match requirement {}", mode.key()),
    )
}

/// Hidden unless the platform exposes the individual quality settings.
fn granular_quality(label: &str) -> CapabilityGate {
    CapabilityGate::new(
        FLAG_GRANULAR_VIDEO_QUALITY,
        format!("Platform does not support {label}"),
    )
    .hide()
}

fn apply_scalability(store: &mut VideoSettingsStore, ctx: &CommitContext<'_>) {
    debug!(setting = %ctx.setting, name = ctx.name, "apply_scalability_on_commit");
    store.local.apply_scalability_settings();
}

fn quality_options(labels: [&str; 4]) -> Vec<SettingOption> {
    labels
        .into_iter()
        .enumerate()
        .map(|(level, label)| SettingOption::new(level as i64, label))
        .collect()
}

fn frame_rate_options(rates: &[i64]) -> Vec<SettingOption> {
    rates
        .iter()
        .map(|rate| SettingOption::new(*rate, format!("{rate} FPS")))
        .collect()
}

fn enum_default(key: &str) -> SettingValue {
    SettingValue::enumeration(key)
}

// =============================================================================
// Display
// =============================================================================

fn register_display(
    tree: &mut SettingsTree<VideoSettingsStore>,
    profile: &PlatformProfile,
) -> VideoResult<SettingId> {
    let window_mode = tree.register(
        bound(
            Builder::discrete(names::WINDOW_MODE, WindowMode::options())
                .display_name("Window Mode")
                .description(
                    "In Windowed mode you can interact with other windows more easily. \
                     In Windowed Fullscreen mode you can easily switch between applications. \
                     In Fullscreen mode the game will run slightly faster.",
                )
                .default_value(enum_default(WindowMode::Fullscreen.key()))
                .in_collection(DISPLAY)
                .condition(EditCondition::hide_if_trait_missing(
                    TRAIT_SUPPORTS_WINDOWED_MODE,
                    NO_WINDOW_MODE,
                )),
        )?,
    )?;

    let mut resolutions: Vec<SettingOption> =
        profile.resolutions.iter().map(|r| r.option()).collect();
    if !profile.resolutions.contains(&profile.desktop_resolution) {
        resolutions.push(profile.desktop_resolution.option());
    }
    tree.register(
        bound(
            Builder::discrete(names::RESOLUTION, resolutions)
                .display_name("Resolution")
                .description(
                    "Display Resolution determines the size of the window in Windowed mode. \
                     Display Resolution is inactive in Windowed Fullscreen mode.",
                )
                .default_value(enum_default(&profile.desktop_resolution.key()))
                .in_collection(DISPLAY)
                .condition(EditCondition::hide_if_trait_missing(
                    TRAIT_SUPPORTS_WINDOWED_MODE,
                    NO_WINDOW_MODE,
                ))
                .condition(EditCondition::disable_if_value(
                    window_mode,
                    enum_default(WindowMode::WindowedFullscreen.key()),
                    "When the Window Mode is set to Windowed Fullscreen, the resolution must \
                     match the native desktop resolution.",
                )),
        )?,
    )?;

    Ok(window_mode)
}

// =============================================================================
// Graphics
// =============================================================================

fn register_graphics(tree: &mut SettingsTree<VideoSettingsStore>) -> VideoResult<()> {
    tree.register(
        bound(
            Builder::discrete(names::COLOR_BLIND_MODE, ColorBlindMode::options())
                .display_name("Color Blind Mode")
                .description(
                    "Test out the different color blind modes to find a color correction \
                     that works best for you.",
                )
                .default_value(enum_default(ColorBlindMode::Off.key()))
                .in_collection(GRAPHICS)
                .condition(primary_player()),
        )?,
    )?;

    tree.register(
        bound(
            Builder::new(
                names::COLOR_BLIND_STRENGTH,
                ValueDomain::int_range(0, 10),
            )
            .display_name("Color Blind Strength")
            .default_value(10)
            .in_collection(GRAPHICS)
            .condition(primary_player()),
        )?,
    )?;

    tree.register(
        bound(
            Builder::scalar(names::BRIGHTNESS, 1.7, 2.7)
                .step(0.01)
                .display_name("Brightness")
                .description("Adjusts the brightness.")
                .default_value(2.2)
                .in_collection(GRAPHICS)
                .condition(primary_player())
                .condition(EditCondition::hide_if_trait_missing(
                    TRAIT_NEEDS_BRIGHTNESS_ADJUSTMENT,
                    "Platform does not require brightness adjustment.",
                )),
        )?,
    )?;

    tree.register(
        Builder::action(names::SAFE_ZONE, edit_safe_zone)
            .display_name("Safe Zone")
            .description("Set the UI safe zone for the platform.")
            .in_collection(GRAPHICS)
            .condition(primary_player())
            .condition(CompositeWhen::new("title_safe_padding", |ctx| {
                match ctx.oracle.metric(METRIC_TITLE_SAFE_PADDING) {
                    Ok(padding) if padding > 0.0 => Verdict::Allowed,
                    Ok(_) => Verdict::hidden(
                        "Platform does not have any TitleSafePaddingSize configured in the \
                         display metrics.",
                    ),
                    Err(err) => ctx.unavailable(err),
                }
            })),
    )?;

    Ok(())
}

fn edit_safe_zone(store: &mut VideoSettingsStore, _: &OracleContext) -> Result<(), WriteError> {
    store.pending_actions.push(ACTION_EDIT_SAFE_ZONE.to_string());
    Ok(())
}

// =============================================================================
// Graphics quality
// =============================================================================

/// The constituents of the overall quality preset, in menu order.
const QUALITY_SETTINGS: [(&str, &str, &str, [&str; 4]); 8] = [
    (
        names::GLOBAL_ILLUMINATION_QUALITY,
        "Global Illumination",
        "GlobalIlluminationQuality",
        ["Low", "Medium", "High", "Epic"],
    ),
    (names::SHADOWS, "Shadows", "Shadows", ["Off", "Medium", "High", "Epic"]),
    (
        names::ANTI_ALIASING,
        "Anti-Aliasing",
        "Anti-Aliasing",
        ["Off", "Medium", "High", "Epic"],
    ),
    (
        names::VIEW_DISTANCE,
        "View Distance",
        "View Distance",
        ["Near", "Medium", "Far", "Epic"],
    ),
    (
        names::TEXTURE_QUALITY,
        "Textures",
        "Texture quality",
        ["Low", "Medium", "High", "Epic"],
    ),
    (
        names::VISUAL_EFFECT_QUALITY,
        "Effects",
        "VisualEffectQuality",
        ["Low", "Medium", "High", "Epic"],
    ),
    (
        names::REFLECTION_QUALITY,
        "Reflections",
        "ReflectionQuality",
        ["Low", "Medium", "High", "Epic"],
    ),
    (
        names::POST_PROCESSING_QUALITY,
        "Post Processing",
        "PostProcessingQuality",
        ["Low", "Medium", "High", "Epic"],
    ),
];

fn register_graphics_quality(
    tree: &mut SettingsTree<VideoSettingsStore>,
    profile: &PlatformProfile,
) -> VideoResult<()> {
    register_device_profile_suffix(tree, profile)?;

    let auto_set = tree.register(
        Builder::action(names::AUTO_SET_QUALITY, auto_set_quality)
            .display_name("Auto-Set Quality")
            .description(
                "Automatically configure the graphics quality options based on a benchmark \
                 of the hardware.",
            )
            .in_collection(GRAPHICS_QUALITY)
            .condition(CompositeWhen::new("auto_quality_supported", |ctx| {
                match FramePacingMode::from_oracle(ctx.oracle) {
                    Ok(FramePacingMode::MobileStyle) => return Verdict::Allowed,
                    Ok(_) => {}
                    Err(err) => return ctx.unavailable(err),
                }
                match ctx.oracle.flag(FLAG_CAN_RUN_AUTO_BENCHMARK) {
                    Ok(true) => Verdict::Allowed,
                    Ok(false) => Verdict::hidden("Auto quality not supported"),
                    Err(err) => ctx.unavailable(err),
                }
            })),
    )?;

    let mut mobile_fps = Builder::discrete(
        names::FRAME_RATE_LIMIT_MOBILE,
        frame_rate_options(&profile.mobile_frame_rates),
    )
    .display_name("Frame Rate Limit")
    .description("Select a desired framerate. Use this to fine tune performance on your device.")
    .in_collection(GRAPHICS_QUALITY)
    .depends_on(auto_set)
    .condition(frame_pacing(FramePacingMode::MobileStyle, MatchPolarity::EnableIf));
    let mobile_default = profile.mobile_default_frame_rate();
    if profile.mobile_frame_rates.contains(&mobile_default) {
        mobile_fps = mobile_fps.default_value(mobile_default);
    }
    let mobile_fps = tree.register(bound(mobile_fps)?)?;

    let mut constituents = Vec::with_capacity(QUALITY_SETTINGS.len() + 1);
    constituents.push(tree.register(
        bound(
            Builder::scalar(names::RESOLUTION_SCALE, 0.0, 1.0)
                .step(0.01)
                .display_name("3D Resolution")
                .description(
                    "3D resolution determines the resolution that objects are rendered in \
                     game, but does not affect the main menu.",
                )
                .default_value(1.0)
                .in_collection(GRAPHICS_QUALITY)
                .depends_on(auto_set)
                .on_committed(apply_scalability)
                .condition(granular_quality("3D Resolution")),
        )?,
    )?);

    for (name, display_name, label, option_labels) in QUALITY_SETTINGS {
        constituents.push(register_quality(
            tree,
            name,
            display_name,
            label,
            option_labels,
            auto_set,
        )?);
    }

    let mut options = quality_options(["Low", "Medium", "High", "Epic"]);
    options.push(SettingOption::new(CUSTOM_QUALITY, "Custom"));
    let mut preset = Builder::discrete(names::GRAPHICS_QUALITY_PRESETS, options)
        .display_name("Quality Presets")
        .description(
            "Quality Preset allows you to adjust multiple video options at once. Try a few \
             options to see what fits your preference and device's performance.",
        )
        .default_value(3)
        .in_collection(GRAPHICS_QUALITY)
        .depends_on(auto_set)
        .depends_on(mobile_fps)
        .on_committed(apply_scalability)
        .condition(frame_pacing(FramePacingMode::ConsoleStyle, MatchPolarity::DisableIf));
    for id in constituents {
        preset = preset.depends_on(id);
    }
    tree.register(bound(preset)?)?;

    Ok(())
}

fn register_quality(
    tree: &mut SettingsTree<VideoSettingsStore>,
    name: &'static str,
    display_name: &str,
    label: &str,
    option_labels: [&str; 4],
    auto_set: SettingId,
) -> VideoResult<SettingId> {
    Ok(tree.register(
        bound(
            Builder::discrete(name, quality_options(option_labels))
                .display_name(display_name)
                .default_value(3)
                .in_collection(GRAPHICS_QUALITY)
                .depends_on(auto_set)
                .on_committed(apply_scalability)
                .condition(granular_quality(label)),
        )?,
    )?)
}

/// Offered only when the display can drive more than one variant.
fn register_device_profile_suffix(
    tree: &mut SettingsTree<VideoSettingsStore>,
    profile: &PlatformProfile,
) -> VideoResult<Option<SettingId>> {
    let variants = profile.available_device_profiles();
    if variants.len() <= 1 {
        debug!(
            profile = %profile.name,
            variants = variants.len(),
            "device_profile_suffix_skipped"
        );
        return Ok(None);
    }

    let default = variants
        .iter()
        .find(|v| v.suffix == profile.default_device_profile_suffix)
        .or_else(|| variants.first())
        .map(|v| v.suffix.clone())
        .unwrap_or_default();
    let options = variants
        .iter()
        .map(|v| SettingOption::enumeration(v.suffix.clone(), v.display_name.clone()));

    let id = tree.register(
        bound(
            Builder::discrete(names::DEVICE_PROFILE_SUFFIX, options)
                .display_name("Quality Presets")
                .description(
                    "Choose between different quality presets to make a trade off between \
                     quality and speed.",
                )
                .default_value(enum_default(&default))
                .in_collection(GRAPHICS_QUALITY),
        )?,
    )?;
    Ok(Some(id))
}

/// Decides from the live oracle, the same source its edit condition reads.
fn auto_set_quality(
    store: &mut VideoSettingsStore,
    oracle: &OracleContext,
) -> Result<(), WriteError> {
    let pacing =
        FramePacingMode::from_oracle(oracle).map_err(|err| WriteError::new(err.to_string()))?;
    if pacing == FramePacingMode::MobileStyle {
        store
            .local
            .reset_to_mobile_device_defaults(platform::mobile_default_frame_rate(oracle));
    } else {
        store
            .local
            .run_auto_benchmark(platform::benchmark_quality_level(oracle));
    }
    Ok(())
}

// =============================================================================
// Nvidia DLSS
// =============================================================================

fn register_nvidia(tree: &mut SettingsTree<VideoSettingsStore>) -> VideoResult<()> {
    let dlss_off = enum_default(DlssMode::Off.key());

    let mode = tree.register(
        bound(
            Builder::discrete(names::DLSS_MODE, DlssMode::options())
                .display_name("Nvidia DLSS Mode")
                .description("Select the Nvidia DLSS Mode.")
                .default_value(dlss_off.clone())
                .in_collection(NVIDIA_DLSS)
                .condition(primary_player())
                .condition(CapabilityGate::new(FLAG_DLSS_SUPPORTED, DLSS_REQUIRED)),
        )?,
    )?;

    tree.register(
        bound(
            Builder::new(
                names::DLSS_SHARPNESS,
                ValueDomain::int_range(0, 10),
            )
            .display_name("Nvidia DLSS Sharpness")
            .description("Nvidia DLSS Sharpness value 0-10.")
            .default_value(0)
            .in_collection(NVIDIA_DLSS)
            .condition(primary_player())
            .condition(
                CapabilityGate::new(FLAG_DLSS_SUPPORTED, DLSS_REQUIRED_AND_ON)
                    .unless_value(mode, dlss_off.clone()),
            ),
        )?,
    )?;

    tree.register(
        bound(
            Builder::toggle(names::DLSS_FRAME_GENERATION)
                .display_name("Nvidia DLSS Frame Generation")
                .description("Whether to enable Nvidia DLSS Frame Generation.")
                .default_value(false)
                .in_collection(NVIDIA_DLSS)
                .condition(primary_player())
                .condition(
                    CapabilityGate::new(FLAG_DLSS_SUPPORTED, DLSS_REQUIRED_COMPATIBLE_AND_ON)
                        .and(FLAG_DLSS_HARDWARE_COMPATIBLE)
                        .unless_value(mode, dlss_off.clone()),
                ),
        )?,
    )?;

    tree.register(
        bound(
            Builder::discrete(names::NVIDIA_REFLEX, NvidiaReflex::options())
                .display_name("Nvidia Reflex")
                .description("Select the Nvidia Reflex.")
                .default_value(enum_default(NvidiaReflex::Disabled.key()))
                .in_collection(NVIDIA_DLSS)
                .condition(primary_player())
                .condition(
                    CapabilityGate::new(FLAG_DLSS_SUPPORTED, DLSS_REQUIRED_AND_ON)
                        .unless_value(mode, dlss_off),
                ),
        )?,
    )?;

    Ok(())
}

// =============================================================================
// Advanced graphics
// =============================================================================

fn register_advanced_graphics(
    tree: &mut SettingsTree<VideoSettingsStore>,
    window_mode: SettingId,
) -> VideoResult<()> {
    tree.register(
        bound(
            Builder::toggle(names::VERTICAL_SYNC)
                .display_name("Vertical Sync")
                .description(
                    "Enabling Vertical Sync eliminates screen tearing by always rendering and \
                     presenting a full frame.",
                )
                .default_value(false)
                .in_collection(ADVANCED_GRAPHICS)
                .condition(frame_pacing(FramePacingMode::DesktopStyle, MatchPolarity::EnableIf))
                .condition(EditCondition::enable_if_value(
                    window_mode,
                    enum_default(WindowMode::Fullscreen.key()),
                    "This feature only works if 'Window Mode' is set to 'Fullscreen'.",
                )),
        )?,
    )?;
    Ok(())
}

// =============================================================================
// Frame rates
// =============================================================================

fn register_frame_rates(
    tree: &mut SettingsTree<VideoSettingsStore>,
    profile: &PlatformProfile,
) -> VideoResult<()> {
    let limits = [
        (
            names::FRAME_RATE_LIMIT_ON_BATTERY,
            "Frame Rate Limit (On Battery)",
            "when running on battery",
            60,
        ),
        (names::FRAME_RATE_LIMIT_IN_MENU, "Frame Rate Limit (Menu)", "when in the menu", 144),
        (
            names::FRAME_RATE_LIMIT_WHEN_BACKGROUNDED,
            "Frame Rate Limit (Background)",
            "when in the background",
            30,
        ),
        (names::FRAME_RATE_LIMIT_ALWAYS, "Frame Rate Limit", "in all other cases", 0),
    ];

    for (name, display_name, when, default) in limits {
        let mut options = frame_rate_options(&profile.desktop_frame_rate_limits);
        options.push(SettingOption::new(0, "Unlimited"));
        let mut builder = Builder::discrete(name, options)
            .display_name(display_name)
            .description(format!(
                "Frame rate limit {when}. You may need to disable Vsync to reach high frame rates."
            ))
            .in_collection(FRAME_RATES)
            .condition(frame_pacing(FramePacingMode::DesktopStyle, MatchPolarity::EnableIf));
        if default == 0 || profile.desktop_frame_rate_limits.contains(&default) {
            builder = builder.default_value(default);
        }
        tree.register(bound(builder)?)?;
    }
    Ok(())
}
