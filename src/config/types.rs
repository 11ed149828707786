//! Built-in defaults for the `cli` domain.
//!
//! The structs here only describe the default tree; the store works on the
//! untyped value so that unknown or newer keys in user files survive.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version stamped into the default tree.
pub const CONFIG_VERSION: &str = "1.0";

/// Light or dark color scheme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeMode {
    #[default]
    Dark,
    Light,
}

impl SchemeMode {
    pub const VARIANTS: &'static [&'static str] = &["dark", "light"];
}

/// Output image format for screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
    Webp,
}

impl ImageFormat {
    pub const VARIANTS: &'static [&'static str] = &["png", "jpg", "webp"];
}

/// Notification urgency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    pub const VARIANTS: &'static [&'static str] = &["low", "normal", "critical"];
}

/// Full default configuration of the tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub scheme: SchemeConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub wallpaper: WallpaperConfig,

    #[serde(default)]
    pub clipboard: ClipboardConfig,

    #[serde(default)]
    pub screenshot: ScreenshotConfig,

    #[serde(default)]
    pub notification: NotificationConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            scheme: SchemeConfig::default(),
            theme: ThemeConfig::default(),
            wallpaper: WallpaperConfig::default(),
            clipboard: ClipboardConfig::default(),
            screenshot: ScreenshotConfig::default(),
            notification: NotificationConfig::default(),
        }
    }
}

impl CliConfig {
    /// The defaults as a value tree.
    pub fn default_tree() -> Value {
        serde_json::to_value(Self::default()).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

/// Color scheme selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// Scheme name, e.g. `catppuccin-mocha`.
    #[serde(default = "default_scheme_name")]
    pub default: String,

    #[serde(default)]
    pub mode: SchemeMode,

    /// Palette generation variant for wallpaper-derived schemes.
    #[serde(default = "default_scheme_variant")]
    pub variant: String,

    /// Follow the wallpaper when picking a scheme.
    #[serde(default)]
    pub auto: bool,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            default: default_scheme_name(),
            mode: SchemeMode::default(),
            variant: default_scheme_variant(),
            auto: false,
        }
    }
}

fn default_scheme_name() -> String {
    "catppuccin-mocha".to_string()
}

fn default_scheme_variant() -> String {
    "tonalspot".to_string()
}

/// Which application themes get generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_true")]
    pub enable_gtk: bool,

    #[serde(default = "default_true")]
    pub enable_qt: bool,

    #[serde(default = "default_true")]
    pub enable_terminal: bool,

    #[serde(default)]
    pub enable_discord: bool,

    /// Window background opacity, 0.0 to 1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            enable_gtk: true,
            enable_qt: true,
            enable_terminal: true,
            enable_discord: false,
            opacity: default_opacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Wallpaper discovery and transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallpaperConfig {
    #[serde(default = "default_wallpaper_dir")]
    pub directory: String,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_transition")]
    pub transition: String,

    #[serde(default = "default_transition_ms")]
    pub transition_duration_ms: u64,

    /// Blur applied to the lock screen copy, 0.0 to 1.0.
    #[serde(default)]
    pub blur_ratio: f64,
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            directory: default_wallpaper_dir(),
            extensions: default_extensions(),
            transition: default_transition(),
            transition_duration_ms: default_transition_ms(),
            blur_ratio: 0.0,
        }
    }
}

fn default_wallpaper_dir() -> String {
    "~/Pictures/Wallpapers".to_string()
}

fn default_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_transition() -> String {
    "fade".to_string()
}

fn default_transition_ms() -> u64 {
    500
}

/// Clipboard history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default = "default_max_items")]
    pub max_items: u64,

    #[serde(default = "default_true")]
    pub dedupe: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            dedupe: true,
        }
    }
}

fn default_max_items() -> u64 {
    100
}

/// Screenshot capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default = "default_screenshot_dir")]
    pub directory: String,

    #[serde(default)]
    pub format: ImageFormat,

    /// Encoder quality, 1 to 100. Ignored for png.
    #[serde(default = "default_quality")]
    pub quality: u64,

    #[serde(default)]
    pub delay_secs: u64,

    #[serde(default = "default_true")]
    pub copy_to_clipboard: bool,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            directory: default_screenshot_dir(),
            format: ImageFormat::default(),
            quality: default_quality(),
            delay_secs: 0,
            copy_to_clipboard: true,
        }
    }
}

fn default_screenshot_dir() -> String {
    "~/Pictures/Screenshots".to_string()
}

fn default_quality() -> u64 {
    90
}

/// Desktop notifications sent by the tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub urgency: Urgency,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_timeout_ms(),
            urgency: Urgency::default(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}
