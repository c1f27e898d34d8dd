use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout_engine::DeviceProfile;

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap_or_default().join(".meeting-layout") }
pub fn store_file() -> PathBuf { data_dir().join("storage.ron") }
pub fn config_file() -> PathBuf { dirs::home_dir().unwrap_or_default().join(".meeting-layout.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub timing: TimingSettings,
}

/// Every constant the geometry engine reads.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    #[serde(default)]
    pub panels: PanelSettings,
    #[serde(default)]
    pub chrome: ChromeSettings,
    #[serde(default)]
    pub webcams: WebcamSettings,
    #[serde(default)]
    pub presentation: PresentationSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
}

/// Default width of a side panel: `window_width * ratio`, bounded to
/// `[min_width, max_width]`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct PanelBounds {
    pub ratio: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl PanelBounds {
    pub const fn new(ratio: f64, min_width: f64, max_width: f64) -> Self {
        Self { ratio, min_width, max_width }
    }

    fn validate(&self, name: &str) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            issues.push(format!("panels.{name}.ratio must be in (0, 1], got {}", self.ratio));
        }
        if !is_length(self.min_width) {
            issues.push(format!(
                "panels.{name}.min_width must be a non-negative number, got {}",
                self.min_width
            ));
        }
        if !(self.max_width >= self.min_width) {
            issues.push(format!(
                "panels.{name}.max_width ({}) must not be below min_width ({})",
                self.max_width, self.min_width
            ));
        }

        issues
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct PanelSettings {
    #[serde(default = "default_userlist")]
    pub userlist: PanelBounds,
    #[serde(default = "default_chat")]
    pub chat: PanelBounds,
    #[serde(default = "default_poll")]
    pub poll: PanelBounds,
    #[serde(default = "default_note")]
    pub note: PanelBounds,
    #[serde(default = "default_captions")]
    pub captions: PanelBounds,
    #[serde(default = "default_waiting")]
    pub waiting: PanelBounds,
    #[serde(default = "default_breakout_room")]
    pub breakout_room: PanelBounds,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            userlist: default_userlist(),
            chat: default_chat(),
            poll: default_poll(),
            note: default_note(),
            captions: default_captions(),
            waiting: default_waiting(),
            breakout_room: default_breakout_room(),
        }
    }
}

impl PanelSettings {
    fn entries_mut(&mut self) -> [(&mut PanelBounds, PanelBounds); 7] {
        [
            (&mut self.userlist, default_userlist()),
            (&mut self.chat, default_chat()),
            (&mut self.poll, default_poll()),
            (&mut self.note, default_note()),
            (&mut self.captions, default_captions()),
            (&mut self.waiting, default_waiting()),
            (&mut self.breakout_room, default_breakout_room()),
        ]
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.userlist.validate("userlist"));
        issues.extend(self.chat.validate("chat"));
        issues.extend(self.poll.validate("poll"));
        issues.extend(self.note.validate("note"));
        issues.extend(self.captions.validate("captions"));
        issues.extend(self.waiting.validate("waiting"));
        issues.extend(self.breakout_room.validate("breakout_room"));

        issues
    }

    /// Resets every panel whose bounds fail validation back to its default.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for (bounds, default) in self.entries_mut() {
            if !bounds.validate("").is_empty() {
                *bounds = default;
                fixes += 1;
            }
        }

        fixes
    }
}

/// Heights of the fixed chrome around the media area.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ChromeSettings {
    #[serde(default = "default_navbar_height")]
    pub navbar_height: f64,
    /// Used instead of `navbar_height` while large-font mode is active.
    #[serde(default = "default_large_navbar_height")]
    pub large_navbar_height: f64,
    #[serde(default = "default_actionsbar_height")]
    pub actionsbar_height: f64,
    #[serde(default = "default_mobile_actionsbar_height")]
    pub mobile_actionsbar_height: f64,
    /// Vertical space kept free below the actions bar.
    #[serde(default = "default_media_margin")]
    pub media_margin: f64,
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            navbar_height: default_navbar_height(),
            large_navbar_height: default_large_navbar_height(),
            actionsbar_height: default_actionsbar_height(),
            mobile_actionsbar_height: default_mobile_actionsbar_height(),
            media_margin: default_media_margin(),
        }
    }
}

impl ChromeSettings {
    pub fn navbar_height_for(&self, device: &DeviceProfile) -> f64 {
        if device.large_font { self.large_navbar_height } else { self.navbar_height }
    }

    pub fn actionsbar_height_for(&self, device: &DeviceProfile) -> f64 {
        if device.is_mobile { self.mobile_actionsbar_height } else { self.actionsbar_height }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, value) in [
            ("navbar_height", self.navbar_height),
            ("large_navbar_height", self.large_navbar_height),
            ("actionsbar_height", self.actionsbar_height),
            ("mobile_actionsbar_height", self.mobile_actionsbar_height),
            ("media_margin", self.media_margin),
        ] {
            if !is_length(value) {
                issues.push(format!("chrome.{name} must be a non-negative number, got {value}"));
            }
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        let defaults = ChromeSettings::default();

        for (value, default) in [
            (&mut self.navbar_height, defaults.navbar_height),
            (&mut self.large_navbar_height, defaults.large_navbar_height),
            (&mut self.actionsbar_height, defaults.actionsbar_height),
            (&mut self.mobile_actionsbar_height, defaults.mobile_actionsbar_height),
            (&mut self.media_margin, defaults.media_margin),
        ] {
            if !is_length(*value) {
                *value = default;
                fixes += 1;
            }
        }

        fixes
    }
}

/// Share of the media area the webcam strip may take on its docking axis.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WebcamSettings {
    #[serde(default = "default_webcams_min_percent")]
    pub min_percent: f64,
    #[serde(default = "default_webcams_max_percent")]
    pub max_percent: f64,
}

impl Default for WebcamSettings {
    fn default() -> Self {
        Self {
            min_percent: default_webcams_min_percent(),
            max_percent: default_webcams_max_percent(),
        }
    }
}

impl WebcamSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.min_percent > 0.0 && self.min_percent < 1.0) {
            issues.push(format!(
                "webcams.min_percent must be in (0, 1), got {}",
                self.min_percent
            ));
        }
        if !(self.max_percent > 0.0 && self.max_percent < 1.0) {
            issues.push(format!(
                "webcams.max_percent must be in (0, 1), got {}",
                self.max_percent
            ));
        }
        if self.max_percent < self.min_percent {
            issues.push(format!(
                "webcams.max_percent ({}) must not be below min_percent ({})",
                self.max_percent, self.min_percent
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        if self.validate().is_empty() {
            return 0;
        }
        *self = WebcamSettings::default();
        1
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct PresentationSettings {
    /// Narrowest presentation area that still fits the presentation toolbar.
    #[serde(default = "default_presentation_min_width")]
    pub min_width: f64,
    /// Margin around the presentation when webcams sit beside it (or are absent).
    #[serde(default = "default_presentation_margin")]
    pub margin: f64,
    /// Margin below the presentation when webcams are docked on top.
    #[serde(default = "default_presentation_top_margin")]
    pub top_margin: f64,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            min_width: default_presentation_min_width(),
            margin: default_presentation_margin(),
            top_margin: default_presentation_top_margin(),
        }
    }
}

impl PresentationSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !is_length(self.min_width) {
            issues.push(format!(
                "presentation.min_width must be a non-negative number, got {}",
                self.min_width
            ));
        }
        if !is_length(self.margin) {
            issues.push(format!(
                "presentation.margin must be a non-negative number, got {}",
                self.margin
            ));
        }
        if !is_length(self.top_margin) {
            issues.push(format!(
                "presentation.top_margin must be a non-negative number, got {}",
                self.top_margin
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !is_length(self.min_width) {
            self.min_width = default_presentation_min_width();
            fixes += 1;
        }
        if !is_length(self.margin) {
            self.margin = default_presentation_margin();
            fixes += 1;
        }
        if !is_length(self.top_margin) {
            self.top_margin = default_presentation_top_margin();
            fixes += 1;
        }

        fixes
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ViewportSettings {
    /// At or below this width, open panels overlay the media area.
    #[serde(default = "default_breakpoint")]
    pub layered_breakpoint: f64,
    /// At or below this width, panel resize handles are disabled.
    #[serde(default = "default_breakpoint")]
    pub mobile_breakpoint: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            layered_breakpoint: default_breakpoint(),
            mobile_breakpoint: default_breakpoint(),
        }
    }
}

/// Recompute delays, in milliseconds.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimingSettings {
    /// Minimum spacing between resize-driven recomputations.
    #[serde(default = "default_resize_throttle_ms")]
    pub resize_throttle_ms: u64,
    /// Wait for a DOM transition (fullscreen, slide change, locale) to settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Wait after the webcam count or screen-share state changes.
    #[serde(default = "default_media_change_delay_ms")]
    pub media_change_delay_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            resize_throttle_ms: default_resize_throttle_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            media_change_delay_ms: default_media_change_delay_ms(),
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.panels.validate());
        issues.extend(self.chrome.validate());
        issues.extend(self.webcams.validate());
        issues.extend(self.presentation.validate());
        issues.extend(self.viewport.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        self.panels.auto_fix_values()
            + self.chrome.auto_fix_values()
            + self.webcams.auto_fix_values()
            + self.presentation.auto_fix_values()
            + self.viewport.auto_fix_values()
    }
}

impl ViewportSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, value) in [
            ("layered_breakpoint", self.layered_breakpoint),
            ("mobile_breakpoint", self.mobile_breakpoint),
        ] {
            if !is_length(value) {
                issues.push(format!("viewport.{name} must be a non-negative number, got {value}"));
            }
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for value in [&mut self.layered_breakpoint, &mut self.mobile_breakpoint] {
            if !is_length(*value) {
                *value = default_breakpoint();
                fixes += 1;
            }
        }

        fixes
    }
}

/// Finite and not negative. NaN fails.
fn is_length(value: f64) -> bool { value.is_finite() && value >= 0.0 }

fn default_userlist() -> PanelBounds { PanelBounds::new(0.1, 70.0, 240.0) }
fn default_chat() -> PanelBounds { PanelBounds::new(0.2, 70.0, 400.0) }
fn default_poll() -> PanelBounds { PanelBounds::new(0.2, 320.0, 400.0) }
fn default_note() -> PanelBounds { PanelBounds::new(0.2, 340.0, 800.0) }
fn default_captions() -> PanelBounds { PanelBounds::new(0.2, 340.0, 800.0) }
fn default_waiting() -> PanelBounds { PanelBounds::new(0.2, 340.0, 800.0) }
fn default_breakout_room() -> PanelBounds { PanelBounds::new(0.2, 320.0, 400.0) }

fn default_navbar_height() -> f64 { 112.0 }
fn default_large_navbar_height() -> f64 { 170.0 }
fn default_actionsbar_height() -> f64 { 42.0 }
fn default_mobile_actionsbar_height() -> f64 { 50.0 }
fn default_media_margin() -> f64 { 10.0 }

fn default_webcams_min_percent() -> f64 { 0.2 }
fn default_webcams_max_percent() -> f64 { 0.8 }

fn default_presentation_min_width() -> f64 { 385.0 }
fn default_presentation_margin() -> f64 { 20.0 }
fn default_presentation_top_margin() -> f64 { 30.0 }

fn default_breakpoint() -> f64 { 640.0 }

fn default_resize_throttle_ms() -> u64 { 200 }
fn default_settle_delay_ms() -> u64 { 200 }
fn default_media_change_delay_ms() -> u64 { 500 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path` if it exists, otherwise falls back to the built-in defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Config::default()) }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.layout.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.layout.auto_fix_values() }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}
