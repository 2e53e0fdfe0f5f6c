//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::capture::{CaptureOptions, file};

/// Largest scene width or height, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Screenshot defaults.
///
/// Command-line flags override these per invocation.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// Output directory; `~/` is expanded. Empty means `<Pictures>/Screenshots`
    #[serde(default)]
    pub directory: String,

    /// Prefix file names with a `YYYY_MM_DD__HH_MM_SS__` timestamp
    #[serde(default = "default_prefix_timestamp")]
    pub prefix_timestamp: bool,

    /// Capture the on-screen viewport including UI instead of the player view
    #[serde(default)]
    pub show_ui: bool,

    /// Write EXR when the scene renders HDR (falls back to PNG otherwise)
    #[serde(default)]
    pub with_hdr: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            prefix_timestamp: default_prefix_timestamp(),
            show_ui: false,
            with_hdr: false,
        }
    }
}

impl CaptureConfig {
    /// Options for a capture named `filename`, using these defaults.
    pub fn to_options(&self, filename: &str) -> CaptureOptions {
        let directory = if self.directory.trim().is_empty() {
            file::default_screenshot_dir()
        } else {
            file::expand_tilde(&self.directory)
        };
        CaptureOptions {
            directory,
            prefix_timestamp: self.prefix_timestamp,
            show_ui: self.show_ui,
            with_hdr: self.with_hdr,
            ..CaptureOptions::new(filename)
        }
    }
}

/// Built-in headless scene settings.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SceneConfig {
    /// Viewport width in pixels (valid range: 1 - 8192)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Viewport height in pixels (valid range: 1 - 8192)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Render HDR so EXR output is possible
    #[serde(default = "default_hdr_enabled")]
    pub hdr_enabled: bool,

    /// Spawn a local player; without one, player view captures fail
    #[serde(default = "default_player_present")]
    pub player_present: bool,

    /// Register a UI layer that draws a bar over viewport captures
    #[serde(default = "default_ui_overlay")]
    pub ui_overlay: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            hdr_enabled: default_hdr_enabled(),
            player_present: default_player_present(),
            ui_overlay: default_ui_overlay(),
        }
    }
}

impl SceneConfig {
    /// Clamps the scene size to 1 - 8192 pixels per side.
    pub fn clamp_size(&mut self) {
        if !(1..=MAX_DIMENSION).contains(&self.width) {
            log::warn!(
                "Invalid scene width {}, clamping to 1-{} range",
                self.width,
                MAX_DIMENSION
            );
            self.width = self.width.clamp(1, MAX_DIMENSION);
        }

        if !(1..=MAX_DIMENSION).contains(&self.height) {
            log::warn!(
                "Invalid scene height {}, clamping to 1-{} range",
                self.height,
                MAX_DIMENSION
            );
            self.height = self.height.clamp(1, MAX_DIMENSION);
        }
    }
}

fn default_prefix_timestamp() -> bool {
    true
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_hdr_enabled() -> bool {
    true
}

fn default_player_present() -> bool {
    true
}

fn default_ui_overlay() -> bool {
    true
}
