//! Screenshot capture for interactive 3D applications.
//!
//! A [`ScreenshotAction`](capture::ScreenshotAction) reads a frame from the
//! viewport, the player's point of view or a custom camera, writes it as PNG
//! or OpenEXR on a worker pool and loads it back as a texture. The host
//! application plugs in through the traits in [`capture::context`]; the
//! [`headless`] scene implements them in software.

pub mod capture;
pub mod config;
pub mod headless;

pub use capture::{CaptureOptions, ScreenshotAction, load_screenshot};
pub use config::Config;
