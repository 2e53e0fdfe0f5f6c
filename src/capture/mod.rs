//! Screenshot capture functionality for framesnap.
//!
//! This module provides:
//! - Viewport, player point-of-view and custom camera capture strategies
//! - PNG (LDR) and OpenEXR (HDR) encoding on a worker pool
//! - A main-thread queue for continuations that touch action state
//! - The single-flight [`ScreenshotAction`] tying it together

pub mod context;
pub mod encode;
pub mod file;
pub mod types;

mod action;
mod dependencies;
mod dispatch;
mod pipeline;
mod sources;

pub use action::{OutputPin, ScreenshotAction};
pub use dependencies::{CaptureDependencies, ImageWriter, TextureLoader};
pub use dispatch::{MainThreadHandle, MainThreadQueue};
pub use encode::load_screenshot;
pub use pipeline::WriteQueue;
pub use sources::CaptureStrategy;
pub use types::{
    CaptureError, CaptureOptions, CaptureStatus, PixelBuffer, PixelData, PixelFormat, Texture,
};
