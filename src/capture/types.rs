//! Data types for screenshot capture functionality.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

use super::context::CameraActor;
use super::file;

/// Options for a single screenshot action.
///
/// Fixed once the action is created; every activation of the same action
/// reuses them.
#[derive(Clone)]
pub struct CaptureOptions {
    /// Directory the screenshot is written to.
    pub directory: PathBuf,
    /// File name without extension or directory. The extension is chosen from
    /// the captured pixel format (`png` or `exr`).
    pub filename: String,
    /// Prefix the file name with a `YYYY_MM_DD__HH_MM_SS__` timestamp.
    pub prefix_timestamp: bool,
    /// Read the on-screen viewport including its UI. Ignored when `camera` is set.
    pub show_ui: bool,
    /// Produce an EXR file when the capture source renders HDR. Falls back to
    /// PNG otherwise.
    pub with_hdr: bool,
    /// Render from this camera instead of the viewport or player.
    pub camera: Option<Arc<dyn CameraActor>>,
}

impl CaptureOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            directory: file::default_screenshot_dir(),
            filename: String::new(),
            prefix_timestamp: true,
            show_ui: false,
            with_hdr: false,
            camera: None,
        }
    }
}

impl fmt::Debug for CaptureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureOptions")
            .field("directory", &self.directory)
            .field("filename", &self.filename)
            .field("prefix_timestamp", &self.prefix_timestamp)
            .field("show_ui", &self.show_ui)
            .field("with_hdr", &self.with_hdr)
            .field("camera", &self.camera.is_some())
            .finish()
    }
}

/// Color depth of a captured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA.
    Ldr,
    /// Linear floating-point RGBA.
    Hdr,
}

impl PixelFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            PixelFormat::Ldr => "png",
            PixelFormat::Hdr => "exr",
        }
    }
}

/// Raw samples of a captured frame, four per pixel in RGBA order.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    Ldr(Vec<u8>),
    Hdr(Vec<f32>),
}

/// A captured frame on its way to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: PixelData,
}

impl PixelBuffer {
    /// Wraps 8-bit RGBA samples. Alpha is forced fully opaque.
    pub fn ldr(width: u32, height: u32, mut samples: Vec<u8>) -> Result<Self, CaptureError> {
        check_sample_count(width, height, samples.len())?;
        for pixel in samples.chunks_exact_mut(4) {
            pixel[3] = u8::MAX;
        }
        Ok(Self {
            width,
            height,
            data: PixelData::Ldr(samples),
        })
    }

    /// Wraps linear floating-point RGBA samples.
    pub fn hdr(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, CaptureError> {
        check_sample_count(width, height, samples.len())?;
        Ok(Self {
            width,
            height,
            data: PixelData::Hdr(samples),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        match self.data {
            PixelData::Ldr(_) => PixelFormat::Ldr,
            PixelData::Hdr(_) => PixelFormat::Hdr,
        }
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    pub fn into_data(self) -> PixelData {
        self.data
    }
}

fn check_sample_count(width: u32, height: u32, actual: usize) -> Result<(), CaptureError> {
    if actual == 0 {
        return Err(CaptureError::EmptyBuffer);
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| {
            CaptureError::CaptureUnavailable(format!("frame size {width}x{height} is too large"))
        })?;
    if actual != expected {
        return Err(CaptureError::BufferSizeMismatch { expected, actual });
    }
    Ok(())
}

/// A screenshot loaded back from disk.
#[derive(Debug, Clone)]
pub struct Texture {
    image: Arc<DynamicImage>,
}

impl Texture {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns `true` when the texture holds floating-point samples.
    pub fn is_hdr(&self) -> bool {
        matches!(
            *self.image,
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
        )
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Errors that can occur during screenshot capture.
///
/// None of these escape [`ScreenshotAction::activate`](super::ScreenshotAction::activate);
/// they are logged and reported through the failed signal.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Screenshot action is already running")]
    AlreadyActive,

    #[error("Filename is not valid: {0}")]
    InvalidFilename(String),

    #[error("Capture source unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Capture produced an empty pixel buffer")]
    EmptyBuffer,

    #[error("Pixel buffer has {actual} samples, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Failed to encode or write {}", .0.display())]
    EncodeOrWriteFailed(PathBuf),

    #[error("Failed to reload screenshot from {}", .0.display())]
    ReloadFailed(PathBuf),

    #[error("Failed to save screenshot: {0}")]
    SaveError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

/// Lifecycle of a screenshot action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// No capture running.
    Idle,
    /// Checking the file name.
    Validating,
    /// Reading pixels from the capture source.
    Capturing,
    /// Pixels handed to the write queue.
    Encoding,
    /// Importing the written file.
    Reloading,
    /// Success signal is about to fire.
    Completed,
    /// Failure signal is about to fire.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ldr_buffer_forces_opaque_alpha() {
        let buffer = PixelBuffer::ldr(2, 1, vec![10, 20, 30, 0, 40, 50, 60, 128]).unwrap();
        assert_eq!(buffer.format(), PixelFormat::Ldr);
        match buffer.into_data() {
            PixelData::Ldr(samples) => {
                assert_eq!(samples, vec![10, 20, 30, 255, 40, 50, 60, 255]);
            }
            other => panic!("expected LDR samples, got {other:?}"),
        }
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let err = PixelBuffer::hdr(4, 4, Vec::new()).unwrap_err();
        assert!(matches!(err, CaptureError::EmptyBuffer));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = PixelBuffer::ldr(2, 2, vec![0; 12]).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::BufferSizeMismatch {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let err = PixelBuffer::ldr(u32::MAX, u32::MAX, vec![0; 4]).unwrap_err();
        assert!(matches!(err, CaptureError::CaptureUnavailable(_)));
        let err = PixelBuffer::hdr(u32::MAX, u32::MAX, vec![0.0; 4]).unwrap_err();
        assert!(matches!(err, CaptureError::CaptureUnavailable(_)));
    }

    #[test]
    fn extension_follows_format() {
        assert_eq!(PixelFormat::Ldr.extension(), "png");
        assert_eq!(PixelFormat::Hdr.extension(), "exr");
    }

    #[test]
    fn default_options() {
        let options = CaptureOptions::new("shot");
        assert_eq!(options.filename, "shot");
        assert!(options.prefix_timestamp);
        assert!(!options.show_ui);
        assert!(!options.with_hdr);
        assert!(options.camera.is_none());
    }
}
