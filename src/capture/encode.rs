//! PNG/EXR encoding of captured frames and loading them back.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::codecs::openexr::OpenExrEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, Rgba};

use super::types::{CaptureError, PixelBuffer, PixelData, Texture};

/// Encode `buffer` and write it to `path`, replacing any existing file.
///
/// LDR buffers become PNG (best compression), HDR buffers become OpenEXR. The
/// encoding follows the buffer, not the extension of `path`.
pub fn write_screenshot(buffer: PixelBuffer, path: &Path) -> Result<(), CaptureError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        log::info!("Creating screenshot directory: {}", parent.display());
        fs::create_dir_all(parent)?;
    }

    let (width, height) = (buffer.width(), buffer.height());
    let format = buffer.format();
    let writer = BufWriter::new(File::create(path)?);

    match buffer.into_data() {
        PixelData::Ldr(samples) => {
            let image: ImageBuffer<Rgba<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, samples)
                    .ok_or_else(|| CaptureError::ImageError("LDR buffer too small".into()))?;
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
            image
                .write_with_encoder(encoder)
                .map_err(|e| CaptureError::ImageError(format!("PNG encoding failed: {e}")))?;
        }
        PixelData::Hdr(samples) => {
            let image: ImageBuffer<Rgba<f32>, Vec<f32>> =
                ImageBuffer::from_raw(width, height, samples)
                    .ok_or_else(|| CaptureError::ImageError("HDR buffer too small".into()))?;
            image
                .write_with_encoder(OpenExrEncoder::new(writer))
                .map_err(|e| CaptureError::ImageError(format!("EXR encoding failed: {e}")))?;
        }
    }

    let written_size = fs::metadata(path)?.len();
    log::debug!(
        "Wrote {:?} screenshot {}x{} to {} ({} bytes)",
        format,
        width,
        height,
        path.display(),
        written_size
    );
    Ok(())
}

/// Load an image file as a texture. Returns `None` if the file is missing or
/// cannot be decoded.
pub fn load_screenshot(path: impl AsRef<Path>) -> Option<Texture> {
    let path = path.as_ref();
    match image::open(path) {
        Ok(image) => {
            log::debug!(
                "Loaded screenshot {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            Some(Texture::new(image))
        }
        Err(e) => {
            log::warn!("Failed to load screenshot {}: {}", path.display(), e);
            None
        }
    }
}
