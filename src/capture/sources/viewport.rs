use crate::capture::{
    context::RenderContext,
    types::{CaptureError, PixelBuffer},
};

use super::unavailable;

/// Reads the frame currently on screen.
///
/// Goes through the UI compositor when one is registered so widgets end up in
/// the image; otherwise reads the viewport's own pixels.
pub(super) fn capture_viewport(
    context: &RenderContext,
    want_hdr: bool,
) -> Result<PixelBuffer, CaptureError> {
    let viewport = context
        .viewport
        .as_deref()
        .ok_or_else(|| unavailable("no game viewport"))?;
    let (width, height) = viewport.size();

    if want_hdr && viewport.is_hdr() {
        let (samples, width, height) = match context.ui.as_deref() {
            Some(ui) => ui
                .take_hdr_screenshot(viewport)
                .ok_or_else(|| unavailable("UI layer refused HDR screenshot"))?,
            None => (
                viewport
                    .read_linear_pixels()
                    .ok_or_else(|| unavailable("viewport linear pixels"))?,
                width,
                height,
            ),
        };
        log::debug!("Read {}x{} HDR viewport pixels", width, height);
        return PixelBuffer::hdr(width, height, samples);
    }

    let (samples, width, height) = match context.ui.as_deref() {
        Some(ui) => ui
            .take_screenshot(viewport)
            .ok_or_else(|| unavailable("UI layer refused screenshot"))?,
        None => (
            viewport
                .read_pixels()
                .ok_or_else(|| unavailable("viewport pixels"))?,
            width,
            height,
        ),
    };
    log::debug!("Read {}x{} viewport pixels", width, height);
    PixelBuffer::ldr(width, height, samples)
}
