use crate::capture::{
    context::{CameraActor, CameraView, CaptureSurface, RenderContext, SceneCaptureSettings},
    types::{CaptureError, PixelBuffer},
};

use super::unavailable;

/// Renders from the local player's point of view, sized to the viewport.
pub(super) fn capture_player_pov(
    context: &RenderContext,
    want_hdr: bool,
) -> Result<PixelBuffer, CaptureError> {
    let viewport = context
        .viewport
        .as_deref()
        .ok_or_else(|| unavailable("no game viewport"))?;
    let view_point = context
        .player
        .as_deref()
        .and_then(|player| player.view_point())
        .ok_or_else(|| unavailable("no active player camera"))?;

    let view = CameraView::perspective(
        view_point.location,
        view_point.rotation,
        view_point.fov_degrees,
    );
    let (width, height) = viewport.size();
    render_offscreen(context, view, width, height, want_hdr)
}

/// Renders from `camera`, sized to the viewport.
pub(super) fn capture_custom_camera(
    context: &RenderContext,
    camera: &dyn CameraActor,
    want_hdr: bool,
) -> Result<PixelBuffer, CaptureError> {
    let view = camera
        .camera_view()
        .ok_or_else(|| unavailable("camera actor has no camera component"))?;
    let viewport = context
        .viewport
        .as_deref()
        .ok_or_else(|| unavailable("no game viewport"))?;
    let (width, height) = viewport.size();
    render_offscreen(context, view, width, height, want_hdr)
}

fn render_offscreen(
    context: &RenderContext,
    view: CameraView,
    width: u32,
    height: u32,
    want_hdr: bool,
) -> Result<PixelBuffer, CaptureError> {
    if width == 0 || height == 0 {
        return Err(CaptureError::EmptyBuffer);
    }
    let renderer = context
        .renderer
        .as_deref()
        .ok_or_else(|| unavailable("no scene renderer"))?;
    let surface = renderer
        .create_capture_surface(width, height)
        .ok_or_else(|| unavailable("render target"))?;
    let mut surface = ScopedSurface::new(surface);

    surface.configure(&SceneCaptureSettings::single_shot(view));
    surface.capture_scene();
    log::debug!(
        "Captured {}x{} scene from {:?} (fov={})",
        width,
        height,
        view.location,
        view.fov_degrees
    );

    if want_hdr && surface.scene_hdr_enabled() {
        let samples = surface
            .read_linear_pixels()
            .ok_or(CaptureError::EmptyBuffer)?;
        PixelBuffer::hdr(width, height, samples)
    } else {
        let samples = surface.read_pixels().ok_or(CaptureError::EmptyBuffer)?;
        PixelBuffer::ldr(width, height, samples)
    }
}

/// Owns a capture surface for one capture and releases it on drop.
struct ScopedSurface(Box<dyn CaptureSurface>);

impl ScopedSurface {
    fn new(surface: Box<dyn CaptureSurface>) -> Self {
        Self(surface)
    }
}

impl std::ops::Deref for ScopedSurface {
    type Target = dyn CaptureSurface;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for ScopedSurface {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for ScopedSurface {
    fn drop(&mut self) {
        self.0.release();
        log::trace!("Released off-screen capture surface");
    }
}
