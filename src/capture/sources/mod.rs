use std::{fmt, sync::Arc};

use crate::capture::{
    context::{CameraActor, RenderContext},
    types::{CaptureError, CaptureOptions, PixelBuffer},
};

mod scene;
mod viewport;

/// How a frame is obtained for one activation.
#[derive(Clone)]
pub enum CaptureStrategy {
    /// Read the on-screen viewport, UI included when the compositor allows it.
    Viewport,
    /// Render the scene off-screen from the local player's point of view.
    PlayerPov,
    /// Render the scene off-screen from an explicit camera.
    CustomCamera(Arc<dyn CameraActor>),
}

impl CaptureStrategy {
    /// Picks the strategy for `options`. An explicit camera always wins.
    pub fn select(options: &CaptureOptions) -> Self {
        match (&options.camera, options.show_ui) {
            (Some(camera), _) => CaptureStrategy::CustomCamera(Arc::clone(camera)),
            (None, true) => CaptureStrategy::Viewport,
            (None, false) => CaptureStrategy::PlayerPov,
        }
    }

    /// Produces a pixel buffer. HDR samples are returned only when `want_hdr`
    /// is set and the source renders HDR.
    pub fn produce_buffer(
        &self,
        context: &RenderContext,
        want_hdr: bool,
    ) -> Result<PixelBuffer, CaptureError> {
        log::debug!("Producing pixel buffer via {:?} (hdr={})", self, want_hdr);
        match self {
            CaptureStrategy::Viewport => viewport::capture_viewport(context, want_hdr),
            CaptureStrategy::PlayerPov => scene::capture_player_pov(context, want_hdr),
            CaptureStrategy::CustomCamera(camera) => {
                scene::capture_custom_camera(context, camera.as_ref(), want_hdr)
            }
        }
    }
}

impl fmt::Debug for CaptureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStrategy::Viewport => f.write_str("Viewport"),
            CaptureStrategy::PlayerPov => f.write_str("PlayerPov"),
            CaptureStrategy::CustomCamera(_) => f.write_str("CustomCamera"),
        }
    }
}

fn unavailable(what: &str) -> CaptureError {
    CaptureError::CaptureUnavailable(what.to_string())
}
