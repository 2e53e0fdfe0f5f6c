//! Engine-facing seams used by the capture strategies.
//!
//! The renderer, viewport, UI layer, player and camera actors belong to the
//! host application. They are handed to an action through [`RenderContext`]
//! instead of being looked up globally, so everything here can be replaced
//! by test doubles or the [`headless`](crate::headless) scene.

use std::sync::Arc;

/// World-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Orientation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Everything an off-screen capture needs to reproduce a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub location: Vec3,
    pub rotation: Rotator,
    /// Horizontal field of view in degrees.
    pub fov_degrees: f32,
    pub projection: ProjectionMode,
    /// Width of the view volume for orthographic projection; 0 for perspective.
    pub ortho_width: f32,
}

impl CameraView {
    /// A perspective view, as used for the player's point of view.
    pub fn perspective(location: Vec3, rotation: Rotator, fov_degrees: f32) -> Self {
        Self {
            location,
            rotation,
            fov_degrees,
            projection: ProjectionMode::Perspective,
            ortho_width: 0.0,
        }
    }
}

/// What the off-screen surface samples from the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSourceKind {
    /// Tonemapped final color, with HDR data preserved when the scene has it.
    FinalColorHdr,
}

/// Settings pushed to a [`CaptureSurface`] before its single render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCaptureSettings {
    pub view: CameraView,
    pub capture_every_frame: bool,
    pub capture_on_movement: bool,
    pub source: CaptureSourceKind,
}

impl SceneCaptureSettings {
    /// Single-shot capture of `view`.
    pub fn single_shot(view: CameraView) -> Self {
        Self {
            view,
            capture_every_frame: false,
            capture_on_movement: false,
            source: CaptureSourceKind::FinalColorHdr,
        }
    }
}

/// The frame currently shown on screen.
pub trait Viewport: Send + Sync {
    /// Size in pixels.
    fn size(&self) -> (u32, u32);
    /// Whether the viewport presents HDR output.
    fn is_hdr(&self) -> bool;
    /// RGBA8 samples of the last presented frame.
    fn read_pixels(&self) -> Option<Vec<u8>>;
    /// Linear RGBA32F samples of the last presented frame.
    fn read_linear_pixels(&self) -> Option<Vec<f32>>;
}

/// UI layer able to screenshot the viewport together with its widgets.
///
/// Returned sizes may differ from the viewport size (DPI scaling, widget bounds).
pub trait UiCompositor: Send + Sync {
    fn take_screenshot(&self, viewport: &dyn Viewport) -> Option<(Vec<u8>, u32, u32)>;
    fn take_hdr_screenshot(&self, viewport: &dyn Viewport) -> Option<(Vec<f32>, u32, u32)>;
}

/// Where the local player is looking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerViewPoint {
    pub location: Vec3,
    pub rotation: Rotator,
    pub fov_degrees: f32,
}

pub trait PlayerCamera: Send + Sync {
    /// `None` when no player or camera manager is active.
    fn view_point(&self) -> Option<PlayerViewPoint>;
}

/// A camera placed in the scene.
pub trait CameraActor: Send + Sync {
    /// `None` when the actor has no camera component or has left the world.
    fn camera_view(&self) -> Option<CameraView>;
}

/// Creates temporary render targets for off-screen captures.
pub trait SceneRenderer: Send + Sync {
    fn create_capture_surface(&self, width: u32, height: u32) -> Option<Box<dyn CaptureSurface>>;
}

/// A scene capture component bound to its own render target.
pub trait CaptureSurface {
    fn configure(&mut self, settings: &SceneCaptureSettings);
    /// Renders one frame synchronously.
    fn capture_scene(&mut self);
    fn scene_hdr_enabled(&self) -> bool;
    fn read_pixels(&self) -> Option<Vec<u8>>;
    fn read_linear_pixels(&self) -> Option<Vec<f32>>;
    /// Unregisters the component and frees the render target.
    fn release(&mut self);
}

/// Handles to the host application's rendering state.
///
/// Any part may be missing; strategies that need it fail with
/// [`CaptureError::CaptureUnavailable`](super::CaptureError::CaptureUnavailable).
#[derive(Clone, Default)]
pub struct RenderContext {
    pub viewport: Option<Arc<dyn Viewport>>,
    pub ui: Option<Arc<dyn UiCompositor>>,
    pub renderer: Option<Arc<dyn SceneRenderer>>,
    pub player: Option<Arc<dyn PlayerCamera>>,
}
