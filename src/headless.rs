//! Software-rendered scene used by the command-line tool and integration tests.
//!
//! Implements the capture seams without a GPU: a procedural sky, sun and
//! checkered ground seen from any [`CameraView`]. Radiance is linear; the sun
//! exceeds 1.0 so HDR captures carry values LDR output has to clip.

use std::sync::Arc;

use crate::capture::context::{
    CameraActor, CameraView, CaptureSurface, PlayerCamera, PlayerViewPoint, ProjectionMode,
    RenderContext, Rotator, SceneCaptureSettings, SceneRenderer, UiCompositor, Vec3, Viewport,
};

const SUN_RADIANCE: f32 = 12.0;
const SUN_ELEVATION: f32 = 35.0;
const SUN_RADIUS_DEGREES: f32 = 4.0;
const UI_BAR_FRACTION: f32 = 0.1;

/// Procedural scene with an optional local player.
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    width: u32,
    height: u32,
    hdr: bool,
    player: Option<PlayerViewPoint>,
}

impl HeadlessScene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            hdr: false,
            player: Some(PlayerViewPoint {
                location: Vec3::new(0.0, 0.0, 180.0),
                rotation: Rotator::new(5.0, 0.0, 0.0),
                fov_degrees: 90.0,
            }),
        }
    }

    /// Whether the viewport and off-screen captures render HDR.
    pub fn with_hdr(mut self, hdr: bool) -> Self {
        self.hdr = hdr;
        self
    }

    pub fn with_player(mut self, player: Option<PlayerViewPoint>) -> Self {
        self.player = player;
        self
    }

    /// Context exposing this scene to a screenshot action. The UI compositor
    /// is included only when `ui_overlay` is set.
    pub fn render_context(self, ui_overlay: bool) -> RenderContext {
        let scene = Arc::new(self);
        RenderContext {
            viewport: Some(scene.clone()),
            ui: ui_overlay.then(|| scene.clone() as Arc<dyn UiCompositor>),
            renderer: Some(scene.clone()),
            player: Some(scene),
        }
    }

    fn viewport_view(&self) -> CameraView {
        let view_point = self.player.unwrap_or(PlayerViewPoint {
            location: Vec3::default(),
            rotation: Rotator::default(),
            fov_degrees: 90.0,
        });
        CameraView::perspective(view_point.location, view_point.rotation, view_point.fov_degrees)
    }
}

impl Viewport for HeadlessScene {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_hdr(&self) -> bool {
        self.hdr
    }

    fn read_pixels(&self) -> Option<Vec<u8>> {
        let linear = render_linear(&self.viewport_view(), self.width, self.height);
        Some(to_display(&linear))
    }

    fn read_linear_pixels(&self) -> Option<Vec<f32>> {
        Some(render_linear(&self.viewport_view(), self.width, self.height))
    }
}

impl UiCompositor for HeadlessScene {
    fn take_screenshot(&self, viewport: &dyn Viewport) -> Option<(Vec<u8>, u32, u32)> {
        let (width, height) = viewport.size();
        let mut linear = viewport.read_linear_pixels()?;
        draw_ui_bar(&mut linear, width, height);
        Some((to_display(&linear), width, height))
    }

    fn take_hdr_screenshot(&self, viewport: &dyn Viewport) -> Option<(Vec<f32>, u32, u32)> {
        let (width, height) = viewport.size();
        let mut linear = viewport.read_linear_pixels()?;
        draw_ui_bar(&mut linear, width, height);
        Some((linear, width, height))
    }
}

impl PlayerCamera for HeadlessScene {
    fn view_point(&self) -> Option<PlayerViewPoint> {
        self.player
    }
}

impl SceneRenderer for HeadlessScene {
    fn create_capture_surface(&self, width: u32, height: u32) -> Option<Box<dyn CaptureSurface>> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Box::new(HeadlessSurface {
            width,
            height,
            hdr: self.hdr,
            view: None,
            frame: None,
        }))
    }
}

/// Off-screen target of a [`HeadlessScene`].
struct HeadlessSurface {
    width: u32,
    height: u32,
    hdr: bool,
    view: Option<CameraView>,
    frame: Option<Vec<f32>>,
}

impl CaptureSurface for HeadlessSurface {
    fn configure(&mut self, settings: &SceneCaptureSettings) {
        self.view = Some(settings.view);
    }

    fn capture_scene(&mut self) {
        self.frame = self
            .view
            .map(|view| render_linear(&view, self.width, self.height));
    }

    fn scene_hdr_enabled(&self) -> bool {
        self.hdr
    }

    fn read_pixels(&self) -> Option<Vec<u8>> {
        self.frame.as_deref().map(to_display)
    }

    fn read_linear_pixels(&self) -> Option<Vec<f32>> {
        self.frame.clone()
    }

    fn release(&mut self) {
        self.frame = None;
        self.view = None;
    }
}

/// A fixed camera placed in a [`HeadlessScene`].
#[derive(Debug, Clone, Copy)]
pub struct HeadlessCamera {
    pub view: CameraView,
}

impl CameraActor for HeadlessCamera {
    fn camera_view(&self) -> Option<CameraView> {
        Some(self.view)
    }
}

/// Linear RGBA radiance of `view`, row-major from the top-left corner.
fn render_linear(view: &CameraView, width: u32, height: u32) -> Vec<f32> {
    let mut samples = Vec::with_capacity(width as usize * height as usize * 4);
    let aspect = height as f32 / width.max(1) as f32;
    for y in 0..height {
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32 - 0.5;
            let v = 0.5 - (y as f32 + 0.5) / height as f32;
            let rgb = match view.projection {
                ProjectionMode::Perspective => {
                    let yaw = view.rotation.yaw + u * view.fov_degrees;
                    let elevation = view.rotation.pitch + v * view.fov_degrees * aspect;
                    shade_direction(view.location, yaw, elevation)
                }
                ProjectionMode::Orthographic => {
                    let extent = view.ortho_width.max(1.0);
                    ground(
                        view.location.x + u * extent,
                        view.location.y + v * extent * aspect,
                    )
                }
            };
            samples.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 1.0]);
        }
    }
    samples
}

fn shade_direction(eye: Vec3, yaw: f32, elevation: f32) -> [f32; 3] {
    if elevation >= 0.0 {
        let sun_distance =
            ((yaw.rem_euclid(360.0)).min(360.0 - yaw.rem_euclid(360.0))).hypot(elevation - SUN_ELEVATION);
        if sun_distance < SUN_RADIUS_DEGREES {
            return [SUN_RADIANCE, SUN_RADIANCE * 0.9, SUN_RADIANCE * 0.7];
        }
        let t = (elevation / 90.0).clamp(0.0, 1.0);
        return [0.55 - 0.35 * t, 0.7 - 0.3 * t, 0.95];
    }
    // Project the ray onto the ground plane at z = 0.
    let height = eye.z.max(1.0);
    let distance = height / elevation.to_radians().tan().abs().max(1e-3);
    let yaw = yaw.to_radians();
    ground(eye.x + distance * yaw.cos(), eye.y + distance * yaw.sin())
}

fn ground(x: f32, y: f32) -> [f32; 3] {
    let checker = ((x / 100.0).floor() + (y / 100.0).floor()) as i64 % 2 == 0;
    if checker {
        [0.18, 0.32, 0.12]
    } else {
        [0.30, 0.24, 0.16]
    }
}

fn draw_ui_bar(samples: &mut [f32], width: u32, height: u32) {
    let bar_rows = ((height as f32 * UI_BAR_FRACTION).ceil() as u32).min(height);
    let start = (height - bar_rows) as usize * width as usize * 4;
    for pixel in samples[start..].chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = *channel * 0.25 + 0.05;
        }
    }
}

/// Reinhard tonemap followed by sRGB encoding.
fn to_display(linear: &[f32]) -> Vec<u8> {
    linear
        .chunks_exact(4)
        .flat_map(|pixel| {
            let encode = |c: f32| {
                let mapped = c.max(0.0) / (1.0 + c.max(0.0));
                let srgb = if mapped <= 0.003_130_8 {
                    mapped * 12.92
                } else {
                    1.055 * mapped.powf(1.0 / 2.4) - 0.055
                };
                (srgb.clamp(0.0, 1.0) * 255.0).round() as u8
            };
            [encode(pixel[0]), encode(pixel[1]), encode(pixel[2]), 255]
        })
        .collect()
}
