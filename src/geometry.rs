//! Camera-to-screen geometry.
//!
//! This module owns the two transforms every frame depends on:
//! - the 4x4 projection used by the video blit (camera image quad to clip space)
//! - the 2D canvas transform that maps raw camera pixel coordinates onto the
//!   viewport, so overlays line up with the video
//!
//! Both are recomputed only by [`ViewportGeometry::resize`]. Resize requests
//! from other threads go through [`PendingResize`], which the frame
//! orchestrator drains at the start of a tick so a frame never sees a torn
//! mix of old and new geometry.
//!
//! # Transform Math
//!
//! ```text
//! zoom  = ZOOM / fx            (halved for the wide camera)
//! zx    = zoom * 2 * cx / width
//! zy    = zoom * 2 * cy / height
//! frame = | zx  0   0   0                 |
//!         | 0   zy  0  -y_offset/height*2 |
//!         | 0   0   1   0                 |
//!         | 0   0   0   1                 |
//! projection = DEVICE_TRANSFORM * frame
//!
//! canvas = translate(width/2, height/2 + y_offset) * scale(zoom) * translate(-cx, -cy)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine2, Mat4, Vec2, Vec4};

use crate::config::{CameraIntrinsics, HudConfig};

// =============================================================================
// Rectangles and Vertex Lists
// =============================================================================

/// Axis-aligned rectangle in canvas units.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> Self {
        Self { x, y, w, h }
    }

    /// Horizontal center, truncated like integer layout math.
    pub fn center_x(&self) -> f32 { (self.x + self.w / 2.0).trunc() }

    pub fn right(&self) -> f32 { self.x + self.w }

    pub fn bottom(&self) -> f32 { self.y + self.h }

    pub fn contains(
        &self,
        p: Vec2,
    ) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Overlap of two rectangles (zero-sized when disjoint).
    pub fn intersect(
        &self,
        other: &Self,
    ) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Self::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }
}

/// Maximum vertices in one line polygon (two sides of a 33-point trajectory).
pub const MAX_LINE_VERTICES: usize = 66;

/// Ordered screen-space polygon produced by upstream perception mapping.
pub type VertexList = heapless::Vec<Vec2, MAX_LINE_VERTICES>;

// =============================================================================
// Viewport Geometry
// =============================================================================

/// Static device transform composed in front of the camera frame transform.
pub const DEVICE_TRANSFORM: Mat4 = Mat4::IDENTITY;

/// Viewport size plus the derived video and canvas transforms.
#[derive(Clone, Debug)]
pub struct ViewportGeometry {
    intrinsics: CameraIntrinsics,
    wide_camera: bool,
    zoom_constant: f32,
    y_offset: f32,
    width: u32,
    height: u32,
    zoom: f32,
    projection: Mat4,
    car_space: Affine2,
}

impl ViewportGeometry {
    /// Geometry for a device; unusable until the first [`resize`](Self::resize).
    pub fn new(config: &HudConfig) -> Self {
        Self {
            intrinsics: config.intrinsics(),
            wide_camera: config.wide_camera,
            zoom_constant: config.device.zoom(),
            y_offset: config.device.y_offset(),
            width: 0,
            height: 0,
            zoom: 0.0,
            projection: Mat4::IDENTITY,
            car_space: Affine2::IDENTITY,
        }
    }

    /// Recompute both transforms for a new viewport size.
    ///
    /// # Panics
    /// Zero dimensions are a caller bug.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
    ) {
        assert!(width > 0 && height > 0, "viewport resize to {width}x{height}");

        let (zoom, frame) = frame_transform(
            &self.intrinsics,
            self.wide_camera,
            self.zoom_constant,
            self.y_offset,
            width,
            height,
        );

        self.width = width;
        self.height = height;
        self.zoom = zoom;
        self.projection = DEVICE_TRANSFORM * frame;
        self.car_space = canvas_transform(&self.intrinsics, zoom, self.y_offset, width, height);

        log::info!("viewport resized to {width}x{height}, zoom {zoom:.4}");
    }

    /// Whether [`resize`](Self::resize) has run at least once.
    #[inline]
    pub const fn is_ready(&self) -> bool { self.width > 0 }

    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Viewport as a rectangle at the origin.
    pub fn bounds(&self) -> Rect { Rect::new(0.0, 0.0, self.width as f32, self.height as f32) }

    #[inline]
    pub const fn zoom(&self) -> f32 { self.zoom }

    #[inline]
    pub const fn y_offset(&self) -> f32 { self.y_offset }

    #[inline]
    pub const fn intrinsics(&self) -> &CameraIntrinsics { &self.intrinsics }

    /// Projection consumed by the video blit.
    pub fn projection(&self) -> &Mat4 {
        assert!(self.is_ready(), "projection used before the first resize");
        &self.projection
    }

    /// Canvas transform from camera pixels to viewport pixels.
    pub fn car_space_transform(&self) -> Affine2 {
        assert!(self.is_ready(), "canvas transform used before the first resize");
        self.car_space
    }

    /// Map a camera pixel coordinate to the viewport.
    pub fn camera_to_screen(
        &self,
        camera_px: Vec2,
    ) -> Vec2 {
        self.car_space_transform().transform_point2(camera_px)
    }
}

/// Video zoom and frame transform for a viewport size.
pub fn frame_transform(
    intrinsics: &CameraIntrinsics,
    wide_camera: bool,
    zoom_constant: f32,
    y_offset: f32,
    width: u32,
    height: u32,
) -> (f32, Mat4) {
    let mut zoom = zoom_constant / intrinsics.focal_x;
    if wide_camera {
        zoom *= 0.5;
    }

    let (w, h) = (width as f32, height as f32);
    let zx = zoom * 2.0 * intrinsics.principal_x / w;
    let zy = zoom * 2.0 * intrinsics.principal_y / h;

    let frame = Mat4::from_cols(
        Vec4::new(zx, 0.0, 0.0, 0.0),
        Vec4::new(0.0, zy, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, -y_offset / h * 2.0, 0.0, 1.0),
    );
    (zoom, frame)
}

/// Canvas transform putting camera pixel `(cx, cy)` at the video center.
pub fn canvas_transform(
    intrinsics: &CameraIntrinsics,
    zoom: f32,
    y_offset: f32,
    width: u32,
    height: u32,
) -> Affine2 {
    // 1) (0, 0) to the middle of the video, integer halves like the blit viewport
    let center = Vec2::new((width / 2) as f32, (height / 2) as f32 + y_offset);
    // 2) same scaling as the video, 3) (0, 0) to the top-left of the video
    let principal = Vec2::new(intrinsics.principal_x, intrinsics.principal_y);
    Affine2::from_translation(center) * Affine2::from_scale(Vec2::splat(zoom)) * Affine2::from_translation(-principal)
}

// =============================================================================
// Pending Resize (cross-thread fence)
// =============================================================================

/// Latest requested viewport size, shared between the window thread and the
/// render thread.
///
/// Width and height are packed into one atomic word, so a reader gets either
/// the previous request or the new one, never half of each. `0` means empty.
#[derive(Clone, Debug, Default)]
pub struct PendingResize {
    slot: Arc<AtomicU64>,
}

impl PendingResize {
    pub fn new() -> Self { Self::default() }

    /// Record a resize; later requests overwrite earlier ones.
    ///
    /// # Panics
    /// Zero dimensions are a caller bug.
    pub fn request(
        &self,
        width: u32,
        height: u32,
    ) {
        assert!(width > 0 && height > 0, "resize request {width}x{height}");
        let packed = (u64::from(width) << 32) | u64::from(height);
        self.slot.store(packed, Ordering::Release);
    }

    /// Take the latest request, leaving the slot empty.
    pub fn take(&self) -> Option<(u32, u32)> {
        match self.slot.swap(0, Ordering::AcqRel) {
            0 => None,
            packed => Some(((packed >> 32) as u32, packed as u32)),
        }
    }

    /// Whether a request is waiting.
    pub fn is_pending(&self) -> bool { self.slot.load(Ordering::Acquire) != 0 }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceProfile;

    const EPS: f32 = 1e-4;

    fn tici_geometry(
        width: u32,
        height: u32,
    ) -> ViewportGeometry {
        let mut geometry = ViewportGeometry::new(&HudConfig::new(DeviceProfile::Tici));
        geometry.resize(width, height);
        geometry
    }

    #[test]
    fn test_zoom_from_focal_length() {
        let geometry = tici_geometry(2160, 1080);
        assert!((geometry.zoom() - 2912.8 / 2648.0).abs() < EPS);

        let mut config = HudConfig::new(DeviceProfile::Tici);
        config.wide_camera = true;
        let mut wide = ViewportGeometry::new(&config);
        wide.resize(2160, 1080);
        assert!((wide.zoom() - 2912.8 / 567.0 * 0.5).abs() < EPS, "wide camera halves the zoom");
    }

    #[test]
    fn test_projection_scale_and_offset() {
        let geometry = tici_geometry(2160, 1080);
        let zoom = geometry.zoom();
        let m = geometry.projection();

        assert!((m.x_axis.x - zoom * 2.0 * 964.0 / 2160.0).abs() < EPS);
        assert!((m.y_axis.y - zoom * 2.0 * 604.0 / 1080.0).abs() < EPS);
        assert!((m.w_axis.y - (-150.0 / 1080.0 * 2.0)).abs() < EPS);
        assert!((m.z_axis.z - 1.0).abs() < EPS);
    }

    #[test]
    fn test_resize_idempotent() {
        let mut geometry = tici_geometry(1920, 1080);
        let once = *geometry.projection();
        let once_canvas = geometry.car_space_transform();

        geometry.resize(1920, 1080);
        assert_eq!(*geometry.projection(), once, "second identical resize changed the projection");
        assert_eq!(geometry.car_space_transform(), once_canvas);
    }

    #[test]
    fn test_resize_changes_projection() {
        let mut geometry = tici_geometry(1920, 1080);
        let before = *geometry.projection();
        geometry.resize(1280, 720);
        assert_ne!(*geometry.projection(), before);
        assert_eq!((geometry.width(), geometry.height()), (1280, 720));
    }

    #[test]
    fn test_principal_point_lands_on_video_center() {
        let geometry = tici_geometry(2160, 1080);
        let p = geometry.camera_to_screen(Vec2::new(964.0, 604.0));
        assert!((p.x - 1080.0).abs() < EPS);
        assert!((p.y - (540.0 + 150.0)).abs() < EPS);
    }

    #[test]
    fn test_canvas_matches_video_projection() {
        // Right edge of the camera image must land where the blit puts quad x = +1
        let geometry = tici_geometry(2160, 1080);
        let m = geometry.projection();
        let ndc = *m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        let blit_x = (ndc.x + 1.0) / 2.0 * 2160.0;
        let blit_y = (1.0 - ndc.y) / 2.0 * 1080.0;

        let canvas = geometry.camera_to_screen(Vec2::new(1928.0, 0.0));
        assert!((canvas.x - blit_x).abs() < 0.01, "x: canvas {} vs blit {}", canvas.x, blit_x);
        assert!((canvas.y - blit_y).abs() < 0.01, "y: canvas {} vs blit {}", canvas.y, blit_y);
    }

    #[test]
    #[should_panic(expected = "viewport resize")]
    fn test_resize_rejects_zero() {
        let mut geometry = ViewportGeometry::new(&HudConfig::default());
        geometry.resize(0, 1080);
    }

    #[test]
    #[should_panic(expected = "before the first resize")]
    fn test_projection_before_resize_panics() {
        let geometry = ViewportGeometry::new(&HudConfig::default());
        let _ = geometry.projection();
    }

    #[test]
    fn test_pending_resize_keeps_latest() {
        let pending = PendingResize::new();
        assert_eq!(pending.take(), None);

        pending.request(800, 600);
        pending.request(1024, 768);
        assert!(pending.is_pending());
        assert_eq!(pending.take(), Some((1024, 768)), "latest request wins");
        assert_eq!(pending.take(), None, "take drains the slot");
    }

    #[test]
    fn test_pending_resize_shared_between_clones() {
        let pending = PendingResize::new();
        let window_side = pending.clone();
        let handle = std::thread::spawn(move || window_side.request(3000, 2000));
        handle.join().ok();
        assert_eq!(pending.take(), Some((3000, 2000)));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(80.0, 40.0, 100.0, 100.0);
        assert_eq!(a.intersect(&b), Rect::new(80.0, 40.0, 20.0, 10.0));
        let far = Rect::new(500.0, 500.0, 1.0, 1.0);
        assert_eq!(a.intersect(&far).w, 0.0);
    }
}
