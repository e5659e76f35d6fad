//! 2D vector canvas seam.
//!
//! Overlay drawers talk to a [`Canvas`]: a small retained-state vector API
//! (transform stack, scissor, shape fill/stroke with solid, gradient or image
//! paint, aligned text). Two backends implement it:
//!
//! - [`RasterCanvas`]: software rasterizer writing into a shared
//!   [`Framebuffer`](crate::framebuffer::Framebuffer)
//! - [`RecordingCanvas`]: records every call, used by tests to observe drawers
//!
//! # Coordinate Space
//!
//! All coordinates are viewport pixels with the origin at the top-left, `y`
//! growing down. [`Canvas::transform`] post-multiplies the current transform
//! like a vector-graphics context does, so
//! `translate(p); rotate(a); text(0, 0)` draws rotated text anchored at `p`.

mod raster;
mod recording;

use glam::{Affine2, Vec2};

use crate::colors::Color;
use crate::geometry::Rect;

pub use raster::{ImageData, RasterCanvas};
pub use recording::{DrawCommand, RecordedShape, RecordingCanvas};

// =============================================================================
// Handles
// =============================================================================

/// Backend handle of a loaded font face.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FontHandle(pub u32);

/// Backend handle of a loaded image.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ImageHandle(pub u32);

// =============================================================================
// Text Style
// =============================================================================

/// Horizontal text anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VAlign {
    Top,
    Middle,
    #[default]
    Baseline,
    Bottom,
}

/// Combined text anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Align {
    pub h: HAlign,
    pub v: VAlign,
}

impl Align {
    pub const fn new(
        h: HAlign,
        v: VAlign,
    ) -> Self {
        Self { h, v }
    }
}

/// Font, size, color and anchor of a text draw.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TextStyle {
    pub font: FontHandle,
    /// Em size in viewport pixels.
    pub size: f32,
    pub color: Color,
    pub align: Align,
}

// =============================================================================
// Shapes and Paints
// =============================================================================

/// Circle outlines are flattened to this many segments.
pub const CIRCLE_SEGMENTS: usize = 48;

/// Each rounded corner is flattened to this many segments.
pub const CORNER_SEGMENTS: usize = 8;

/// Closed path to fill or stroke.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Shape<'a> {
    /// Closed polygon through the points in order.
    Polygon(&'a [Vec2]),
    Rect(Rect),
    RoundedRect { rect: Rect, radius: f32 },
    Circle { center: Vec2, radius: f32 },
}

impl Shape<'_> {
    /// Append the flattened outline in path order.
    pub fn flatten(
        &self,
        out: &mut Vec<Vec2>,
    ) {
        match *self {
            Self::Polygon(points) => out.extend_from_slice(points),
            Self::Rect(r) => out.extend_from_slice(&[
                Vec2::new(r.x, r.y),
                Vec2::new(r.right(), r.y),
                Vec2::new(r.right(), r.bottom()),
                Vec2::new(r.x, r.bottom()),
            ]),
            Self::RoundedRect { rect, radius } => flatten_rounded_rect(rect, radius, out),
            Self::Circle { center, radius } => {
                out.extend((0..CIRCLE_SEGMENTS).map(|i| {
                    let a = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                    center + Vec2::new(a.cos(), a.sin()) * radius
                }));
            }
        }
    }
}

fn flatten_rounded_rect(
    rect: Rect,
    radius: f32,
    out: &mut Vec<Vec2>,
) {
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    if r <= 0.0 {
        return Shape::Rect(rect).flatten(out);
    }

    // Corner centers clockwise from top-left, each with its start angle
    let corners = [
        (Vec2::new(rect.x + r, rect.y + r), std::f32::consts::PI),
        (Vec2::new(rect.right() - r, rect.y + r), std::f32::consts::PI * 1.5),
        (Vec2::new(rect.right() - r, rect.bottom() - r), 0.0),
        (Vec2::new(rect.x + r, rect.bottom() - r), std::f32::consts::FRAC_PI_2),
    ];
    for (center, start) in corners {
        for i in 0..=CORNER_SEGMENTS {
            let a = start + i as f32 / CORNER_SEGMENTS as f32 * std::f32::consts::FRAC_PI_2;
            out.push(center + Vec2::new(a.cos(), a.sin()) * r);
        }
    }
}

/// How the inside of a shape is colored.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Paint {
    Solid(Color),
    /// Linear ramp from `inner` at `start` to `outer` at `end`, clamped outside.
    LinearGradient { start: Vec2, end: Vec2, inner: Color, outer: Color },
    /// Image stretched over `rect`, modulated by `alpha`.
    Image { rect: Rect, image: ImageHandle, alpha: f32 },
}

impl Paint {
    /// Color of a linear gradient at a point in paint space.
    pub fn gradient_at(
        start: Vec2,
        end: Vec2,
        inner: Color,
        outer: Color,
        p: Vec2,
    ) -> Color {
        let axis = end - start;
        let len2 = axis.length_squared();
        if len2 <= f32::EPSILON {
            return inner;
        }
        inner.lerp(outer, (p - start).dot(axis) / len2)
    }
}

// =============================================================================
// Canvas Trait
// =============================================================================

/// Vector canvas used by all overlay drawers.
pub trait Canvas {
    /// Open a frame; resets transform, scissor and the state stack.
    fn begin_frame(
        &mut self,
        width: u32,
        height: u32,
    );

    /// Close the frame and flush any buffered output.
    fn end_frame(&mut self);

    /// Load a font face; `None` if the asset is missing.
    fn create_font(
        &mut self,
        name: &str,
        path: &str,
    ) -> Option<FontHandle>;

    /// Load an image; `None` if the asset is missing.
    fn create_image(
        &mut self,
        path: &str,
    ) -> Option<ImageHandle>;

    /// Push transform and scissor.
    fn save(&mut self);

    /// Pop transform and scissor; no-op on an empty stack.
    fn restore(&mut self);

    /// Post-multiply the current transform.
    fn transform(
        &mut self,
        t: Affine2,
    );

    fn reset_transform(&mut self);

    /// Clip subsequent drawing to `rect` (in current transform space).
    fn scissor(
        &mut self,
        rect: Rect,
    );

    fn reset_scissor(&mut self);

    fn fill(
        &mut self,
        shape: &Shape<'_>,
        paint: &Paint,
    );

    fn stroke(
        &mut self,
        shape: &Shape<'_>,
        color: Color,
        width: f32,
    );

    /// Draw a string anchored at `pos`.
    fn text(
        &mut self,
        pos: Vec2,
        text: &str,
        style: &TextStyle,
    );

    fn translate(
        &mut self,
        offset: Vec2,
    ) {
        self.transform(Affine2::from_translation(offset));
    }

    fn rotate(
        &mut self,
        radians: f32,
    ) {
        self.transform(Affine2::from_angle(radians));
    }

    fn scale(
        &mut self,
        factor: Vec2,
    ) {
        self.transform(Affine2::from_scale(factor));
    }
}

// =============================================================================
// Shared State Stack
// =============================================================================

/// Transform and scissor of a canvas.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CanvasState {
    pub transform: Affine2,
    /// Clip rectangle in viewport space.
    pub scissor: Option<Rect>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            scissor: None,
        }
    }
}

/// Save/restore stack shared by the canvas backends.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: CanvasState,
    saved: Vec<CanvasState>,
}

impl StateStack {
    pub fn reset(&mut self) {
        self.current = CanvasState::default();
        self.saved.clear();
    }

    #[inline]
    pub const fn current(&self) -> &CanvasState { &self.current }

    pub fn save(&mut self) { self.saved.push(self.current); }

    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn transform(
        &mut self,
        t: Affine2,
    ) {
        self.current.transform = self.current.transform * t;
    }

    pub fn reset_transform(&mut self) { self.current.transform = Affine2::IDENTITY; }

    /// Scissor is stored as the viewport-space bounds of the transformed rect.
    pub fn scissor(
        &mut self,
        rect: Rect,
    ) {
        let t = self.current.transform;
        let a = t.transform_point2(Vec2::new(rect.x, rect.y));
        let b = t.transform_point2(Vec2::new(rect.right(), rect.bottom()));
        let min = a.min(b);
        let max = a.max(b);
        self.current.scissor = Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y));
    }

    pub fn reset_scissor(&mut self) { self.current.scissor = None; }

    /// Depth of the save stack (for leak checks at frame end).
    pub fn depth(&self) -> usize { self.saved.len() }
}

// =============================================================================
// Tests
// =============================================================================
