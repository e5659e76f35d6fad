//! Low-level drawing primitives shared across drawers.
//!
//! These are thin, stateless wrappers over the [`Canvas`] seam. Circle-image
//! rects and measurement block offsets use integer pixel math; the
//! truncations decide where things land on screen.
//!
//! # Measurement Block
//!
//! ```text
//!          value        <- y + value_px + 5            (semibold, shifted left by dx/2)
//!          label        <- y + value_px + 5 + label_px + 5   (regular)
//!                  u
//!                  n    <- unit rotated -90 deg at (x + unit_dx + value_size - 3,
//!                  i                                y + value_px/2 + 25)
//!                  t
//! ```
//!
//! The block reports `(value_size + label_size) * 2.5 + 5` as its height so
//! callers can stack blocks vertically.

use glam::Vec2;

use crate::canvas::{Align, Canvas, FontHandle, ImageHandle, Paint, Shape, TextStyle};
use crate::colors::{Color, black_alpha};
use crate::config::TEXT_SCALE;
use crate::geometry::Rect;
use crate::resources::{FontId, ResourceTable};
use crate::styles::CENTER_BASELINE;

/// Rotation of the measurement unit label (-90 degrees, as tuned).
pub const UNIT_ROTATION: f32 = -1.5708;

/// Closed polygon through `vertices`; no-op when empty.
pub fn fill_vertices(
    canvas: &mut impl Canvas,
    vertices: &[Vec2],
    paint: &Paint,
) {
    if vertices.is_empty() {
        return;
    }
    canvas.fill(&Shape::Polygon(vertices), paint);
}

/// Lead marker: a glow triangle with a solid triangle on top.
///
/// `pos` is the apex of the inner triangle; the base sits `size` below it.
pub fn draw_chevron(
    canvas: &mut impl Canvas,
    pos: Vec2,
    size: f32,
    fill: Color,
    glow: Color,
) {
    let (x, y) = (pos.x, pos.y);
    let g_xo = size / 5.0;
    let g_yo = size / 10.0;

    let glow_shape = [
        Vec2::new(x + size * 1.35 + g_xo, y + size + g_yo),
        Vec2::new(x, y - g_xo),
        Vec2::new(x - size * 1.35 - g_xo, y + size + g_yo),
    ];
    canvas.fill(&Shape::Polygon(&glow_shape), &Paint::Solid(glow));

    let body = [
        Vec2::new(x + size * 1.25, y + size),
        Vec2::new(x, y),
        Vec2::new(x - size * 1.25, y + size),
    ];
    canvas.fill(&Shape::Polygon(&body), &Paint::Solid(fill));
}

/// Image stretched over `rect`.
pub fn draw_image(
    canvas: &mut impl Canvas,
    rect: Rect,
    image: ImageHandle,
    alpha: f32,
) {
    canvas.fill(&Shape::Rect(rect), &Paint::Image { rect, image, alpha });
}

/// Filled disc with an image at 1.5x the radius on top.
pub fn draw_circle_image(
    canvas: &mut impl Canvas,
    center_x: i32,
    center_y: i32,
    radius: i32,
    image: ImageHandle,
    background: Color,
    image_alpha: f32,
) {
    canvas.fill(
        &Shape::Circle {
            center: Vec2::new(center_x as f32, center_y as f32),
            radius: radius as f32,
        },
        &Paint::Solid(background),
    );
    let img_size = (radius as f32 * 1.5) as i32;
    let rect = Rect::new(
        (center_x - img_size / 2) as f32,
        (center_y - img_size / 2) as f32,
        img_size as f32,
        img_size as f32,
    );
    draw_image(canvas, rect, image, image_alpha);
}

/// Background and image alpha of an on/off circle image.
pub const fn circle_image_alphas(active: bool) -> (f32, f32) { if active { (0.3, 1.0) } else { (0.1, 0.15) } }

/// Circle image dimmed when `active` is false.
pub fn draw_circle_image_state(
    canvas: &mut impl Canvas,
    center_x: i32,
    center_y: i32,
    radius: i32,
    image: ImageHandle,
    active: bool,
) {
    let (bg_alpha, image_alpha) = circle_image_alphas(active);
    let background = black_alpha((255.0 * bg_alpha) as u8);
    draw_circle_image(canvas, center_x, center_y, radius, image, background, image_alpha);
}

/// Fill a rectangle, rounded when `radius > 0`.
pub fn fill_rect(
    canvas: &mut impl Canvas,
    rect: Rect,
    paint: &Paint,
    radius: f32,
) {
    let shape = if radius > 0.0 { Shape::RoundedRect { rect, radius } } else { Shape::Rect(rect) };
    canvas.fill(&shape, paint);
}

/// Outline a rectangle, rounded when `radius > 0`.
pub fn stroke_rect(
    canvas: &mut impl Canvas,
    rect: Rect,
    color: Color,
    width: f32,
    radius: f32,
) {
    let shape = if radius > 0.0 { Shape::RoundedRect { rect, radius } } else { Shape::Rect(rect) };
    canvas.stroke(&shape, color, width);
}

/// Text in one face, size (viewport pixels), color and anchor.
pub fn draw_text(
    canvas: &mut impl Canvas,
    pos: Vec2,
    text: &str,
    font: FontHandle,
    size: f32,
    color: Color,
    align: Align,
) {
    canvas.text(pos, text, &TextStyle { font, size, color, align });
}

// =============================================================================
// Measurement Block
// =============================================================================

/// One value/label/unit block of the measurement panel.
#[derive(Clone, Copy, Debug)]
pub struct Measure<'a> {
    pub value: &'a str,
    /// Empty for unitless values.
    pub unit: &'a str,
    pub label: &'a str,
    pub value_color: Color,
    pub label_color: Color,
    pub unit_color: Color,
    /// Sizes in design points.
    pub value_size: i32,
    pub label_size: i32,
    pub unit_size: i32,
}

/// Draw a measurement block at `(x, y)`; returns the height it consumed.
pub fn draw_measure(
    canvas: &mut impl Canvas,
    resources: &ResourceTable,
    m: &Measure<'_>,
    x: i32,
    y: i32,
    unit_dx: i32,
) -> i32 {
    let value_px = (m.value_size as f32 * TEXT_SCALE) as i32;
    let label_px = (m.label_size as f32 * TEXT_SCALE) as i32;
    let dx = if m.unit.is_empty() { 0 } else { (m.unit_size as f32 * TEXT_SCALE / 2.0) as i32 };

    let value_y = y + value_px + 5;
    draw_text(
        canvas,
        Vec2::new((x - dx / 2) as f32, value_y as f32),
        m.value,
        resources.font(FontId::SansSemibold),
        m.value_size as f32 * TEXT_SCALE,
        m.value_color,
        CENTER_BASELINE,
    );
    draw_text(
        canvas,
        Vec2::new(x as f32, (value_y + label_px + 5) as f32),
        m.label,
        resources.font(FontId::SansRegular),
        m.label_size as f32 * TEXT_SCALE,
        m.label_color,
        CENTER_BASELINE,
    );

    if !m.unit.is_empty() {
        let rx = x + unit_dx + m.value_size - 3;
        let ry = y + (m.value_size as f32 * TEXT_SCALE / 2.0) as i32 + 25;
        canvas.save();
        canvas.translate(Vec2::new(rx as f32, ry as f32));
        canvas.rotate(UNIT_ROTATION);
        draw_text(
            canvas,
            Vec2::ZERO,
            m.unit,
            resources.font(FontId::SansRegular),
            (m.unit_size as f32 * TEXT_SCALE) as i32 as f32,
            m.unit_color,
            CENTER_BASELINE,
        );
        canvas.restore();
    }

    ((m.value_size + m.label_size) as f32 * TEXT_SCALE) as i32 + 5
}

// =============================================================================
// Tests
// =============================================================================
