//! Software raster backend.
//!
//! Every fill goes through one path: the shape is flattened to polygons in
//! viewport space, accumulated into a [`CoverageMask`] with four sub-scanlines
//! per row, nonzero winding and exact horizontal span coverage, then composited once with
//! source-over blending. Shading evaluates the paint at each pixel center
//! mapped back through the inverse transform, so gradients and image patterns
//! follow the transform in effect when they were drawn.
//!
//! Strokes are the union of one quad per outline segment. Text goes through
//! embedded-graphics: a [`GlyphSink`] collects the lit pixels of a ProFont
//! string and each pixel becomes a scaled, transformed quad in the mask.

use std::collections::HashMap;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use glam::{Affine2, Vec2};
use profont::PROFONT_24_POINT;

use super::{Canvas, FontHandle, HAlign, ImageHandle, Paint, Shape, StateStack, TextStyle, VAlign};
use crate::colors::Color;
use crate::framebuffer::{Rgba, SharedFramebuffer};
use crate::geometry::Rect;

/// Vertical samples per pixel row.
const SUBSAMPLES: usize = 4;

/// Glyph source for every face; faces differ only in stroke weight.
const GLYPH_FONT: &MonoFont = &PROFONT_24_POINT;

// =============================================================================
// Images
// =============================================================================

/// Decoded RGBA image.
#[derive(Clone, PartialEq, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl ImageData {
    /// `None` if `pixels` does not hold exactly `width * height` entries.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Rgba>,
    ) -> Option<Self> {
        (width > 0 && height > 0 && pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from a per-pixel function.
    pub fn from_fn(
        width: u32,
        height: u32,
        f: impl Fn(u32, u32) -> Rgba,
    ) -> Self {
        let pixels = (0..height).flat_map(|y| (0..width).map(move |x| (x, y))).map(|(x, y)| f(x, y)).collect();
        Self { width, height, pixels }
    }

    pub const fn width(&self) -> u32 { self.width }

    pub const fn height(&self) -> u32 { self.height }

    /// Nearest-neighbour sample at normalized `(u, v)`, clamped to the edge.
    pub fn sample(
        &self,
        u: f32,
        v: f32,
    ) -> Color {
        let x = ((u * self.width as f32) as i32).clamp(0, self.width as i32 - 1) as usize;
        let y = ((v * self.height as f32) as i32).clamp(0, self.height as i32 - 1) as usize;
        let p = self.pixels[y * self.width as usize + x];
        Color::rgba(p.r, p.g, p.b, p.a)
    }
}

// =============================================================================
// Coverage Mask
// =============================================================================

/// Per-pixel coverage over a clipped viewport region.
struct CoverageMask {
    x0: i32,
    y0: i32,
    width: usize,
    height: usize,
    clip: Rect,
    data: Vec<f32>,
    /// Edge crossings of the current sub-scanline: x and winding direction.
    crossings: Vec<(f32, i32)>,
}

impl CoverageMask {
    /// Mask covering `bounds ∩ clip`; `None` if that is empty.
    fn new(
        bounds: Rect,
        clip: Rect,
    ) -> Option<Self> {
        let area = bounds.intersect(&clip);
        if area.w <= 0.0 || area.h <= 0.0 {
            return None;
        }
        let x0 = area.x.floor() as i32;
        let y0 = area.y.floor() as i32;
        let width = (area.right().ceil() as i32 - x0) as usize;
        let height = (area.bottom().ceil() as i32 - y0) as usize;
        Some(Self {
            x0,
            y0,
            width,
            height,
            clip,
            data: vec![0.0; width * height],
            crossings: Vec::new(),
        })
    }

    /// Add the nonzero-winding interior of one closed polygon.
    fn add_polygon(
        &mut self,
        points: &[Vec2],
    ) {
        if points.len() < 3 {
            return;
        }
        let step = 1.0 / SUBSAMPLES as f32;
        let left = (self.x0 as f32).max(self.clip.x);
        let right = ((self.x0 + self.width as i32) as f32).min(self.clip.right());

        for row in 0..self.height {
            let y = self.y0 + row as i32;
            for s in 0..SUBSAMPLES {
                let sy = y as f32 + (s as f32 + 0.5) * step;
                if sy < self.clip.y || sy >= self.clip.bottom() {
                    continue;
                }

                self.crossings.clear();
                for (i, &a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    if (a.y <= sy) != (b.y <= sy) {
                        let t = (sy - a.y) / (b.y - a.y);
                        let dir = if b.y > a.y { 1 } else { -1 };
                        self.crossings.push((a.x + t * (b.x - a.x), dir));
                    }
                }
                self.crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                let base = row * self.width;
                let mut winding = 0;
                let mut start = 0.0;
                for &(x, dir) in &self.crossings {
                    let before = winding;
                    winding += dir;
                    if before == 0 {
                        start = x;
                    } else if winding == 0 {
                        let l = start.max(left);
                        let r = x.min(right);
                        if r > l {
                            accumulate_span(
                                &mut self.data[base..base + self.width],
                                l - self.x0 as f32,
                                r - self.x0 as f32,
                                step,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Blend `shade(pixel_center)` into the framebuffer by coverage.
    fn composite(
        &self,
        framebuffer: &SharedFramebuffer,
        shade: impl Fn(Vec2) -> Color,
    ) {
        let mut fb = framebuffer.borrow_mut();
        for row in 0..self.height {
            for col in 0..self.width {
                let coverage = self.data[row * self.width + col].min(1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let x = self.x0 + col as i32;
                let y = self.y0 + row as i32;
                let color = shade(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                fb.blend(x, y, color, coverage);
            }
        }
    }
}

/// Add horizontal span `[l, r)` (mask-relative) with exact pixel overlap.
fn accumulate_span(
    row: &mut [f32],
    l: f32,
    r: f32,
    weight: f32,
) {
    let first = l.floor().max(0.0) as usize;
    let last = (r.ceil() as usize).min(row.len());
    for (i, cell) in row.iter_mut().enumerate().take(last).skip(first) {
        let px = i as f32;
        let overlap = (r.min(px + 1.0) - l.max(px)).max(0.0);
        *cell += overlap * weight;
    }
}

fn bounds_of<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = *iter.next()?;
    let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
    Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
}

// =============================================================================
// Glyph Sink
// =============================================================================

/// Draw target that only records which glyph pixels are lit.
struct GlyphSink {
    lit: Vec<Point>,
}

impl Dimensions for GlyphSink {
    fn bounding_box(&self) -> Rectangle {
        // Text is laid out around the origin; allow any position
        Rectangle::new(Point::new(-(1 << 15), -(1 << 15)), Size::new(1 << 16, 1 << 16))
    }
}

impl DrawTarget for GlyphSink {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.lit.extend(pixels.into_iter().map(|Pixel(p, _)| p));
        Ok(())
    }
}

const fn text_alignment(h: HAlign) -> Alignment {
    match h {
        HAlign::Left => Alignment::Left,
        HAlign::Center => Alignment::Center,
        HAlign::Right => Alignment::Right,
    }
}

const fn text_baseline(v: VAlign) -> Baseline {
    match v {
        VAlign::Top => Baseline::Top,
        VAlign::Middle => Baseline::Middle,
        VAlign::Baseline => Baseline::Alphabetic,
        VAlign::Bottom => Baseline::Bottom,
    }
}

/// Horizontal width of one glyph pixel quad, by face weight.
fn face_weight(name: &str) -> f32 {
    if name.contains("semibold") {
        1.15
    } else if name.contains("bold") {
        1.35
    } else {
        1.0
    }
}

// =============================================================================
// Raster Canvas
// =============================================================================

/// Canvas that rasterizes into a shared framebuffer.
pub struct RasterCanvas {
    framebuffer: SharedFramebuffer,
    state: StateStack,
    faces: Vec<f32>,
    images: Vec<ImageData>,
    image_assets: HashMap<String, ImageData>,
    outline: Vec<Vec2>,
}

impl RasterCanvas {
    pub fn new(framebuffer: SharedFramebuffer) -> Self {
        Self {
            framebuffer,
            state: StateStack::default(),
            faces: Vec::new(),
            images: Vec::new(),
            image_assets: HashMap::new(),
            outline: Vec::new(),
        }
    }

    /// Make an image available to [`Canvas::create_image`] under `path`.
    pub fn register_image(
        &mut self,
        path: &str,
        image: ImageData,
    ) {
        self.image_assets.insert(path.to_owned(), image);
    }

    pub fn framebuffer(&self) -> &SharedFramebuffer { &self.framebuffer }

    /// Viewport clipped by the scissor in effect.
    fn clip_rect(&self) -> Rect {
        let fb = self.framebuffer.borrow();
        let viewport = Rect::new(0.0, 0.0, fb.width() as f32, fb.height() as f32);
        match self.state.current().scissor {
            Some(scissor) => viewport.intersect(&scissor),
            None => viewport,
        }
    }

    /// Flatten a shape into `self.outline`, in viewport space.
    fn flatten_transformed(
        &mut self,
        shape: &Shape<'_>,
    ) {
        let t = self.state.current().transform;
        self.outline.clear();
        shape.flatten(&mut self.outline);
        for p in &mut self.outline {
            *p = t.transform_point2(*p);
        }
    }

    fn shader(
        &self,
        paint: &Paint,
    ) -> impl Fn(Vec2) -> Color + '_ {
        let inverse = self.state.current().transform.inverse();
        let paint = *paint;
        move |p: Vec2| match paint {
            Paint::Solid(color) => color,
            Paint::LinearGradient { start, end, inner, outer } => {
                Paint::gradient_at(start, end, inner, outer, inverse.transform_point2(p))
            }
            Paint::Image { rect, image, alpha } => {
                let local = inverse.transform_point2(p);
                let u = (local.x - rect.x) / rect.w;
                let v = (local.y - rect.y) / rect.h;
                match self.images.get(image.0 as usize) {
                    Some(img) if (0.0..1.0).contains(&u) && (0.0..1.0).contains(&v) => {
                        let texel = img.sample(u, v);
                        texel.with_alpha_f(texel.a * alpha)
                    }
                    _ => Color::default(),
                }
            }
        }
    }
}

/// Mean linear scale of an affine transform.
fn transform_scale(t: &Affine2) -> f32 { t.matrix2.determinant().abs().sqrt() }

impl Canvas for RasterCanvas {
    fn begin_frame(
        &mut self,
        width: u32,
        height: u32,
    ) {
        self.state.reset();
        self.framebuffer.borrow_mut().resize(width, height);
    }

    fn end_frame(&mut self) {
        if self.state.depth() != 0 {
            log::warn!("canvas frame ended with {} unbalanced save(s)", self.state.depth());
        }
        self.state.reset();
    }

    fn create_font(
        &mut self,
        name: &str,
        _path: &str,
    ) -> Option<FontHandle> {
        // Glyphs are compiled in, so every face resolves
        self.faces.push(face_weight(name));
        Some(FontHandle(self.faces.len() as u32 - 1))
    }

    fn create_image(
        &mut self,
        path: &str,
    ) -> Option<ImageHandle> {
        let image = self.image_assets.get(path)?.clone();
        self.images.push(image);
        Some(ImageHandle(self.images.len() as u32 - 1))
    }

    fn save(&mut self) { self.state.save(); }

    fn restore(&mut self) { self.state.restore(); }

    fn transform(
        &mut self,
        t: Affine2,
    ) {
        self.state.transform(t);
    }

    fn reset_transform(&mut self) { self.state.reset_transform(); }

    fn scissor(
        &mut self,
        rect: Rect,
    ) {
        self.state.scissor(rect);
    }

    fn reset_scissor(&mut self) { self.state.reset_scissor(); }

    fn fill(
        &mut self,
        shape: &Shape<'_>,
        paint: &Paint,
    ) {
        self.flatten_transformed(shape);
        let Some(bounds) = bounds_of(&self.outline) else {
            return;
        };
        let Some(mut mask) = CoverageMask::new(bounds, self.clip_rect()) else {
            return;
        };
        mask.add_polygon(&self.outline);
        mask.composite(&self.framebuffer, self.shader(paint));
    }

    fn stroke(
        &mut self,
        shape: &Shape<'_>,
        color: Color,
        width: f32,
    ) {
        self.flatten_transformed(shape);
        let half = width * transform_scale(&self.state.current().transform) / 2.0;
        if self.outline.len() < 2 || half <= 0.0 {
            return;
        }
        let Some(bounds) = bounds_of(&self.outline) else {
            return;
        };
        let padded = Rect::new(bounds.x - half, bounds.y - half, bounds.w + half * 2.0, bounds.h + half * 2.0);
        let Some(mut mask) = CoverageMask::new(padded, self.clip_rect()) else {
            return;
        };

        // Paths are always closed
        for i in 0..self.outline.len() {
            let a = self.outline[i];
            let b = self.outline[(i + 1) % self.outline.len()];
            let Some(dir) = (b - a).try_normalize() else {
                continue;
            };
            // Square caps close the gaps at joints
            let (a, b) = (a - dir * half, b + dir * half);
            let n = dir.perp() * half;
            mask.add_polygon(&[a + n, b + n, b - n, a - n]);
        }
        mask.composite(&self.framebuffer, |_| color);
    }

    fn text(
        &mut self,
        pos: Vec2,
        text: &str,
        style: &TextStyle,
    ) {
        if text.is_empty() {
            return;
        }
        let weight = self.faces.get(style.font.0 as usize).copied().unwrap_or(1.0);

        let mut sink = GlyphSink { lit: Vec::new() };
        let character_style = MonoTextStyle::new(GLYPH_FONT, Rgb888::WHITE);
        let text_style = TextStyleBuilder::new()
            .alignment(text_alignment(style.align.h))
            .baseline(text_baseline(style.align.v))
            .build();
        Text::with_text_style(text, Point::zero(), character_style, text_style).draw(&mut sink).ok();
        if sink.lit.is_empty() {
            return;
        }

        let scale = style.size / GLYPH_FONT.character_size.height as f32;
        let t = self.state.current().transform * Affine2::from_translation(pos) * Affine2::from_scale(Vec2::splat(scale));

        let quads: Vec<[Vec2; 4]> = sink
            .lit
            .iter()
            .map(|p| {
                let (x, y) = (p.x as f32, p.y as f32);
                [
                    t.transform_point2(Vec2::new(x, y)),
                    t.transform_point2(Vec2::new(x + weight, y)),
                    t.transform_point2(Vec2::new(x + weight, y + 1.0)),
                    t.transform_point2(Vec2::new(x, y + 1.0)),
                ]
            })
            .collect();

        let Some(bounds) = bounds_of(quads.iter().flatten()) else {
            return;
        };
        let Some(mut mask) = CoverageMask::new(bounds, self.clip_rect()) else {
            return;
        };
        for quad in &quads {
            mask.add_polygon(quad);
        }
        let color = style.color;
        mask.composite(&self.framebuffer, |_| color);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Align;
    use crate::framebuffer::Framebuffer;

    fn canvas(
        width: u32,
        height: u32,
    ) -> RasterCanvas {
        let mut canvas = RasterCanvas::new(Framebuffer::shared(width, height));
        canvas.begin_frame(width, height);
        canvas
    }

    fn pixel(
        canvas: &RasterCanvas,
        x: i32,
        y: i32,
    ) -> Rgba {
        canvas.framebuffer().borrow().pixel(x, y).unwrap_or_default()
    }

    #[test]
    fn test_fill_rect_exact_coverage() {
        let mut c = canvas(20, 20);
        c.fill(&Shape::Rect(Rect::new(2.0, 2.0, 4.0, 3.0)), &Paint::Solid(Color::rgba(255, 0, 0, 255)));
        assert_eq!(c.framebuffer().borrow().painted_pixels(), 12);
        assert_eq!(pixel(&c, 2, 2), Rgba::new(255, 0, 0, 255));
        assert_eq!(pixel(&c, 6, 2).a, 0, "right edge is exclusive");
    }

    #[test]
    fn test_half_pixel_edge_is_antialiased() {
        let mut c = canvas(10, 10);
        c.fill(&Shape::Rect(Rect::new(0.0, 0.0, 2.5, 2.0)), &Paint::Solid(Color::rgba(255, 255, 255, 255)));
        let edge = pixel(&c, 2, 0);
        assert!((i32::from(edge.a) - 128).abs() <= 1, "edge alpha {}", edge.a);
    }

    #[test]
    fn test_scissor_clips_fill() {
        let mut c = canvas(20, 20);
        c.scissor(Rect::new(0.0, 0.0, 5.0, 20.0));
        c.fill(&Shape::Rect(Rect::new(0.0, 0.0, 20.0, 1.0)), &Paint::Solid(Color::rgba(0, 255, 0, 255)));
        assert_eq!(c.framebuffer().borrow().painted_pixels(), 5);
    }

    #[test]
    fn test_transform_moves_fill() {
        let mut c = canvas(20, 20);
        c.translate(Vec2::new(10.0, 10.0));
        c.fill(&Shape::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)), &Paint::Solid(Color::rgba(0, 0, 255, 255)));
        assert_eq!(pixel(&c, 10, 10).b, 255);
        assert_eq!(pixel(&c, 0, 0).a, 0);
    }

    #[test]
    fn test_vertical_gradient() {
        let mut c = canvas(4, 100);
        let paint = Paint::LinearGradient {
            start: Vec2::new(0.0, 100.0),
            end: Vec2::new(0.0, 0.0),
            inner: Color::rgbaf(1.0, 1.0, 1.0, 1.0),
            outer: Color::rgbaf(1.0, 1.0, 1.0, 0.0),
        };
        c.fill(&Shape::Rect(Rect::new(0.0, 0.0, 4.0, 100.0)), &paint);
        assert!(pixel(&c, 0, 95).a > 230, "bottom is opaque");
        assert!(pixel(&c, 0, 3).a < 15, "top fades out");
    }

    #[test]
    fn test_image_paint_uses_registered_asset() {
        let mut c = canvas(8, 8);
        c.register_image("img/dot.png", ImageData::from_fn(2, 2, |_, _| Rgba::new(10, 20, 30, 255)));
        assert!(c.create_image("img/missing.png").is_none());
        let image = c.create_image("img/dot.png");
        let Some(image) = image else {
            panic!("registered image did not load");
        };
        let rect = Rect::new(2.0, 2.0, 4.0, 4.0);
        c.fill(&Shape::Rect(rect), &Paint::Image { rect, image, alpha: 1.0 });
        assert_eq!(pixel(&c, 3, 3), Rgba::new(10, 20, 30, 255));
    }

    #[test]
    fn test_overlapping_outline_fills_nonzero() {
        // Square traced twice: winding 2 inside, which even-odd would leave empty
        let mut c = canvas(20, 20);
        let square = [Vec2::new(2.0, 2.0), Vec2::new(6.0, 2.0), Vec2::new(6.0, 6.0), Vec2::new(2.0, 6.0)];
        let twice: Vec<Vec2> = square.iter().chain(square.iter()).copied().collect();
        c.fill(&Shape::Polygon(&twice), &Paint::Solid(Color::rgba(255, 0, 0, 255)));
        assert_eq!(c.framebuffer().borrow().painted_pixels(), 16);
        assert_eq!(pixel(&c, 4, 4), Rgba::new(255, 0, 0, 255));
    }

    #[test]
    fn test_stroke_leaves_interior_empty() {
        let mut c = canvas(40, 40);
        c.stroke(&Shape::Rect(Rect::new(5.0, 5.0, 30.0, 30.0)), Color::rgba(255, 255, 255, 255), 2.0);
        assert!(pixel(&c, 5, 20).a > 0, "edge painted");
        assert_eq!(pixel(&c, 20, 20).a, 0, "interior untouched");
    }

    #[test]
    fn test_text_paints_pixels() {
        let mut c = canvas(200, 100);
        let face = c.create_font("sans-bold", "fonts/bold.ttf");
        let style = TextStyle {
            font: face.unwrap_or(FontHandle(0)),
            size: 40.0,
            color: Color::rgba(255, 255, 255, 255),
            align: Align::new(HAlign::Center, VAlign::Middle),
        };
        c.text(Vec2::new(100.0, 50.0), "48", &style);
        let painted = c.framebuffer().borrow().painted_pixels();
        assert!(painted > 50, "only {painted} pixels painted");
        assert_eq!(pixel(&c, 5, 5).a, 0, "text stays near its anchor");
    }
}
