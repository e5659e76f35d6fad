//! RGBA framebuffer shared by the software backends.
//!
//! The video blit writes opaque pixels into it, then the raster canvas blends
//! the overlays on top. It implements the embedded-graphics [`DrawTarget`]
//! trait so the text path (and any embedded-graphics primitive) can draw into
//! it directly, and it can be copied downsampled into any other draw target,
//! which is how the simulator window shows it.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::colors::Color;

/// Framebuffer handle shared by the pipeline and the canvas on one thread.
pub type SharedFramebuffer = Rc<RefCell<Framebuffer>>;

/// Straight RGBA8 pixel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    ) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_rgb888(self) -> Rgb888 { Rgb888::new(self.r, self.g, self.b) }
}

/// Row-major RGBA framebuffer.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::default(); width as usize * height as usize],
        }
    }

    /// Wrap in a shared handle.
    pub fn shared(
        width: u32,
        height: u32,
    ) -> SharedFramebuffer {
        Rc::new(RefCell::new(Self::new(width, height)))
    }

    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Reallocate for a new viewport size (contents are cleared).
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
    ) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgba::default(); width as usize * height as usize];
    }

    #[inline]
    fn index(
        &self,
        x: i32,
        y: i32,
    ) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Pixel at `(x, y)`, `None` outside.
    pub fn pixel(
        &self,
        x: i32,
        y: i32,
    ) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite a pixel; ignored outside.
    pub fn set(
        &mut self,
        x: i32,
        y: i32,
        value: Rgba,
    ) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = value;
        }
    }

    /// Fill everything with one color.
    pub fn fill_solid(
        &mut self,
        color: Color,
    ) {
        let value = Rgba::new(
            channel(color.r),
            channel(color.g),
            channel(color.b),
            channel(color.a),
        );
        self.pixels.fill(value);
    }

    /// Source-over blend of a straight-alpha color with extra coverage.
    pub fn blend(
        &mut self,
        x: i32,
        y: i32,
        color: Color,
        coverage: f32,
    ) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let sa = (color.a * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let dst = self.pixels[i];
        let da = f32::from(dst.a) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: f32, d: u8| {
            let d = f32::from(d) / 255.0;
            if out_a <= 0.0 { 0.0 } else { (s * sa + d * da * (1.0 - sa)) / out_a }
        };
        self.pixels[i] = Rgba::new(
            channel(mix(color.r, dst.r)),
            channel(mix(color.g, dst.g)),
            channel(mix(color.b, dst.b)),
            channel(out_a),
        );
    }

    /// Count pixels whose alpha is non-zero (test and debug helper).
    pub fn painted_pixels(&self) -> usize { self.pixels.iter().filter(|p| p.a > 0).count() }

    /// Copy into another draw target, keeping every `factor`-th pixel.
    pub fn blit_downsampled<D>(
        &self,
        target: &mut D,
        factor: u32,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let factor = factor.max(1);
        let (w, h) = (self.width / factor, self.height / factor);
        let pixels = (0..h).flat_map(|y| {
            (0..w).map(move |x| {
                let src = self.pixels[(y * factor) as usize * self.width as usize + (x * factor) as usize];
                Pixel(Point::new(x as i32, y as i32), src.to_rgb888())
            })
        });
        target.draw_iter(pixels)
    }
}

#[inline]
fn channel(value: f32) -> u8 { (value.clamp(0.0, 1.0) * 255.0).round() as u8 }

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size { Size::new(self.width, self.height) }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set(point.x, point.y, Rgba::new(color.r(), color.g(), color.b(), 255));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_blend_over_transparent_keeps_source() {
        let mut fb = Framebuffer::new(4, 4);
        fb.blend(1, 1, Color::rgba(201, 34, 49, 255), 1.0);
        assert_eq!(fb.pixel(1, 1), Some(Rgba::new(201, 34, 49, 255)));
    }

    #[test]
    fn test_half_alpha_over_opaque() {
        let mut fb = Framebuffer::new(2, 2);
        fb.fill_solid(Color::rgba(0, 0, 0, 255));
        fb.blend(0, 0, Color::rgbaf(1.0, 1.0, 1.0, 0.5), 1.0);
        let p = fb.pixel(0, 0).unwrap_or_default();
        assert_eq!(p.a, 255);
        assert!((i32::from(p.r) - 128).abs() <= 1, "got {}", p.r);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = Framebuffer::new(2, 2);
        fb.blend(-1, 0, Color::rgbaf(1.0, 1.0, 1.0, 1.0), 1.0);
        fb.set(5, 5, Rgba::new(1, 2, 3, 4));
        assert_eq!(fb.painted_pixels(), 0);
        assert_eq!(fb.pixel(2, 0), None);
    }

    #[test]
    fn test_embedded_graphics_draw_target() {
        let mut fb = Framebuffer::new(10, 10);
        Rectangle::new(Point::new(2, 2), Size::new(3, 3))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(0, 255, 0)))
            .draw(&mut fb)
            .ok();
        assert_eq!(fb.painted_pixels(), 9);
        assert_eq!(fb.pixel(3, 3), Some(Rgba::new(0, 255, 0, 255)));
    }

    #[test]
    fn test_resize_clears() {
        let mut fb = Framebuffer::new(2, 2);
        fb.fill_solid(Color::rgba(255, 0, 0, 255));
        fb.resize(3, 1);
        assert_eq!(fb.size(), Size::new(3, 1));
        assert_eq!(fb.painted_pixels(), 0);
    }
}
