//! Procedurally drawn icons registered under the HUD's image asset paths.

use hud_compositor::canvas::{ImageData, RasterCanvas};
use hud_compositor::framebuffer::Rgba;
use hud_compositor::resources::ImageId;

/// Icon edge length, pixels.
const ICON_SIZE: u32 = 128;

const CLEAR: Rgba = Rgba::new(0, 0, 0, 0);
const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
const AMBER: Rgba = Rgba::new(255, 180, 0, 255);
const GREEN: Rgba = Rgba::new(90, 220, 110, 255);

/// Polar coordinates of a pixel about the icon center, radius normalized to 1.
fn polar(
    x: u32,
    y: u32,
) -> (f32, f32) {
    let half = ICON_SIZE as f32 / 2.0;
    let dx = (x as f32 + 0.5 - half) / half;
    let dy = (y as f32 + 0.5 - half) / half;
    (dx.hypot(dy), dy.atan2(dx))
}

/// Rim, hub and three spokes.
fn wheel(
    x: u32,
    y: u32,
) -> Rgba {
    let (r, angle) = polar(x, y);
    let rim = (0.72..0.9).contains(&r);
    let hub = r < 0.22;
    let spoke = r < 0.72 && [0.0f32, 2.1, 3.6].iter().any(|a| (angle - a).sin().abs() < 0.12 && (angle - a).cos() > 0.0);
    if rim || hub || spoke { WHITE } else { CLEAR }
}

/// Disc with ventilation holes inside a caliper arc.
fn brake_disc(
    x: u32,
    y: u32,
) -> Rgba {
    let (r, angle) = polar(x, y);
    let hole = (0.45..0.6).contains(&r) && (angle * 4.0).sin() > 0.6;
    let disc = (0.25..0.72).contains(&r) && !hole;
    let caliper = (0.8..0.92).contains(&r) && angle.sin() < -0.4;
    if disc || caliper { WHITE } else { CLEAR }
}

/// Ring with an "A" made of two legs and a bar.
fn autohold(
    x: u32,
    y: u32,
    color: Rgba,
) -> Rgba {
    let (r, _) = polar(x, y);
    let half = ICON_SIZE as f32 / 2.0;
    let px = (x as f32 + 0.5 - half) / half;
    let py = (y as f32 + 0.5 - half) / half;
    let in_letter = (-0.45..0.45).contains(&py);
    let leg = in_letter && ((px.abs() - (py + 0.45) * 0.4).abs() < 0.07);
    let bar = (0.05..0.15).contains(&py) && px.abs() < 0.25;
    if (0.75..0.9).contains(&r) || leg || bar { color } else { CLEAR }
}

/// Pixels of one HUD image.
pub fn render(image: ImageId) -> ImageData {
    match image {
        ImageId::Wheel => ImageData::from_fn(ICON_SIZE, ICON_SIZE, wheel),
        ImageId::BrakeDisc => ImageData::from_fn(ICON_SIZE, ICON_SIZE, brake_disc),
        ImageId::AutoholdWarning => ImageData::from_fn(ICON_SIZE, ICON_SIZE, |x, y| autohold(x, y, AMBER)),
        ImageId::AutoholdActive => ImageData::from_fn(ICON_SIZE, ICON_SIZE, |x, y| autohold(x, y, GREEN)),
    }
}

/// Make every HUD image loadable from `canvas`.
pub fn register_images(canvas: &mut RasterCanvas) {
    for image in ImageId::ALL {
        canvas.register_image(image.asset_path(), render(image));
    }
    log::debug!("registered {} procedural images", ImageId::ALL.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_are_square_and_transparent_outside() {
        for image in ImageId::ALL {
            let data = render(image);
            assert_eq!((data.width(), data.height()), (ICON_SIZE, ICON_SIZE));
            assert!(data.sample(0.0, 0.0).a < f32::EPSILON, "{image:?} corner should be transparent");
        }
    }

    #[test]
    fn test_wheel_has_hub() {
        let data = render(ImageId::Wheel);
        assert!(data.sample(0.5, 0.5).a > 0.99);
    }
}
