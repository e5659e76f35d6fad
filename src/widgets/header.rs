//! Header band: shade, max-speed panel, current speed and steering icon.
//!
//! # Layout
//!
//! ```text
//! +-------------------------------------------------------------+
//! | +------+                 88                         ( O )   |  <- shade fades out
//! | | 100  |                km/h                                |     over the bottom 168 px
//! | | 110  |                                                    |
//! | +------+                                                    |
//! ```
//!
//! Speed text uses `heapless::String` with `core::fmt::Write`, so no frame
//! allocates for its numbers.

use core::fmt::Write;

use glam::Vec2;
use heapless::String;

use super::RenderContext;
use super::primitives::{draw_circle_image, draw_text, fill_rect, stroke_rect};
use crate::canvas::{Canvas, Paint};
use crate::colors::{BLACK, Color, WHITE, black_alpha, status_color, white_alpha};
use crate::config::layout::{
    ICON_CENTER_Y, ICON_RADIUS, MAX_SPEED_BOTTOM_Y, MAX_SPEED_RECT, MAX_SPEED_TOP_Y, SPEED_UNIT_Y, SPEED_Y,
};
use crate::config::{BDR_S, HEADER_H};
use crate::geometry::Rect;
use crate::resources::{FontId, ImageId};
use crate::scene::{ControlMode, UnitSystem};
use crate::styles::{
    CENTER_BASELINE, MAX_APPLIED_SIZE, MAX_CRUISE_SIZE, MAX_PLACEHOLDER_BOTTOM_SIZE, MAX_PLACEHOLDER_TOP_SIZE,
    SPEED_SIZE, SPEED_UNIT_SIZE, scaled,
};
use crate::thresholds::{KPH_TO_MPH, MS_TO_KPH, MS_TO_MPH, is_cruise_speed_set};

/// Height of the shade's fade at the bottom of the header band.
const SHADE_FADE_H: f32 = 168.0;

/// Opacity of the shade at the top of the header.
const SHADE_ALPHA: f32 = 0.45;

// =============================================================================
// Mapping Rules
// =============================================================================

/// Ego speed in display units, rounded half-to-even, never negative.
pub fn speed_readout(
    v_ego: f32,
    units: UnitSystem,
) -> i32 {
    let factor = if units.is_metric() { MS_TO_KPH } else { MS_TO_MPH };
    (v_ego * factor).max(0.0).round_ties_even() as i32
}

/// `(applied, cruise)` in display units, or `None` when cruise is unset.
pub fn max_speed_values(
    control: &ControlMode,
    units: UnitSystem,
) -> Option<(i32, i32)> {
    if !is_cruise_speed_set(control.cruise_max_speed) {
        return None;
    }
    let factor = if units.is_metric() { 1.0 } else { KPH_TO_MPH };
    let convert = |kph: f32| (kph * factor + 0.5) as i32;
    Some((convert(control.apply_max_speed), convert(control.cruise_max_speed)))
}

// =============================================================================
// Drawers
// =============================================================================

/// Dark fade behind the header text.
pub fn draw_header_shade<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let band = Rect::new(0.0, 0.0, ctx.width(), HEADER_H as f32);
    let paint = Paint::LinearGradient {
        start: Vec2::new(0.0, HEADER_H as f32 - SHADE_FADE_H),
        end: Vec2::new(0.0, HEADER_H as f32),
        inner: Color::rgbaf(0.0, 0.0, 0.0, SHADE_ALPHA),
        outer: BLACK.with_alpha(0),
    };
    fill_rect(ctx.canvas, band, &paint, 0.0);
}

/// Max-speed panel: applied and cruise speed, or "MAX" / "N/A".
pub fn draw_max_speed<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let scene = ctx.scene;
    if !scene.longitudinal_control {
        return;
    }
    let rect = MAX_SPEED_RECT;
    fill_rect(ctx.canvas, rect, &Paint::Solid(black_alpha(100)), 30.0);
    stroke_rect(ctx.canvas, rect, white_alpha(100), 10.0, 20.0);

    let x = rect.center_x();
    let semibold = ctx.resources.font(FontId::SansSemibold);
    match max_speed_values(&scene.control, scene.units) {
        Some((applied, cruise)) => {
            let mut text: String<12> = String::new();
            write!(text, "{applied}").ok();
            draw_text(
                ctx.canvas,
                Vec2::new(x, MAX_SPEED_TOP_Y),
                &text,
                semibold,
                scaled(MAX_APPLIED_SIZE),
                WHITE,
                CENTER_BASELINE,
            );
            text.clear();
            write!(text, "{cruise}").ok();
            draw_text(
                ctx.canvas,
                Vec2::new(x, MAX_SPEED_BOTTOM_Y),
                &text,
                ctx.resources.font(FontId::SansBold),
                scaled(MAX_CRUISE_SIZE),
                WHITE,
                CENTER_BASELINE,
            );
        }
        None => {
            let dim = white_alpha(100);
            draw_text(
                ctx.canvas,
                Vec2::new(x, MAX_SPEED_TOP_Y),
                "MAX",
                semibold,
                scaled(MAX_PLACEHOLDER_TOP_SIZE),
                dim,
                CENTER_BASELINE,
            );
            draw_text(
                ctx.canvas,
                Vec2::new(x, MAX_SPEED_BOTTOM_Y),
                "N/A",
                semibold,
                scaled(MAX_PLACEHOLDER_BOTTOM_SIZE),
                dim,
                CENTER_BASELINE,
            );
        }
    }
}

/// Current speed and its unit, centered.
pub fn draw_speed<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let scene = ctx.scene;
    let x = (ctx.viewport.width() / 2) as f32;

    let mut text: String<12> = String::new();
    write!(text, "{}", speed_readout(scene.v_ego, scene.units)).ok();
    draw_text(
        ctx.canvas,
        Vec2::new(x, SPEED_Y),
        &text,
        ctx.resources.font(FontId::SansBold),
        scaled(SPEED_SIZE),
        WHITE,
        CENTER_BASELINE,
    );
    draw_text(
        ctx.canvas,
        Vec2::new(x, SPEED_UNIT_Y),
        scene.units.speed_label(),
        ctx.resources.font(FontId::SansRegular),
        scaled(SPEED_UNIT_SIZE),
        white_alpha(200),
        CENTER_BASELINE,
    );
}

/// Wheel icon on the engagement status color, top right.
pub fn draw_steering_icon<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let scene = ctx.scene;
    if !scene.engageable {
        return;
    }
    let center_x = ctx.viewport.width() as i32 - ICON_RADIUS - BDR_S * 2;
    draw_circle_image(
        ctx.canvas,
        center_x,
        ICON_CENTER_Y,
        ICON_RADIUS,
        ctx.resources.image(ImageId::Wheel),
        status_color(scene.status),
        1.0,
    );
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordedShape};
    use crate::colors::STATUS_ENGAGED;
    use crate::scene::SceneSnapshot;
    use crate::telemetry::UiStatus;
    use crate::widgets::testing::Fixture;

    fn text_pos(
        fixture: &Fixture,
        text: &str,
    ) -> Vec2 {
        match fixture.canvas.find_text(text) {
            Some(DrawCommand::Text { pos, .. }) => *pos,
            other => panic!("{text} drawn as {other:?}"),
        }
    }

    #[test]
    fn test_speed_readout_units() {
        assert_eq!(speed_readout(13.3, UnitSystem::Metric), 48);
        assert_eq!(speed_readout(13.3, UnitSystem::Imperial), 30);
        assert_eq!(speed_readout(-2.0, UnitSystem::Metric), 0, "reversing reads as 0");
    }

    #[test]
    fn test_max_speed_values_sentinels() {
        let mut control = ControlMode::default();
        assert_eq!(max_speed_values(&control, UnitSystem::Metric), None, "0 is unset");
        control.cruise_max_speed = 255.0;
        assert_eq!(max_speed_values(&control, UnitSystem::Metric), None, "255 is unset");

        control.cruise_max_speed = 110.0;
        control.apply_max_speed = 99.6;
        assert_eq!(max_speed_values(&control, UnitSystem::Metric), Some((100, 110)));
        assert_eq!(max_speed_values(&control, UnitSystem::Imperial), Some((62, 68)));
    }

    #[test]
    fn test_speed_and_unit_text() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        scene.v_ego = 13.3;
        fixture.draw(&scene, draw_speed);
        assert_eq!(fixture.canvas.texts(), vec!["48", "km/h"]);
        assert_eq!(text_pos(&fixture, "48"), Vec2::new(1080.0, 210.0));

        scene.units = UnitSystem::Imperial;
        fixture.draw(&scene, draw_speed);
        assert_eq!(fixture.canvas.texts(), vec!["30", "mph"]);
    }

    #[test]
    fn test_max_speed_placeholder_never_shows_sentinel() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        scene.longitudinal_control = true;
        for sentinel in [0.0, 255.0] {
            scene.control.cruise_max_speed = sentinel;
            fixture.draw(&scene, draw_max_speed);
            assert_eq!(fixture.canvas.texts(), vec!["MAX", "N/A"]);
        }
        assert_eq!(text_pos(&fixture, "MAX"), Vec2::new(152.0, 100.0));
    }

    #[test]
    fn test_max_speed_set_and_gated() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        scene.control.cruise_max_speed = 100.0;
        scene.control.apply_max_speed = 90.0;
        assert_eq!(fixture.draw(&scene, draw_max_speed).draw_call_count(), 0, "needs longitudinal control");

        scene.longitudinal_control = true;
        fixture.draw(&scene, draw_max_speed);
        assert_eq!(fixture.canvas.texts(), vec!["90", "100"]);
        assert_eq!(text_pos(&fixture, "100"), Vec2::new(152.0, 195.0));
    }

    #[test]
    fn test_steering_icon_only_when_engageable() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        assert_eq!(fixture.draw(&scene, draw_steering_icon).draw_call_count(), 0);

        scene.engageable = true;
        scene.status = UiStatus::Engaged;
        let canvas = fixture.draw(&scene, draw_steering_icon);
        let fills = canvas.fills();
        assert_eq!(fills.len(), 2);
        match fills[0] {
            (RecordedShape::Circle { center, radius }, Paint::Solid(color)) => {
                assert_eq!(*center, Vec2::new(2004.0, 141.0));
                assert!((radius - 96.0).abs() < f32::EPSILON);
                assert_eq!(*color, STATUS_ENGAGED);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_header_shade_gradient() {
        let mut fixture = Fixture::new();
        let canvas = fixture.draw(&SceneSnapshot::default(), draw_header_shade);
        let fills = canvas.fills();
        match fills.as_slice() {
            [(RecordedShape::Rect(rect), Paint::LinearGradient { start, end, .. })] => {
                assert_eq!(*rect, Rect::new(0.0, 0.0, 2160.0, 420.0));
                assert_eq!(*start, Vec2::new(0.0, 252.0));
                assert_eq!(*end, Vec2::new(0.0, 420.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
