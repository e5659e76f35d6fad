//! Bottom badge row: gap, accel profile, ACC, brake and autohold.
//!
//! Each badge owns a fixed slot centered in the footer band. A badge whose
//! mode was never reported (`None` in [`ControlMode`](crate::scene::ControlMode))
//! is skipped; a reported but unrecognised value shows [`UNKNOWN_VALUE`].

use core::fmt::Write;

use glam::Vec2;
use heapless::String;

use super::RenderContext;
use super::primitives::{draw_circle_image, draw_circle_image_state, draw_text};
use crate::canvas::{Canvas, Paint, Shape};
use crate::colors::{BADGE_BACKGROUND, BADGE_GREEN, black_alpha, white_alpha};
use crate::config::FOOTER_H;
use crate::config::layout::{
    ACC_SLOT, ACCEL_SLOT, AUTOHOLD_SLOT, BADGE_ORIGIN_X, BADGE_RADIUS, BADGE_SLOT_WIDTH, BADGE_TITLE_DY,
    BADGE_VALUE_DY, BRAKE_SLOT, GAP_SLOT,
};
use crate::resources::{FontId, ImageId};
use crate::scene::{AccelProfile, AdaptiveCruise, Autohold, GapSetting};
use crate::styles::{BADGE_GAP_NUMBER_SIZE, BADGE_TITLE_SIZE, BADGE_VALUE_SIZE, CENTER_MIDDLE, scaled};

/// Text shown for a reported value with no known label.
pub const UNKNOWN_VALUE: &str = "-";

/// Center of badge `slot` in a viewport of `height` pixels.
pub const fn badge_center(
    slot: i32,
    height: i32,
) -> (i32, i32) {
    (BADGE_ORIGIN_X + BADGE_SLOT_WIDTH * slot, height - FOOTER_H / 2)
}

/// Gap badge value text and its size in design points.
pub fn gap_value(gap: GapSetting) -> (String<12>, f32) {
    let mut text = String::new();
    match gap {
        GapSetting::Auto => {
            text.push_str("AUTO").ok();
            (text, BADGE_VALUE_SIZE)
        }
        GapSetting::Distance(n) => {
            write!(text, "{n}").ok();
            (text, BADGE_GAP_NUMBER_SIZE)
        }
    }
}

/// Accel badge text, [`UNKNOWN_VALUE`] for an unrecognised profile.
pub fn accel_value(profile: AccelProfile) -> &'static str { profile.label().unwrap_or(UNKNOWN_VALUE) }

/// ACC badge text, [`UNKNOWN_VALUE`] for an unrecognised state.
pub fn acc_value(state: AdaptiveCruise) -> &'static str { state.label().unwrap_or(UNKNOWN_VALUE) }

/// Image, background alpha and image alpha for an autohold state.
pub const fn autohold_look(state: Autohold) -> (ImageId, u8, f32) {
    let image = if matches!(state, Autohold::Warning) { ImageId::AutoholdWarning } else { ImageId::AutoholdActive };
    if state.is_engaged() { (image, (255.0 * 0.3) as u8, 1.0) } else { (image, (255.0 * 0.1) as u8, 0.15) }
}

// =============================================================================
// Drawers
// =============================================================================

/// Disc, title and value of a text badge.
fn draw_text_badge<C: Canvas>(
    ctx: &mut RenderContext<'_, C>,
    slot: i32,
    title: &str,
    value: &str,
    value_size: f32,
) {
    let (cx, cy) = badge_center(slot, ctx.viewport.height() as i32);
    let center = Vec2::new(cx as f32, cy as f32);
    ctx.canvas.fill(
        &Shape::Circle {
            center,
            radius: BADGE_RADIUS as f32,
        },
        &Paint::Solid(BADGE_BACKGROUND),
    );

    let bold = ctx.resources.font(FontId::SansBold);
    draw_text(
        ctx.canvas,
        center + Vec2::new(0.0, BADGE_TITLE_DY),
        title,
        bold,
        scaled(BADGE_TITLE_SIZE),
        white_alpha(200),
        CENTER_MIDDLE,
    );
    draw_text(
        ctx.canvas,
        center + Vec2::new(0.0, BADGE_VALUE_DY),
        value,
        bold,
        scaled(value_size),
        BADGE_GREEN,
        CENTER_MIDDLE,
    );
}

/// Following distance: "AUTO" or the gap number.
pub fn draw_gap_badge<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let Some(gap) = ctx.scene.control.gap else {
        return;
    };
    let (value, size) = gap_value(gap);
    draw_text_badge(ctx, GAP_SLOT, "GAP", &value, size);
}

pub fn draw_accel_badge<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let Some(profile) = ctx.scene.control.accel_profile else {
        return;
    };
    draw_text_badge(ctx, ACCEL_SLOT, "ACCEL", accel_value(profile), BADGE_VALUE_SIZE);
}

pub fn draw_acc_badge<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let Some(state) = ctx.scene.control.adaptive_cruise else {
        return;
    };
    draw_text_badge(ctx, ACC_SLOT, "ACC", acc_value(state), BADGE_VALUE_SIZE);
}

/// Brake disc, lit while the brake lights are on.
pub fn draw_brake_badge<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let (cx, cy) = badge_center(BRAKE_SLOT, ctx.viewport.height() as i32);
    draw_circle_image_state(
        ctx.canvas,
        cx,
        cy,
        BADGE_RADIUS,
        ctx.resources.image(ImageId::BrakeDisc),
        ctx.scene.control.brake_lights,
    );
}

/// Autohold icon; hidden when the car does not report it.
pub fn draw_autohold_badge<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let Some(state) = ctx.scene.control.autohold else {
        return;
    };
    let (image, bg_alpha, image_alpha) = autohold_look(state);
    let (cx, cy) = badge_center(AUTOHOLD_SLOT, ctx.viewport.height() as i32);
    draw_circle_image(
        ctx.canvas,
        cx,
        cy,
        BADGE_RADIUS,
        ctx.resources.image(image),
        black_alpha(bg_alpha),
        image_alpha,
    );
}

// =============================================================================
// Tests
// =============================================================================
