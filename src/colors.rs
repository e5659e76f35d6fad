//! Color constants for the HUD overlays.
//!
//! # Float Channels
//!
//! Unlike the fixed-palette dashboard colors of a panel display, HUD colors carry
//! live alpha values derived from telemetry (lane-line probability, road-edge
//! confidence, lead proximity). [`Color`] therefore stores straight (not
//! premultiplied) RGBA as `f32` in `0.0..=1.0`, and the byte constructors mirror
//! the 8-bit values the overlays were tuned with.
//!
//! Conversion to [`Rgb888`] happens only at the raster backend boundary.

use embedded_graphics::pixelcolor::Rgb888;

use crate::telemetry::UiStatus;

// =============================================================================
// Color Type
// =============================================================================

/// Straight-alpha RGBA color with float channels.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Build a color from 8-bit channels.
    pub const fn rgba(
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    ) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Build a color from float channels in `0.0..=1.0`.
    pub const fn rgbaf(
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with an 8-bit alpha.
    pub const fn with_alpha(
        self,
        a: u8,
    ) -> Self {
        Self { a: a as f32 / 255.0, ..self }
    }

    /// Same color with a float alpha clamped into `0.0..=1.0`.
    pub fn with_alpha_f(
        self,
        a: f32,
    ) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Alpha quantized to a byte.
    pub fn alpha_u8(&self) -> u8 { channel_u8(self.a) }

    /// Linear interpolation between two colors, `t` clamped to `0.0..=1.0`.
    pub fn lerp(
        self,
        other: Self,
        t: f32,
    ) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Opaque RGB part for embedded-graphics targets.
    pub fn to_rgb888(&self) -> Rgb888 {
        Rgb888::new(channel_u8(self.r), channel_u8(self.g), channel_u8(self.b))
    }
}

#[inline]
fn channel_u8(value: f32) -> u8 { (value.clamp(0.0, 1.0) * 255.0).round() as u8 }

// =============================================================================
// Standard Colors
// =============================================================================

/// Pure white. Speed readout and lane lines.
pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

/// Pure black.
pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

/// HUD red (201, 34, 49). Lead chevron body and end-to-end path.
pub const RED: Color = Color::rgba(201, 34, 49, 255);

/// HUD yellow (218, 202, 37). Lead chevron glow.
pub const YELLOW: Color = Color::rgba(218, 202, 37, 255);

/// White with an 8-bit alpha.
pub const fn white_alpha(a: u8) -> Color { WHITE.with_alpha(a) }

/// Black with an 8-bit alpha.
pub const fn black_alpha(a: u8) -> Color { BLACK.with_alpha(a) }

/// HUD red with an 8-bit alpha.
pub const fn red_alpha(a: u8) -> Color { RED.with_alpha(a) }

// =============================================================================
// Readout Colors (measurement panel, badges)
// =============================================================================

/// Neutral value/label color on the measurement panel.
pub const VALUE_WHITE: Color = Color::rgba(255, 255, 255, 200);

/// Warning tier (approaching threshold).
pub const WARNING_AMBER: Color = Color::rgba(255, 188, 3, 200);

/// Critical tier.
pub const CRITICAL_RED: Color = Color::rgba(255, 0, 0, 200);

/// Badge value text (gap, accel profile, ACC state).
pub const BADGE_GREEN: Color = Color::rgba(120, 255, 120, 200);

/// Nearly transparent badge disc background.
pub const BADGE_BACKGROUND: Color = Color::rgba(0, 0, 0, 1);

/// Measurement panel outline.
pub const PANEL_FRAME: Color = Color::rgba(255, 255, 255, 80);

/// Viewport clear color behind the video.
pub const CLEAR: Color = Color::rgba(0, 0, 0, 0);

// =============================================================================
// Status Colors
// =============================================================================

pub const STATUS_DISENGAGED: Color = Color::rgba(0x17, 0x33, 0x49, 0xc8);
pub const STATUS_OVERRIDE: Color = Color::rgba(0x91, 0x9b, 0x95, 0xf1);
pub const STATUS_ENGAGED: Color = Color::rgba(0x17, 0x86, 0x44, 0xf1);
pub const STATUS_WARNING: Color = Color::rgba(0xda, 0x6f, 0x25, 0xf1);
pub const STATUS_ALERT: Color = Color::rgba(0xc9, 0x22, 0x31, 0xf1);

/// Background tint for the steering-engagement icon.
pub const fn status_color(status: UiStatus) -> Color {
    match status {
        UiStatus::Disengaged => STATUS_DISENGAGED,
        UiStatus::Override => STATUS_OVERRIDE,
        UiStatus::Engaged => STATUS_ENGAGED,
        UiStatus::Warning => STATUS_WARNING,
        UiStatus::Alert => STATUS_ALERT,
    }
}

// =============================================================================
// Tests
// =============================================================================
