//! Text anchors and type sizes shared by the overlay drawers.
//!
//! Type sizes are given in design points and multiplied by
//! [`TEXT_SCALE`](crate::config::TEXT_SCALE) when drawn, the same way the
//! layout was tuned. Keeping them as `const` next to the anchors means a
//! drawer's text call reads as "what, where, which style" with no arithmetic.

use crate::canvas::{Align, HAlign, VAlign};
use crate::config::TEXT_SCALE;

// =============================================================================
// Text Anchors (const - zero runtime cost)
// =============================================================================

/// Centered on x, sitting on the baseline. Speed and max-speed readouts, panel blocks.
pub const CENTER_BASELINE: Align = Align::new(HAlign::Center, VAlign::Baseline);

/// Centered on both axes. Badge titles and values.
pub const CENTER_MIDDLE: Align = Align::new(HAlign::Center, VAlign::Middle);

/// Left edge, vertically centered. Diagnostic line.
pub const LEFT_MIDDLE: Align = Align::new(HAlign::Left, VAlign::Middle);

// =============================================================================
// Type Sizes (design points)
// =============================================================================

/// Current speed number.
pub const SPEED_SIZE: f32 = 96.0;

/// Unit label under the speed.
pub const SPEED_UNIT_SIZE: f32 = 36.0;

/// Applied speed (top line of the max-speed panel).
pub const MAX_APPLIED_SIZE: f32 = 33.0;

/// Cruise speed (bottom line of the max-speed panel).
pub const MAX_CRUISE_SIZE: f32 = 48.0;

/// "MAX" placeholder.
pub const MAX_PLACEHOLDER_TOP_SIZE: f32 = 25.0;

/// "N/A" placeholder.
pub const MAX_PLACEHOLDER_BOTTOM_SIZE: f32 = 42.0;

/// Badge title ("GAP", "ACCEL", "ACC").
pub const BADGE_TITLE_SIZE: f32 = 22.0;

/// Badge value text.
pub const BADGE_VALUE_SIZE: f32 = 30.0;

/// Numeric gap value (larger than the word labels).
pub const BADGE_GAP_NUMBER_SIZE: f32 = 38.0;

/// Diagnostic line.
pub const DIAGNOSTIC_SIZE: f32 = 20.0;

/// Measurement panel value, label and unit.
pub const PANEL_VALUE_SIZE: f32 = 30.0;
pub const PANEL_LABEL_SIZE: f32 = 15.0;
pub const PANEL_UNIT_SIZE: f32 = 15.0;

/// Design points to viewport pixels.
#[inline]
pub const fn scaled(points: f32) -> f32 { points * TEXT_SCALE }
