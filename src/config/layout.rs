//! Overlay layout constants.
//!
//! # Pre-computed Layout Constants
//!
//! The HUD layout is anchored to the viewport edges with fixed pixel offsets
//! tuned for a 2160x1080 panel. Slot positions such as the badge row are
//! computed at compile time as `const` instead of per frame.

use crate::geometry::Rect;

// =============================================================================
// Display Configuration
// =============================================================================

/// Default framebuffer width in pixels.
pub const DEFAULT_WIDTH: u32 = 2160;

/// Default framebuffer height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Border unit used for all edge margins.
pub const BDR_S: i32 = 30;

/// Height of the shaded header band.
pub const HEADER_H: i32 = 420;

/// Height of the footer band holding the badge row.
pub const FOOTER_H: i32 = 280;

/// All font sizes are specified in points and scaled by this factor.
pub const TEXT_SCALE: f32 = 2.5;

// =============================================================================
// Header Elements
// =============================================================================

/// Baseline of the ego speed number.
pub const SPEED_Y: f32 = 210.0;

/// Baseline of the speed unit label.
pub const SPEED_UNIT_Y: f32 = 290.0;

/// Max-speed panel (top left).
pub const MAX_SPEED_RECT: Rect = Rect::new((BDR_S * 2) as f32, (BDR_S * 3 / 2) as f32, 184.0, 202.0);

/// Baseline of the applied-speed value (upper line of the max-speed panel).
pub const MAX_SPEED_TOP_Y: f32 = 100.0;

/// Baseline of the cruise-speed value (lower line of the max-speed panel).
pub const MAX_SPEED_BOTTOM_Y: f32 = 195.0;

/// Radius of the steering-engagement icon (top right).
pub const ICON_RADIUS: i32 = 96;

/// Center Y of the steering-engagement icon.
pub const ICON_CENTER_Y: i32 = ICON_RADIUS + BDR_S * 3 / 2;

// =============================================================================
// Badge Row (bottom edge)
// =============================================================================

/// Radius of every badge disc.
pub const BADGE_RADIUS: i32 = 96;

/// Horizontal distance between badge centers.
pub const BADGE_SLOT_WIDTH: i32 = BADGE_RADIUS * 2 + 60;

/// Center X of slot 0 (the slot left of the first badge).
pub const BADGE_ORIGIN_X: i32 = BADGE_RADIUS + BDR_S * 2;

/// Badge slots, left to right. Slot 0 is left free.
pub const GAP_SLOT: i32 = 1;
pub const ACCEL_SLOT: i32 = 2;
pub const ACC_SLOT: i32 = 3;
pub const BRAKE_SLOT: i32 = 4;
pub const AUTOHOLD_SLOT: i32 = 5;

/// Badge title offset above center and value offset below center.
pub const BADGE_TITLE_DY: f32 = -36.0;
pub const BADGE_VALUE_DY: f32 = 22.0;

// =============================================================================
// Measurement Panel (left side)
// =============================================================================

/// Panel left edge.
pub const PANEL_X: i32 = BDR_S * 2;

/// Panel top edge (below the max-speed panel).
pub const PANEL_Y: i32 = BDR_S * 3 / 2 + 220;

/// Panel width.
pub const PANEL_W: i32 = 180;

/// Panel outline corner radius and stroke width.
pub const PANEL_RADIUS: f32 = 20.0;
pub const PANEL_STROKE: f32 = 6.0;

/// Diagnostic text baseline distance from the bottom edge.
pub const DIAG_BOTTOM_MARGIN: i32 = 24;

// Compile-time validation: panel must start below the max-speed panel
const _: () = assert!(PANEL_Y as f32 > MAX_SPEED_RECT.y + MAX_SPEED_RECT.h);
const _: () = assert!(BADGE_SLOT_WIDTH > BADGE_RADIUS * 2);
