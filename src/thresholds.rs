//! Centralized overlay threshold and conversion configuration.
//!
//! All thresholds are compile-time constants with validation assertions.
//! This keeps the color rules of the measurement panel, the lead chevron
//! intensity ramp and the unit conversions consistent across drawers.
//!
//! # Compile-Time Validation
//!
//! Each threshold group includes `const` assertions that verify ordering at
//! compile time. If thresholds are configured incorrectly (e.g.
//! `CRITICAL` above `WARNING` for a "lower is worse" value), compilation fails.

// =============================================================================
// Unit Conversions
// =============================================================================

/// m/s to km/h.
pub const MS_TO_KPH: f32 = 3.6;

/// m/s to mph for the ego speed readout.
pub const MS_TO_MPH: f32 = 2.236_936_3;

/// m/s to mph for the relative-speed panel block.
pub const REL_MS_TO_MPH: f32 = 2.237_414_4;

/// km/h to mph for the max-speed panel (cruise values arrive in km/h).
pub const KPH_TO_MPH: f32 = 0.621_371;

// =============================================================================
// Cruise Speed Validity
// =============================================================================

/// Cruise speed value meaning "not set".
pub const CRUISE_SPEED_UNSET: f32 = 255.0;

/// Cruise speed is displayed iff `0 < value < CRUISE_SPEED_UNSET`.
#[inline]
pub fn is_cruise_speed_set(value: f32) -> bool { value > 0.0 && value < CRUISE_SPEED_UNSET }

// =============================================================================
// Lead Chevron
// =============================================================================

/// Distance (m) at and beyond which the chevron body is fully transparent.
pub const LEAD_ALPHA_DISTANCE: f32 = 40.0;

/// Closing speed (m/s) that adds a full 255 of alpha.
pub const LEAD_ALPHA_SPEED: f32 = 10.0;

/// Chevron base size bounds before the size multiplier.
pub const CHEVRON_MIN_SIZE: f32 = 15.0;
pub const CHEVRON_MAX_SIZE: f32 = 30.0;

/// Chevron size multiplier.
pub const CHEVRON_SCALE: f32 = 2.35;

/// Minimum distance gap (m) between the two leads for the second chevron to show.
pub const SECOND_LEAD_SEPARATION: f32 = 3.0;

const _: () = assert!(CHEVRON_MIN_SIZE < CHEVRON_MAX_SIZE);

// =============================================================================
// Relative Distance Thresholds (lower is worse)
// =============================================================================

/// Below this (m), relative distance turns amber.
pub const LEAD_DISTANCE_WARNING: i32 = 30;

/// Below this (m), relative distance turns red.
pub const LEAD_DISTANCE_CRITICAL: i32 = 10;

const _: () = assert!(LEAD_DISTANCE_CRITICAL < LEAD_DISTANCE_WARNING);

// =============================================================================
// Relative Speed Thresholds (lower is worse, m/s truncated)
// =============================================================================

/// Below this, the lead is approaching (amber).
pub const REL_SPEED_WARNING: i32 = 0;

/// Below this, the lead is approaching fast (red).
pub const REL_SPEED_CRITICAL: i32 = -5;

const _: () = assert!(REL_SPEED_CRITICAL < REL_SPEED_WARNING);

// =============================================================================
// Device Temperature Thresholds (higher is worse)
// =============================================================================

/// Ambient (body) temperature warning, C.
pub const AMBIENT_TEMP_WARNING: f32 = 48.0;

/// Ambient (body) temperature critical, C.
pub const AMBIENT_TEMP_CRITICAL: f32 = 55.0;

const _: () = assert!(AMBIENT_TEMP_WARNING < AMBIENT_TEMP_CRITICAL);

/// Average CPU temperature warning, C.
pub const CPU_TEMP_WARNING: f32 = 80.0;

/// Average CPU temperature critical, C.
pub const CPU_TEMP_CRITICAL: f32 = 92.0;

const _: () = assert!(CPU_TEMP_WARNING < CPU_TEMP_CRITICAL);

/// Battery temperatures below this mean the device has no battery.
pub const BATTERYLESS_TEMP: f32 = -20.0;

/// Check whether a battery temperature reading means "no battery fitted".
#[inline]
pub fn is_batteryless(battery_temp_c: f32) -> bool { battery_temp_c < BATTERYLESS_TEMP }

// =============================================================================
// Unit Tests
// =============================================================================
