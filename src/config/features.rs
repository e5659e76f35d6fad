//! Optional measurement panel blocks.
//!
//! Defaults come from cargo features so a build can drop blocks that make no
//! sense on a device (e.g. no battery). The runtime struct lets tests and the
//! simulator toggle them without rebuilding.

/// Which optional blocks the left measurement panel shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct HudFeatures {
    pub battery_level: bool,
    pub ambient_temp: bool,
    pub cpu_temp: bool,
}

impl HudFeatures {
    /// Blocks enabled by cargo features.
    pub const FROM_CARGO: Self = Self {
        battery_level: cfg!(feature = "battery-level"),
        ambient_temp: cfg!(feature = "ambient-temp"),
        cpu_temp: cfg!(feature = "cpu-temp"),
    };

    /// Every optional block on.
    pub const ALL: Self = Self {
        battery_level: true,
        ambient_temp: true,
        cpu_temp: true,
    };

    /// Only the always-present lead blocks.
    pub const NONE: Self = Self {
        battery_level: false,
        ambient_temp: false,
        cpu_temp: false,
    };
}

impl Default for HudFeatures {
    fn default() -> Self { Self::FROM_CARGO }
}
