//! Timing and window constants for the simulator.

use std::time::Duration;

/// Target frame time (~20 FPS). The main loop sleeps if the frame completes early.
pub const FRAME_TIME: Duration = Duration::from_millis(50);

/// Framebuffer pixels per window pixel along each axis.
pub const DOWNSCALE: u32 = 2;
