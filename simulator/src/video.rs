//! Synthetic road camera.
//!
//! Renders the same [`Road`] the perception model describes, so the painted
//! markings in the video line up with the lane-line overlays. Frames are
//! rendered at a fraction of the sensor resolution; the blit samples by
//! normalized texture coordinates, so only the aspect ratio matters.

use std::sync::Arc;

use hud_compositor::config::CameraIntrinsics;
use hud_compositor::pipeline::{PipelineError, VideoFrame, VideoSource};

use crate::perception::{CAMERA_HEIGHT, Road};

/// Sensor pixels per rendered texel along each axis.
const SENSOR_DIVISOR: u32 = 4;

/// Decoder texture slots the camera cycles through.
const BUFFER_COUNT: usize = 4;

/// Dash and gap length of the inner lane markings, m.
const DASH_LEN: f32 = 3.0;
const DASH_PERIOD: f32 = 12.0;

/// Half width of a painted marking, m.
const MARKING_HALF_W: f32 = 0.075;

const SKY_TOP: [u8; 3] = [70, 95, 140];
const SKY_HORIZON: [u8; 3] = [170, 180, 190];
const ASPHALT: [u8; 3] = [62, 62, 66];
const GRASS: [u8; 3] = [48, 82, 40];
const PAINT: [u8; 3] = [220, 220, 210];

/// Camera stream whose frames are rendered on demand.
#[derive(Debug)]
pub struct SyntheticCamera {
    connected: bool,
    frame: Option<VideoFrame>,
    next_id: u64,
}

impl SyntheticCamera {
    pub const fn new() -> Self {
        Self {
            connected: true,
            frame: None,
            next_id: 0,
        }
    }

    /// Drop or restore the stream; a reconnect starts without a frame.
    pub fn set_connected(
        &mut self,
        connected: bool,
    ) {
        if connected != self.connected {
            log::info!("camera {}", if connected { "connected" } else { "disconnected" });
            self.frame = None;
        }
        self.connected = connected;
    }

    /// Render the next frame of `road` seen after driving `odometer` meters.
    pub fn capture(
        &mut self,
        intrinsics: &CameraIntrinsics,
        road: &Road,
        odometer: f32,
    ) -> Result<(), PipelineError> {
        if !self.connected {
            return Ok(());
        }
        let data = render_road(intrinsics, road, odometer);
        let width = sensor_size(intrinsics.principal_x);
        let height = sensor_size(intrinsics.principal_y);
        let frame = VideoFrame::new(self.next_id as usize % BUFFER_COUNT, self.next_id, width, height, data)?;
        self.next_id += 1;
        self.frame = Some(frame);
        Ok(())
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self { Self::new() }
}

impl VideoSource for SyntheticCamera {
    fn is_connected(&self) -> bool { self.connected }

    fn last_frame(&self) -> Option<&VideoFrame> { self.frame.as_ref() }
}

/// Rendered texels along an axis whose principal point is `principal`.
fn sensor_size(principal: f32) -> u32 { (principal * 2.0) as u32 / SENSOR_DIVISOR }

fn mix(
    a: [u8; 3],
    b: [u8; 3],
    t: f32,
) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    core::array::from_fn(|i| (f32::from(a[i]) + (f32::from(b[i]) - f32::from(a[i])) * t) as u8)
}

/// Color of the ground at car-space `(x, y)`.
fn ground(
    road: &Road,
    x: f32,
    y: f32,
    odometer: f32,
) -> [u8; 3] {
    let rel = y - road.center_y(x);
    if rel.abs() > road.road_edge_offsets()[0] {
        return GRASS;
    }
    let dashed = (x + odometer).rem_euclid(DASH_PERIOD) < DASH_LEN;
    for (i, offset) in road.lane_line_offsets().iter().enumerate() {
        let inner = i == 1 || i == 2;
        if (rel - offset).abs() < MARKING_HALF_W && (!inner || dashed) {
            return PAINT;
        }
    }
    ASPHALT
}

/// RGB8 texels of one frame.
fn render_road(
    intrinsics: &CameraIntrinsics,
    road: &Road,
    odometer: f32,
) -> Arc<[u8]> {
    let width = sensor_size(intrinsics.principal_x);
    let height = sensor_size(intrinsics.principal_y);
    let scale = SENSOR_DIVISOR as f32;
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for ty in 0..height {
        let v = (ty as f32 + 0.5) * scale;
        let below = v - intrinsics.principal_y;
        for tx in 0..width {
            let u = (tx as f32 + 0.5) * scale;
            let rgb = if below <= 1.0 {
                mix(SKY_TOP, SKY_HORIZON, v / intrinsics.principal_y)
            } else {
                let x = intrinsics.focal_y * CAMERA_HEIGHT / below;
                let y = (intrinsics.principal_x - u) * x / intrinsics.focal_x;
                ground(road, x, y, odometer)
            };
            data.extend_from_slice(&rgb);
        }
    }
    data.into()
}
