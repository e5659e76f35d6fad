//! Synthetic road model and its projection into screen-space polygons.
//!
//! The road lives in car space (x forward, y left, meters). Points on the
//! ground plane go through a pinhole camera mounted [`CAMERA_HEIGHT`] above
//! the road, then through the compositor's camera-to-screen transform, the
//! same path the model outputs take on the car.

use glam::Vec2;
use hud_compositor::config::CameraIntrinsics;
use hud_compositor::geometry::{MAX_LINE_VERTICES, VertexList, ViewportGeometry};
use hud_compositor::telemetry::{LANE_LINE_COUNT, ROAD_EDGE_COUNT};

/// Camera height above the road, m.
pub const CAMERA_HEIGHT: f32 = 1.22;

/// Nearest and farthest sampled distance, m.
pub const NEAR_X: f32 = 6.0;
pub const FAR_X: f32 = 80.0;

/// Samples per polygon side; two sides fill a vertex list.
const SIDE_SAMPLES: usize = MAX_LINE_VERTICES / 2;

/// Half width of a painted lane line, m.
const LANE_LINE_HALF_W: f32 = 0.05;

/// Half width of a road edge line, m.
const ROAD_EDGE_HALF_W: f32 = 0.025;

/// Half width of the predicted path, m.
const TRACK_HALF_W: f32 = 0.9;

/// Road edge distance beyond the outer lane lines, m.
const SHOULDER_W: f32 = 0.6;

/// Parabolic road ahead of the car.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Road {
    /// Path curvature, 1/m (positive bends left).
    pub curvature: f32,
    /// Lateral offset of the lane center from the car, m.
    pub lateral_offset: f32,
    pub lane_width: f32,
}

impl Default for Road {
    fn default() -> Self {
        Self {
            curvature: 0.0,
            lateral_offset: 0.0,
            lane_width: 3.6,
        }
    }
}

impl Road {
    /// Lane center at distance `x`.
    pub fn center_y(
        &self,
        x: f32,
    ) -> f32 {
        (0.5 * self.curvature * x).mul_add(x, self.lateral_offset)
    }

    /// Lateral offsets of the four lane lines, leftmost first.
    pub fn lane_line_offsets(&self) -> [f32; LANE_LINE_COUNT] {
        let w = self.lane_width;
        [1.5 * w, 0.5 * w, -0.5 * w, -1.5 * w]
    }

    /// Lateral offsets of the two road edges, left first.
    pub fn road_edge_offsets(&self) -> [f32; ROAD_EDGE_COUNT] {
        let edge = 1.5f32.mul_add(self.lane_width, SHOULDER_W);
        [edge, -edge]
    }
}

/// Project a ground point to camera pixels; `None` behind the camera.
pub fn project_ground(
    intrinsics: &CameraIntrinsics,
    x: f32,
    y: f32,
) -> Option<Vec2> {
    (x > 0.1).then(|| {
        Vec2::new(
            intrinsics.focal_x.mul_add(-y / x, intrinsics.principal_x),
            intrinsics.focal_y.mul_add(CAMERA_HEIGHT / x, intrinsics.principal_y),
        )
    })
}

/// Sample distance `i` of `SIDE_SAMPLES`, denser close to the car.
fn sample_x(
    i: usize,
    far: f32,
) -> f32 {
    let t = i as f32 / (SIDE_SAMPLES - 1) as f32;
    NEAR_X * (far / NEAR_X).powf(t)
}

/// Closed ribbon polygon around the curve `center_y(x) + offset`.
///
/// The left side runs near to far, the right side far to near, so the list
/// is a simple polygon. Samples beyond `far` are not emitted.
pub fn ribbon(
    geometry: &ViewportGeometry,
    road: &Road,
    offset: f32,
    half_width: f32,
    far: f32,
) -> VertexList {
    let intrinsics = geometry.intrinsics();
    let far = far.clamp(NEAR_X + 1.0, FAR_X);
    let mut vertices = VertexList::new();
    let side = |i: usize, dy: f32| {
        let x = sample_x(i, far);
        project_ground(intrinsics, x, road.center_y(x) + offset + dy).map(|p| geometry.camera_to_screen(p))
    };
    for i in 0..SIDE_SAMPLES {
        if let Some(p) = side(i, half_width) {
            vertices.push(p).ok();
        }
    }
    for i in (0..SIDE_SAMPLES).rev() {
        if let Some(p) = side(i, -half_width) {
            vertices.push(p).ok();
        }
    }
    vertices
}

pub fn lane_lines(
    geometry: &ViewportGeometry,
    road: &Road,
) -> [VertexList; LANE_LINE_COUNT] {
    let offsets = road.lane_line_offsets();
    core::array::from_fn(|i| ribbon(geometry, road, offsets[i], LANE_LINE_HALF_W, FAR_X))
}

pub fn road_edges(
    geometry: &ViewportGeometry,
    road: &Road,
) -> [VertexList; ROAD_EDGE_COUNT] {
    let offsets = road.road_edge_offsets();
    core::array::from_fn(|i| ribbon(geometry, road, offsets[i], ROAD_EDGE_HALF_W, FAR_X))
}

/// Predicted path, cut short at the lead when there is one.
pub fn track(
    geometry: &ViewportGeometry,
    road: &Road,
    lead_distance: Option<f32>,
) -> VertexList {
    ribbon(geometry, road, 0.0, TRACK_HALF_W, lead_distance.unwrap_or(FAR_X))
}

/// Screen position of a lead's ground contact point in the ego lane.
pub fn lead_vertex(
    geometry: &ViewportGeometry,
    road: &Road,
    distance: f32,
) -> Vec2 {
    project_ground(geometry.intrinsics(), distance, road.center_y(distance))
        .map_or(Vec2::ZERO, |p| geometry.camera_to_screen(p))
}

#[cfg(test)]
mod tests {
    use hud_compositor::config::HudConfig;

    use super::*;

    fn geometry() -> ViewportGeometry {
        let mut geometry = ViewportGeometry::new(&HudConfig::default());
        geometry.resize(2160, 1080);
        geometry
    }

    #[test]
    fn test_horizon_at_principal_point() {
        let geometry = geometry();
        let intrinsics = *geometry.intrinsics();
        let far = project_ground(&intrinsics, 1.0e6, 0.0).unwrap();
        assert!((far.y - intrinsics.principal_y).abs() < 0.01, "far ground converges on the horizon");
        assert!(project_ground(&intrinsics, -1.0, 0.0).is_none());
    }

    #[test]
    fn test_ribbon_fills_vertex_list() {
        let geometry = geometry();
        let line = ribbon(&geometry, &Road::default(), 1.8, 0.05, FAR_X);
        assert_eq!(line.len(), MAX_LINE_VERTICES);
        assert!(line[0].y > line[SIDE_SAMPLES - 1].y, "left side runs away from the car");
    }

    #[test]
    fn test_left_lines_land_left_of_right_lines() {
        let geometry = geometry();
        let lines = lane_lines(&geometry, &Road::default());
        assert!(lines[1][0].x < lines[2][0].x);
        assert!(lines[0][0].x < lines[1][0].x);
    }

    #[test]
    fn test_lead_vertex_rises_with_distance() {
        let geometry = geometry();
        let road = Road::default();
        let near = lead_vertex(&geometry, &road, 10.0);
        let far = lead_vertex(&geometry, &road, 40.0);
        assert!(far.y < near.y, "farther leads sit higher on screen");
        assert!((near.x - far.x).abs() < 0.5, "straight road keeps leads centered");
    }
}
