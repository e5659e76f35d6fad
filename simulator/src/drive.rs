//! Synthetic drive: slowly varying signals published as telemetry records.

use hud_compositor::geometry::ViewportGeometry;
use hud_compositor::telemetry::{
    AlertSize, CarState, ControlsState, DeviceState, LeadData, LiveParameters, LANE_LINE_COUNT, RadarState, Record,
    ROAD_EDGE_COUNT, SceneGeometry, UiState, UiStatus,
};

use crate::perception::{self, Road};

/// Lead distance below which the status turns to warning, m.
const WARNING_DISTANCE: f32 = 8.0;

/// Cruise set speed while longitudinal control is on, km/h.
const CRUISE_SET_SPEED: f32 = 110.0;

/// Key-toggled switches of the simulated car.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct DriveToggles {
    pub metric: bool,
    pub end_to_end: bool,
    pub alert: bool,
    pub longitudinal: bool,
    pub started: bool,
    /// Model outputs arrive in time.
    pub model_fresh: bool,
}

impl Default for DriveToggles {
    fn default() -> Self {
        Self {
            metric: true,
            end_to_end: false,
            alert: false,
            longitudinal: true,
            started: true,
            model_fresh: true,
        }
    }
}

/// Sine wave between `min` and `max`.
pub fn fake_signal(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

/// Time derivative of [`fake_signal`].
fn fake_signal_rate(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    0.5 * (max - min) * freq * (t * freq).cos()
}

/// Simulated car and road state.
#[derive(Clone, Debug, Default)]
pub struct Drive {
    t: f32,
    odometer: f32,
    road: Road,
}

impl Drive {
    pub fn new() -> Self { Self::default() }

    pub const fn road(&self) -> &Road { &self.road }

    /// Meters driven so far.
    pub const fn odometer(&self) -> f32 { self.odometer }

    /// Advance the simulation by `dt` seconds.
    pub fn step(
        &mut self,
        dt: f32,
    ) {
        self.t += dt;
        self.odometer += self.v_ego() * dt;
        self.road.curvature = fake_signal(self.t, -0.004, 0.004, 0.09);
        self.road.lateral_offset = fake_signal(self.t, -0.3, 0.3, 0.21);
    }

    /// Ego speed, m/s.
    pub fn v_ego(&self) -> f32 { fake_signal(self.t, 4.0, 32.0, 0.05) }

    fn lead_one(&self) -> LeadData {
        let t = self.t;
        let d_rel = fake_signal(t, 3.0, 70.0, 0.07);
        LeadData {
            status: d_rel < 60.0,
            d_rel,
            v_rel: fake_signal_rate(t, 3.0, 70.0, 0.07),
        }
    }

    fn lead_two(
        &self,
        lead_one: &LeadData,
    ) -> LeadData {
        let t = self.t;
        LeadData {
            status: lead_one.status && (t % 30.0) > 15.0,
            d_rel: lead_one.d_rel + fake_signal(t, 2.0, 25.0, 0.13),
            v_rel: lead_one.v_rel,
        }
    }

    /// One consistent update of every channel.
    pub fn records(
        &self,
        toggles: &DriveToggles,
        geometry: &ViewportGeometry,
    ) -> [Record; 7] {
        let lead_one = self.lead_one();
        let lead_two = self.lead_two(&lead_one);
        [
            Record::ControlsState(self.controls_state(toggles, &lead_one)),
            Record::CarState(self.car_state(&lead_one)),
            Record::RadarState(RadarState { lead_one, lead_two }),
            Record::DeviceState(self.device_state()),
            Record::LiveParameters(LiveParameters {
                angle_offset_deg: fake_signal(self.t, -0.5, 0.5, 0.02),
                angle_offset_average_deg: fake_signal(self.t, -0.2, 0.2, 0.01),
            }),
            Record::UiState(UiState {
                started: toggles.started,
                is_metric: toggles.metric,
                end_to_end: toggles.end_to_end,
                world_objects_visible: toggles.model_fresh,
                longitudinal_control: toggles.longitudinal,
                status: self.status(toggles, &lead_one),
            }),
            Record::SceneGeometry(self.scene_geometry(geometry, [&lead_one, &lead_two])),
        ]
    }

    fn status(
        &self,
        toggles: &DriveToggles,
        lead_one: &LeadData,
    ) -> UiStatus {
        if toggles.alert {
            UiStatus::Alert
        } else if lead_one.status && lead_one.d_rel < WARNING_DISTANCE {
            UiStatus::Warning
        } else if toggles.longitudinal {
            UiStatus::Engaged
        } else {
            UiStatus::Disengaged
        }
    }

    fn controls_state(
        &self,
        toggles: &DriveToggles,
        lead_one: &LeadData,
    ) -> ControlsState {
        let t = self.t;
        let (cruise, apply) = if toggles.longitudinal {
            let lead_limit = if lead_one.status { fake_signal(t, 0.0, 25.0, 0.07) } else { 0.0 };
            (CRUISE_SET_SPEED, CRUISE_SET_SPEED - lead_limit)
        } else {
            (255.0, 255.0)
        };
        ControlsState {
            cruise_max_speed: cruise,
            apply_max_speed: apply,
            engageable: true,
            alert_size: if toggles.alert { AlertSize::Mid } else { AlertSize::None },
            distance_gap: (t / 6.0) as i32 % 5,
            accel_profile: (t / 9.0) as i32 % 3,
            adaptive_cruise: i32::from(toggles.longitudinal),
            steer_ratio: fake_signal(t, 13.0, 16.0, 0.01),
            steer_rate_cost: 0.35,
            steer_actuator_delay: 0.1,
            longitudinal_actuator_delay: 0.2,
            lead_accel_tau: 1.5,
            scc_curvature_factor: fake_signal(t, 0.9, 1.1, 0.03),
        }
    }

    fn car_state(
        &self,
        lead_one: &LeadData,
    ) -> CarState {
        let v_ego = self.v_ego();
        let braking = lead_one.status && lead_one.v_rel < -1.0;
        let auto_hold = match (v_ego < 6.0, braking) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => 2,
        };
        CarState {
            v_ego,
            brake_lights: braking,
            auto_hold,
        }
    }

    fn device_state(&self) -> DeviceState {
        let t = self.t;
        let mut cpu_temp_c = heapless::Vec::new();
        for cpu in 0..4 {
            cpu_temp_c.push(fake_signal(t + cpu as f32 * 3.0, 50.0, 85.0, 0.04)).ok();
        }
        DeviceState {
            battery_percent: fake_signal(t, 20.0, 100.0, 0.01) as i32,
            battery_temp_c: fake_signal(t, 28.0, 42.0, 0.02),
            ambient_temp_c: fake_signal(t, 25.0, 60.0, 0.03),
            cpu_temp_c,
        }
    }

    fn scene_geometry(
        &self,
        geometry: &ViewportGeometry,
        leads: [&LeadData; 2],
    ) -> SceneGeometry {
        let road = &self.road;
        let t = self.t;
        let outer = fake_signal(t, 0.1, 0.7, 0.11);
        let lane_line_probs: [f32; LANE_LINE_COUNT] = [outer, 0.9, 0.9, 1.0 - outer];
        let road_edge_stds: [f32; ROAD_EDGE_COUNT] = [fake_signal(t, 0.1, 1.2, 0.08), 0.3];
        let lead_distance = leads[0].status.then_some(leads[0].d_rel);
        SceneGeometry {
            lane_lines: perception::lane_lines(geometry, road),
            lane_line_probs,
            road_edges: perception::road_edges(geometry, road),
            road_edge_stds,
            track: perception::track(geometry, road, lead_distance),
            lead_vertices: leads.map(|lead| perception::lead_vertex(geometry, road, lead.d_rel)),
        }
    }
}

#[cfg(test)]
mod tests {
    use hud_compositor::config::HudConfig;
    use hud_compositor::scene::SceneSnapshot;
    use hud_compositor::telemetry::{SharedTelemetry, TelemetryStore};

    use super::*;

    #[test]
    fn test_fake_signal_range() {
        for i in 0..200 {
            let v = fake_signal(i as f32 * 0.37, 10.0, 20.0, 0.5);
            assert!((10.0..=20.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn test_records_cover_every_channel() {
        let mut geometry = ViewportGeometry::new(&HudConfig::default());
        geometry.resize(2160, 1080);
        let mut drive = Drive::new();
        drive.step(1.0);

        let store = SharedTelemetry::new();
        store.publish_batch(drive.records(&DriveToggles::default(), &geometry));
        let snapshot = store.snapshot();
        assert!(snapshot.controls_state().is_some());
        assert!(snapshot.scene_geometry().is_some());

        let scene = SceneSnapshot::capture(&store);
        assert!(scene.started);
        assert!(scene.world_objects_visible);
        assert!(!scene.track.is_empty());
    }

    #[test]
    fn test_alert_toggle() {
        let mut geometry = ViewportGeometry::new(&HudConfig::default());
        geometry.resize(2160, 1080);
        let toggles = DriveToggles {
            alert: true,
            ..DriveToggles::default()
        };
        match &Drive::new().records(&toggles, &geometry)[0] {
            Record::ControlsState(controls) => assert!(controls.alert_size.is_active()),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_cruise_unset_without_longitudinal() {
        let mut geometry = ViewportGeometry::new(&HudConfig::default());
        geometry.resize(2160, 1080);
        let toggles = DriveToggles {
            longitudinal: false,
            ..DriveToggles::default()
        };
        let store = SharedTelemetry::new();
        store.publish_batch(Drive::new().records(&toggles, &geometry));
        let scene = SceneSnapshot::capture(&store);
        assert!(!scene.longitudinal_control);
        assert!((scene.control.cruise_max_speed - 255.0).abs() < f32::EPSILON);
    }
}
