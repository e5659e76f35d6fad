//! Per-frame scene snapshot.
//!
//! [`SceneSnapshot::capture`] reads the telemetry store once per frame and
//! flattens every channel into the plain values the drawers need. Raw
//! integer mode fields are decoded here into enums, so drawers never see a
//! sentinel number: a negative value becomes `None` (badge hidden) and an
//! out-of-range value becomes an explicit `Unknown` variant.
//!
//! Missing channels fall back to the same defaults an idle car would publish.

use glam::Vec2;

use crate::geometry::VertexList;
use crate::telemetry::{
    AlertSize, CarState, ControlsState, DeviceState, LANE_LINE_COUNT, LiveParameters, MAX_CPU_CORES, RadarState,
    ROAD_EDGE_COUNT, SceneGeometry, Telemetry, TelemetryStore, UiStatus,
};

// =============================================================================
// Units
// =============================================================================

/// Unit system for the speed readouts and panel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub const fn from_is_metric(is_metric: bool) -> Self { if is_metric { Self::Metric } else { Self::Imperial } }

    pub const fn is_metric(self) -> bool { matches!(self, Self::Metric) }

    /// Speed unit label.
    pub const fn speed_label(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }
}

// =============================================================================
// Control Modes
// =============================================================================

/// Following distance setting shown on the gap badge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GapSetting {
    Auto,
    Distance(i32),
}

impl GapSetting {
    /// `None` for a negative (unreported) value.
    pub const fn decode(raw: i32) -> Option<Self> {
        match raw {
            n if n < 0 => None,
            0 => Some(Self::Auto),
            n => Some(Self::Distance(n)),
        }
    }
}

/// Acceleration profile shown on the accel badge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AccelProfile {
    Eco,
    Normal,
    Sport,
    Unknown(i32),
}

impl AccelProfile {
    pub const fn decode(raw: i32) -> Option<Self> {
        match raw {
            n if n < 0 => None,
            0 => Some(Self::Eco),
            1 => Some(Self::Normal),
            2 => Some(Self::Sport),
            n => Some(Self::Unknown(n)),
        }
    }

    /// Badge text; `None` for an unknown profile.
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Eco => Some("ECO"),
            Self::Normal => Some("NOR"),
            Self::Sport => Some("SPT"),
            Self::Unknown(_) => None,
        }
    }
}

/// Adaptive cruise state shown on the ACC badge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdaptiveCruise {
    Off,
    On,
    Unknown(i32),
}

impl AdaptiveCruise {
    pub const fn decode(raw: i32) -> Option<Self> {
        match raw {
            n if n < 0 => None,
            0 => Some(Self::Off),
            1 => Some(Self::On),
            n => Some(Self::Unknown(n)),
        }
    }

    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Off => Some("OFF"),
            Self::On => Some("ON"),
            Self::Unknown(_) => None,
        }
    }
}

/// Brake autohold state shown on the autohold badge.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Autohold {
    Inactive,
    Active,
    Warning,
}

impl Autohold {
    pub const fn decode(raw: i32) -> Option<Self> {
        match raw {
            n if n < 0 => None,
            0 => Some(Self::Inactive),
            1 => Some(Self::Active),
            _ => Some(Self::Warning),
        }
    }

    pub const fn is_engaged(self) -> bool { !matches!(self, Self::Inactive) }
}

/// Decoded driver-facing control modes.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ControlMode {
    /// Cruise set speed, km/h (`0`/`255` unset).
    pub cruise_max_speed: f32,
    /// Applied target speed, km/h.
    pub apply_max_speed: f32,
    pub gap: Option<GapSetting>,
    pub accel_profile: Option<AccelProfile>,
    pub adaptive_cruise: Option<AdaptiveCruise>,
    pub autohold: Option<Autohold>,
    pub brake_lights: bool,
}

// =============================================================================
// World Objects
// =============================================================================

/// One tracked lead vehicle with its screen anchor.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct LeadSnapshot {
    pub status: bool,
    pub distance: f32,
    pub rel_speed: f32,
    /// Ground contact point in screen space.
    pub screen: Vec2,
}

/// A lane line polygon and the model's confidence in it.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct LaneLine {
    pub vertices: VertexList,
    pub probability: f32,
}

/// A road edge polygon and the standard deviation of its position.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct RoadEdge {
    pub vertices: VertexList,
    pub std: f32,
}

// =============================================================================
// Device and Diagnostics
// =============================================================================

/// Thermal and power readings for the measurement panel.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DeviceReadings {
    pub battery_percent: i32,
    pub battery_temp_c: f32,
    pub ambient_temp_c: f32,
    pub cpu_temps_c: heapless::Vec<f32, MAX_CPU_CORES>,
}

impl DeviceReadings {
    /// Mean of all reported CPU cores, `0.0` with none.
    pub fn cpu_temp_mean(&self) -> f32 {
        if self.cpu_temps_c.is_empty() {
            return 0.0;
        }
        self.cpu_temps_c.iter().sum::<f32>() / self.cpu_temps_c.len() as f32
    }
}

/// Values printed on the bottom diagnostic line.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Diagnostics {
    pub angle_offset: f32,
    pub angle_offset_average: f32,
    pub steer_ratio: f32,
    pub steer_rate_cost: f32,
    pub steer_actuator_delay: f32,
    pub longitudinal_actuator_delay: f32,
    pub lead_accel_tau: f32,
    pub curvature_factor: f32,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of everything a frame draws.
#[derive(Clone, PartialEq, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct SceneSnapshot {
    pub started: bool,
    /// Ego speed, m/s.
    pub v_ego: f32,
    pub units: UnitSystem,
    pub end_to_end: bool,
    pub world_objects_visible: bool,
    pub longitudinal_control: bool,
    pub engageable: bool,
    pub status: UiStatus,
    pub alert_size: AlertSize,
    pub leads: [LeadSnapshot; 2],
    pub lane_lines: [LaneLine; LANE_LINE_COUNT],
    pub road_edges: [RoadEdge; ROAD_EDGE_COUNT],
    pub track: VertexList,
    pub device: DeviceReadings,
    pub control: ControlMode,
    pub diagnostics: Diagnostics,
}

impl Default for SceneSnapshot {
    fn default() -> Self { Self::from_telemetry(&Telemetry::new()) }
}

impl SceneSnapshot {
    /// Read the store once and flatten it.
    pub fn capture(store: &impl TelemetryStore) -> Self { Self::from_telemetry(&store.snapshot()) }

    /// Flatten an already-captured point-in-time set.
    pub fn from_telemetry(telemetry: &Telemetry) -> Self {
        let controls = telemetry.controls_state().cloned().unwrap_or_default();
        let car = telemetry.car_state().cloned().unwrap_or_default();
        let radar = telemetry.radar_state().copied().unwrap_or_default();
        let device = telemetry.device_state().cloned().unwrap_or_default();
        let params = telemetry.live_parameters().copied().unwrap_or_default();
        let ui = telemetry.ui_state().copied().unwrap_or_default();
        let geometry = telemetry.scene_geometry().cloned().unwrap_or_default();

        Self {
            started: ui.started,
            v_ego: car.v_ego,
            units: UnitSystem::from_is_metric(ui.is_metric),
            end_to_end: ui.end_to_end,
            world_objects_visible: ui.world_objects_visible,
            longitudinal_control: ui.longitudinal_control,
            engageable: controls.engageable,
            status: ui.status,
            alert_size: controls.alert_size,
            leads: leads(&radar, &geometry),
            lane_lines: lane_lines(&geometry),
            road_edges: road_edges(&geometry),
            track: geometry.track,
            device: device_readings(device),
            control: control_mode(&controls, &car),
            diagnostics: diagnostics(&controls, &params),
        }
    }

    /// Alerts of any size hide most overlays.
    #[inline]
    pub const fn alert_active(&self) -> bool { self.alert_size.is_active() }

    #[inline]
    pub const fn lead_one(&self) -> &LeadSnapshot { &self.leads[0] }

    #[inline]
    pub const fn lead_two(&self) -> &LeadSnapshot { &self.leads[1] }
}

fn leads(
    radar: &RadarState,
    geometry: &SceneGeometry,
) -> [LeadSnapshot; 2] {
    let lead = |i: usize, data: &crate::telemetry::LeadData| LeadSnapshot {
        status: data.status,
        distance: data.d_rel,
        rel_speed: data.v_rel,
        screen: geometry.lead_vertices[i],
    };
    [lead(0, &radar.lead_one), lead(1, &radar.lead_two)]
}

fn lane_lines(geometry: &SceneGeometry) -> [LaneLine; LANE_LINE_COUNT] {
    core::array::from_fn(|i| LaneLine {
        vertices: geometry.lane_lines[i].clone(),
        probability: geometry.lane_line_probs[i],
    })
}

fn road_edges(geometry: &SceneGeometry) -> [RoadEdge; ROAD_EDGE_COUNT] {
    core::array::from_fn(|i| RoadEdge {
        vertices: geometry.road_edges[i].clone(),
        std: geometry.road_edge_stds[i],
    })
}

fn device_readings(device: DeviceState) -> DeviceReadings {
    DeviceReadings {
        battery_percent: device.battery_percent,
        battery_temp_c: device.battery_temp_c,
        ambient_temp_c: device.ambient_temp_c,
        cpu_temps_c: device.cpu_temp_c,
    }
}

fn control_mode(
    controls: &ControlsState,
    car: &CarState,
) -> ControlMode {
    ControlMode {
        cruise_max_speed: controls.cruise_max_speed,
        apply_max_speed: controls.apply_max_speed,
        gap: GapSetting::decode(controls.distance_gap),
        accel_profile: AccelProfile::decode(controls.accel_profile),
        adaptive_cruise: AdaptiveCruise::decode(controls.adaptive_cruise),
        autohold: Autohold::decode(car.auto_hold),
        brake_lights: car.brake_lights,
    }
}

fn diagnostics(
    controls: &ControlsState,
    params: &LiveParameters,
) -> Diagnostics {
    Diagnostics {
        angle_offset: params.angle_offset_deg,
        angle_offset_average: params.angle_offset_average_deg,
        steer_ratio: controls.steer_ratio,
        steer_rate_cost: controls.steer_rate_cost,
        steer_actuator_delay: controls.steer_actuator_delay,
        longitudinal_actuator_delay: controls.longitudinal_actuator_delay,
        lead_accel_tau: controls.lead_accel_tau,
        curvature_factor: controls.scc_curvature_factor,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{LeadData, Record, SharedTelemetry, UiState};

    #[test]
    fn test_empty_store_is_idle() {
        let scene = SceneSnapshot::capture(&SharedTelemetry::new());
        assert!(!scene.started);
        assert!(scene.units.is_metric());
        assert_eq!(scene.control.gap, None, "unreported gap hides the badge");
        assert_eq!(scene.control.autohold, None);
        assert!(!scene.alert_active());
    }

    #[test]
    fn test_accel_profile_decode() {
        assert_eq!(AccelProfile::decode(-1), None);
        assert_eq!(AccelProfile::decode(0).and_then(AccelProfile::label), Some("ECO"));
        assert_eq!(AccelProfile::decode(1).and_then(AccelProfile::label), Some("NOR"));
        assert_eq!(AccelProfile::decode(2).and_then(AccelProfile::label), Some("SPT"));
        assert_eq!(AccelProfile::decode(3), Some(AccelProfile::Unknown(3)));
        assert_eq!(AccelProfile::Unknown(3).label(), None);
    }

    #[test]
    fn test_gap_and_acc_decode() {
        assert_eq!(GapSetting::decode(0), Some(GapSetting::Auto));
        assert_eq!(GapSetting::decode(3), Some(GapSetting::Distance(3)));
        assert_eq!(GapSetting::decode(-2), None);
        assert_eq!(AdaptiveCruise::decode(1).and_then(AdaptiveCruise::label), Some("ON"));
        assert_eq!(AdaptiveCruise::decode(7), Some(AdaptiveCruise::Unknown(7)));
    }

    #[test]
    fn test_autohold_decode() {
        assert_eq!(Autohold::decode(-1), None);
        assert_eq!(Autohold::decode(0), Some(Autohold::Inactive));
        assert_eq!(Autohold::decode(1), Some(Autohold::Active));
        assert_eq!(Autohold::decode(2), Some(Autohold::Warning));
        assert!(!Autohold::Inactive.is_engaged());
        assert!(Autohold::Warning.is_engaged());
    }

    #[test]
    fn test_cpu_temp_mean() {
        let mut device = DeviceReadings::default();
        assert!(device.cpu_temp_mean().abs() < f32::EPSILON, "no cores reads as 0");
        device.cpu_temps_c.extend([70.0, 80.0, 90.0]);
        assert!((device.cpu_temp_mean() - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_capture_pairs_leads_with_screen_points() {
        let store = SharedTelemetry::new();
        let mut geometry = SceneGeometry::default();
        geometry.lead_vertices = [Vec2::new(100.0, 700.0), Vec2::new(300.0, 650.0)];
        store.publish_batch([
            Record::RadarState(RadarState {
                lead_one: LeadData { status: true, d_rel: 12.0, v_rel: -1.0 },
                lead_two: LeadData { status: true, d_rel: 30.0, v_rel: 0.5 },
            }),
            Record::SceneGeometry(geometry),
            Record::UiState(UiState { is_metric: false, ..UiState::default() }),
        ]);

        let scene = SceneSnapshot::capture(&store);
        assert_eq!(scene.units, UnitSystem::Imperial);
        assert!((scene.lead_one().distance - 12.0).abs() < f32::EPSILON);
        assert_eq!(scene.lead_one().screen, Vec2::new(100.0, 700.0));
        assert_eq!(scene.lead_two().screen, Vec2::new(300.0, 650.0));
    }
}
