//! Typed telemetry records and the keyed snapshot store.
//!
//! The vehicle, perception and device processes publish records on named
//! channels. The compositor never subscribes to anything itself: it asks a
//! [`TelemetryStore`] for the latest record of each channel once per frame.
//!
//! # Channels
//!
//! | Channel          | Record              | Used by                                   |
//! |------------------|---------------------|-------------------------------------------|
//! | `controlsState`  | [`ControlsState`]   | max speed, engage icon, badges, alerts    |
//! | `carState`       | [`CarState`]        | speed readout, brake and autohold badges  |
//! | `radarState`     | [`RadarState`]      | lead chevrons, measurement panel          |
//! | `deviceState`    | [`DeviceState`]     | battery and temperature blocks            |
//! | `liveParameters` | [`LiveParameters`]  | diagnostic text line                      |
//! | `uiState`        | [`UiState`]         | started flag, units, status, mode flags   |
//! | `sceneGeometry`  | [`SceneGeometry`]   | lane lines, road edges, path, lead points |
//!
//! # Consistency
//!
//! [`SharedTelemetry`] keeps all channels behind one `RwLock`. Publishers that
//! must update several channels together use
//! [`publish_batch`](SharedTelemetry::publish_batch), and the compositor reads
//! every channel under a single read lock via [`TelemetryStore::snapshot`], so
//! a frame never mixes two logical updates (e.g. lead status from one tick and
//! lead distance from the next).

use std::sync::{Arc, PoisonError, RwLock};

use crate::geometry::VertexList;

// =============================================================================
// Channels
// =============================================================================

/// Named telemetry channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Channel {
    ControlsState,
    CarState,
    RadarState,
    DeviceState,
    LiveParameters,
    UiState,
    SceneGeometry,
}

/// Number of channels.
pub const CHANNEL_COUNT: usize = 7;

impl Channel {
    /// Every channel, in storage order.
    pub const ALL: [Self; CHANNEL_COUNT] = [
        Self::ControlsState,
        Self::CarState,
        Self::RadarState,
        Self::DeviceState,
        Self::LiveParameters,
        Self::UiState,
        Self::SceneGeometry,
    ];

    /// Wire name of the channel.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ControlsState => "controlsState",
            Self::CarState => "carState",
            Self::RadarState => "radarState",
            Self::DeviceState => "deviceState",
            Self::LiveParameters => "liveParameters",
            Self::UiState => "uiState",
            Self::SceneGeometry => "sceneGeometry",
        }
    }

    /// Look a channel up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> { Self::ALL.into_iter().find(|c| c.name() == name) }

    const fn index(self) -> usize { self as usize }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Size of the alert currently on screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AlertSize {
    #[default]
    None,
    Small,
    Mid,
    Full,
}

impl AlertSize {
    /// Any visible alert suppresses most overlays.
    #[inline]
    pub const fn is_active(self) -> bool { !matches!(self, Self::None) }
}

/// Engagement status; selects the steering icon tint.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UiStatus {
    #[default]
    Disengaged,
    Override,
    Engaged,
    Warning,
    Alert,
}

// =============================================================================
// Records
// =============================================================================

/// `controlsState`: longitudinal/lateral controller state.
///
/// Mode fields use `-1` for "not reported by this car".
#[derive(Clone, PartialEq, Debug)]
pub struct ControlsState {
    /// Cruise set speed, km/h. `0` or `255` means unset.
    pub cruise_max_speed: f32,
    /// Speed the controller is actually targeting, km/h.
    pub apply_max_speed: f32,
    pub engageable: bool,
    pub alert_size: AlertSize,
    /// Following distance setting: `0` = auto, `>0` = bars, `<0` = n/a.
    pub distance_gap: i32,
    /// `0` eco, `1` normal, `2` sport, `<0` n/a.
    pub accel_profile: i32,
    /// `0` off, `1` on, `<0` n/a.
    pub adaptive_cruise: i32,
    pub steer_ratio: f32,
    pub steer_rate_cost: f32,
    pub steer_actuator_delay: f32,
    pub longitudinal_actuator_delay: f32,
    pub lead_accel_tau: f32,
    pub scc_curvature_factor: f32,
}

impl Default for ControlsState {
    fn default() -> Self {
        Self {
            cruise_max_speed: 0.0,
            apply_max_speed: 0.0,
            engageable: false,
            alert_size: AlertSize::None,
            distance_gap: -1,
            accel_profile: -1,
            adaptive_cruise: -1,
            steer_ratio: 0.0,
            steer_rate_cost: 0.0,
            steer_actuator_delay: 0.0,
            longitudinal_actuator_delay: 0.0,
            lead_accel_tau: 0.0,
            scc_curvature_factor: 0.0,
        }
    }
}

/// `carState`: vehicle state from the car interface.
#[derive(Clone, PartialEq, Debug)]
pub struct CarState {
    /// Ego speed, m/s.
    pub v_ego: f32,
    pub brake_lights: bool,
    /// `0` inactive, `1` holding, `>1` warning, `<0` n/a.
    pub auto_hold: i32,
}

impl Default for CarState {
    fn default() -> Self {
        Self {
            v_ego: 0.0,
            brake_lights: false,
            auto_hold: -1,
        }
    }
}

/// One tracked lead vehicle.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct LeadData {
    pub status: bool,
    /// Distance to the lead, m.
    pub d_rel: f32,
    /// Lead speed relative to ego, m/s (negative = closing).
    pub v_rel: f32,
}

/// `radarState`: the two closest leads.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct RadarState {
    pub lead_one: LeadData,
    pub lead_two: LeadData,
}

/// Maximum CPU cores reported by `deviceState`.
pub const MAX_CPU_CORES: usize = 8;

/// `deviceState`: thermal and power readings.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DeviceState {
    pub battery_percent: i32,
    pub battery_temp_c: f32,
    pub ambient_temp_c: f32,
    pub cpu_temp_c: heapless::Vec<f32, MAX_CPU_CORES>,
}

/// `liveParameters`: online-learned vehicle parameters.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct LiveParameters {
    pub angle_offset_deg: f32,
    pub angle_offset_average_deg: f32,
}

/// `uiState`: UI-level flags derived by the UI process.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct UiState {
    /// Car is started and the vision pipeline is expected.
    pub started: bool,
    pub is_metric: bool,
    /// Show only the learned path, no discrete lane lines.
    pub end_to_end: bool,
    /// Model outputs are fresh enough to draw world objects.
    pub world_objects_visible: bool,
    pub longitudinal_control: bool,
    pub status: UiStatus,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            started: false,
            is_metric: true,
            end_to_end: false,
            world_objects_visible: false,
            longitudinal_control: false,
            status: UiStatus::Disengaged,
        }
    }
}

/// Number of lane lines the model reports.
pub const LANE_LINE_COUNT: usize = 4;

/// Number of road edges the model reports.
pub const ROAD_EDGE_COUNT: usize = 2;

/// `sceneGeometry`: model outputs already mapped to screen space.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SceneGeometry {
    pub lane_lines: [VertexList; LANE_LINE_COUNT],
    pub lane_line_probs: [f32; LANE_LINE_COUNT],
    pub road_edges: [VertexList; ROAD_EDGE_COUNT],
    pub road_edge_stds: [f32; ROAD_EDGE_COUNT],
    pub track: VertexList,
    /// Screen position of each lead's ground contact point.
    pub lead_vertices: [glam::Vec2; 2],
}

/// Any record, tagged by channel.
#[derive(Clone, PartialEq, Debug)]
pub enum Record {
    ControlsState(ControlsState),
    CarState(CarState),
    RadarState(RadarState),
    DeviceState(DeviceState),
    LiveParameters(LiveParameters),
    UiState(UiState),
    SceneGeometry(SceneGeometry),
}

impl Record {
    /// Channel this record is published on.
    pub const fn channel(&self) -> Channel {
        match self {
            Self::ControlsState(_) => Channel::ControlsState,
            Self::CarState(_) => Channel::CarState,
            Self::RadarState(_) => Channel::RadarState,
            Self::DeviceState(_) => Channel::DeviceState,
            Self::LiveParameters(_) => Channel::LiveParameters,
            Self::UiState(_) => Channel::UiState,
            Self::SceneGeometry(_) => Channel::SceneGeometry,
        }
    }
}

// =============================================================================
// Point-in-time Set
// =============================================================================

/// Latest record of every channel at one instant.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Telemetry {
    records: [Option<Record>; CHANNEL_COUNT],
}

impl Telemetry {
    pub fn new() -> Self { Self::default() }

    /// Store a record in its channel slot, replacing the previous one.
    pub fn insert(
        &mut self,
        record: Record,
    ) {
        let slot = record.channel().index();
        self.records[slot] = Some(record);
    }

    pub fn get(
        &self,
        channel: Channel,
    ) -> Option<&Record> {
        self.records[channel.index()].as_ref()
    }

    pub fn controls_state(&self) -> Option<&ControlsState> {
        match self.get(Channel::ControlsState) {
            Some(Record::ControlsState(r)) => Some(r),
            _ => None,
        }
    }

    pub fn car_state(&self) -> Option<&CarState> {
        match self.get(Channel::CarState) {
            Some(Record::CarState(r)) => Some(r),
            _ => None,
        }
    }

    pub fn radar_state(&self) -> Option<&RadarState> {
        match self.get(Channel::RadarState) {
            Some(Record::RadarState(r)) => Some(r),
            _ => None,
        }
    }

    pub fn device_state(&self) -> Option<&DeviceState> {
        match self.get(Channel::DeviceState) {
            Some(Record::DeviceState(r)) => Some(r),
            _ => None,
        }
    }

    pub fn live_parameters(&self) -> Option<&LiveParameters> {
        match self.get(Channel::LiveParameters) {
            Some(Record::LiveParameters(r)) => Some(r),
            _ => None,
        }
    }

    pub fn ui_state(&self) -> Option<&UiState> {
        match self.get(Channel::UiState) {
            Some(Record::UiState(r)) => Some(r),
            _ => None,
        }
    }

    pub fn scene_geometry(&self) -> Option<&SceneGeometry> {
        match self.get(Channel::SceneGeometry) {
            Some(Record::SceneGeometry(r)) => Some(r),
            _ => None,
        }
    }
}

// =============================================================================
// Store Seam
// =============================================================================

/// Keyed last-value access to published telemetry.
pub trait TelemetryStore {
    /// Latest record on a channel, if anything was published yet.
    fn latest(
        &self,
        channel: Channel,
    ) -> Option<Record>;

    /// Latest record of every channel, read as one transaction.
    ///
    /// The default reads channel by channel, which is only consistent for
    /// stores that cannot change during the call.
    fn snapshot(&self) -> Telemetry {
        let mut telemetry = Telemetry::new();
        for record in Channel::ALL.into_iter().filter_map(|c| self.latest(c)) {
            telemetry.insert(record);
        }
        telemetry
    }
}

impl TelemetryStore for Telemetry {
    fn latest(
        &self,
        channel: Channel,
    ) -> Option<Record> {
        self.get(channel).cloned()
    }

    fn snapshot(&self) -> Telemetry { self.clone() }
}

/// Thread-safe in-memory store with last-value semantics.
///
/// Clones share the same storage: hand one to each publisher and one to the
/// render thread.
#[derive(Clone, Debug, Default)]
pub struct SharedTelemetry {
    inner: Arc<RwLock<Telemetry>>,
}

impl SharedTelemetry {
    pub fn new() -> Self { Self::default() }

    /// Publish one record.
    pub fn publish(
        &self,
        record: Record,
    ) {
        // A publisher panicking mid-insert cannot leave a torn record, so poisoning is ignored
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(record);
    }

    /// Publish several records as one logical update.
    pub fn publish_batch(
        &self,
        records: impl IntoIterator<Item = Record>,
    ) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for record in records {
            guard.insert(record);
        }
    }
}

impl TelemetryStore for SharedTelemetry {
    fn latest(
        &self,
        channel: Channel,
    ) -> Option<Record> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).get(channel).cloned()
    }

    fn snapshot(&self) -> Telemetry { self.inner.read().unwrap_or_else(PoisonError::into_inner).clone() }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_roundtrip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_name(channel.name()), Some(channel));
        }
        assert_eq!(Channel::from_name("modelV2"), None);
    }

    #[test]
    fn test_channel_index_matches_all_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i, "{channel:?} stored out of order");
        }
    }

    #[test]
    fn test_sentinel_defaults() {
        let controls = ControlsState::default();
        assert!(controls.distance_gap < 0);
        assert!(controls.accel_profile < 0);
        assert!(controls.adaptive_cruise < 0);
        assert!(CarState::default().auto_hold < 0);
    }

    #[test]
    fn test_latest_value_wins() {
        let store = SharedTelemetry::new();
        assert!(store.latest(Channel::CarState).is_none());

        store.publish(Record::CarState(CarState { v_ego: 5.0, ..CarState::default() }));
        store.publish(Record::CarState(CarState { v_ego: 7.5, ..CarState::default() }));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.car_state().map(|c| c.v_ego), Some(7.5));
        assert!(snapshot.radar_state().is_none());
    }

    #[test]
    fn test_batch_is_atomic_for_readers() {
        let store = SharedTelemetry::new();
        let writer = store.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..200 {
                let d = i as f32;
                let lead = LeadData { status: true, d_rel: d, v_rel: -d };
                writer.publish_batch([
                    Record::RadarState(RadarState { lead_one: lead, lead_two: lead }),
                    Record::CarState(CarState { v_ego: d, ..CarState::default() }),
                ]);
            }
        });

        for _ in 0..200 {
            let snapshot = store.snapshot();
            if let (Some(radar), Some(car)) = (snapshot.radar_state(), snapshot.car_state()) {
                assert_eq!(radar.lead_one.d_rel, car.v_ego, "snapshot mixed two batches");
                assert_eq!(radar.lead_one.d_rel, -radar.lead_one.v_rel);
            }
        }
        handle.join().ok();
    }

    #[test]
    fn test_alert_size_activity() {
        assert!(!AlertSize::None.is_active());
        assert!(AlertSize::Small.is_active());
        assert!(AlertSize::Full.is_active());
    }
}
