//! Frame orchestration: video blit, then the vector overlay pass.
//!
//! # Frame Phases
//!
//! | Phase           | Pipeline                                  | Canvas                     |
//! |-----------------|-------------------------------------------|----------------------------|
//! | `Idle`          | viewport bound and cleared                | closed                     |
//! | `VideoBlit`     | camera frame drawn through the projection | closed                     |
//! | `VectorOverlay` | blending on                               | frame open, drawers run    |
//!
//! Every tick walks `Idle -> VideoBlit -> VectorOverlay -> Idle`. When the car
//! is not started or the camera is disconnected the blit and all drawers are
//! skipped, leaving a cleared viewport. Blending is only on while the canvas
//! frame is open so it never leaks into the next tick's blit.
//!
//! # Drawer Order
//!
//! Drawers run in the order of [`default_drawers`]: world layer (clipped to the
//! viewport, only while model outputs are fresh), header, then the badge row,
//! measurement panel and diagnostic line. While an alert is showing, drawers
//! flagged `hidden_during_alert` are skipped.
//!
//! # Resize Fence
//!
//! A resize requested through [`PendingResize`] from another thread is applied
//! at the start of the next tick, before anything reads the geometry, so one
//! frame never mixes old and new transforms.

use log::{debug, error, warn};
use thiserror::Error;

use crate::canvas::Canvas;
use crate::colors::CLEAR;
use crate::config::{HudConfig, HudFeatures};
use crate::geometry::{PendingResize, ViewportGeometry};
use crate::pipeline::{FramePipeline, PipelineError, VideoSource};
use crate::resources::{ResourceError, ResourceTable};
use crate::scene::SceneSnapshot;
use crate::telemetry::TelemetryStore;
use crate::widgets::{RenderContext, badges, header, measures, world};

// =============================================================================
// Errors
// =============================================================================

/// Startup failure of [`Compositor::new`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("missing resource: {0}")]
    Resource(#[from] ResourceError),
    #[error("pipeline setup failed: {0}")]
    Pipeline(#[from] PipelineError),
}

/// A frame that was abandoned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("video blit failed: {0}")]
    Blit(PipelineError),
    #[error("overlay pass failed: {0}")]
    Overlay(PipelineError),
}

// =============================================================================
// Drawers
// =============================================================================

/// Where in the frame a drawer paints.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Layer {
    /// Projected road objects, clipped to the viewport.
    World,
    /// Fixed screen-space widgets.
    Screen,
}

/// One entry of the ordered overlay list.
pub struct Drawer<C: Canvas> {
    pub name: &'static str,
    pub layer: Layer,
    pub hidden_during_alert: bool,
    pub draw: fn(&mut RenderContext<'_, C>),
}

impl<C: Canvas> Clone for Drawer<C> {
    fn clone(&self) -> Self { *self }
}

impl<C: Canvas> Copy for Drawer<C> {}

impl<C: Canvas> core::fmt::Debug for Drawer<C> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("Drawer")
            .field("name", &self.name)
            .field("layer", &self.layer)
            .field("hidden_during_alert", &self.hidden_during_alert)
            .finish_non_exhaustive()
    }
}

impl<C: Canvas> Drawer<C> {
    const fn new(
        name: &'static str,
        layer: Layer,
        hidden_during_alert: bool,
        draw: fn(&mut RenderContext<'_, C>),
    ) -> Self {
        Self {
            name,
            layer,
            hidden_during_alert,
            draw,
        }
    }
}

/// Number of drawers in [`default_drawers`].
pub const DRAWER_COUNT: usize = 13;

/// The HUD's overlay drawers, back to front.
pub fn default_drawers<C: Canvas>() -> [Drawer<C>; DRAWER_COUNT] {
    use Layer::{Screen, World};
    [
        Drawer::new("lane_lines", World, false, world::draw_lane_lines),
        Drawer::new("leads", World, true, world::draw_leads),
        Drawer::new("header_shade", Screen, false, header::draw_header_shade),
        Drawer::new("max_speed", Screen, true, header::draw_max_speed),
        Drawer::new("speed", Screen, false, header::draw_speed),
        Drawer::new("steering_icon", Screen, false, header::draw_steering_icon),
        Drawer::new("gap", Screen, true, badges::draw_gap_badge),
        Drawer::new("accel_profile", Screen, true, badges::draw_accel_badge),
        Drawer::new("acc", Screen, true, badges::draw_acc_badge),
        Drawer::new("brake", Screen, true, badges::draw_brake_badge),
        Drawer::new("autohold", Screen, true, badges::draw_autohold_badge),
        Drawer::new("measures_panel", Screen, true, measures::draw_measures_panel),
        Drawer::new("diagnostics", Screen, true, measures::draw_diagnostics),
    ]
}

// =============================================================================
// Compositor
// =============================================================================

/// Where the compositor is within the current tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FramePhase {
    #[default]
    Idle,
    VideoBlit,
    VectorOverlay,
}

/// What one [`Compositor::draw_frame`] call did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FrameStats {
    /// 1-based tick counter.
    pub frame: u64,
    /// Car started and camera connected.
    pub vision: bool,
    /// A camera frame was blitted.
    pub blitted: bool,
    /// Drawers that ran (not skipped by alert or visibility gating).
    pub drawers_run: usize,
}

/// Owns both backends, the viewport geometry and the resolved resources.
pub struct Compositor<P: FramePipeline, C: Canvas> {
    pipeline: P,
    canvas: C,
    viewport: ViewportGeometry,
    resources: ResourceTable,
    features: HudFeatures,
    drawers: [Drawer<C>; DRAWER_COUNT],
    pending_resize: PendingResize,
    phase: FramePhase,
    frame_count: u64,
}

impl<P: FramePipeline, C: Canvas> Compositor<P, C> {
    /// Prepare the pipeline, load every resource and size the viewport.
    ///
    /// # Panics
    /// Zero dimensions.
    pub fn new(
        config: &HudConfig,
        mut pipeline: P,
        mut canvas: C,
        width: u32,
        height: u32,
    ) -> Result<Self, InitError> {
        pipeline.prepare()?;
        let resources = ResourceTable::load(&mut canvas)?;

        let mut viewport = ViewportGeometry::new(config);
        viewport.resize(width, height);

        Ok(Self {
            pipeline,
            canvas,
            viewport,
            resources,
            features: config.features,
            drawers: default_drawers(),
            pending_resize: PendingResize::new(),
            phase: FramePhase::Idle,
            frame_count: 0,
        })
    }

    /// Handle for requesting a resize from another thread.
    pub fn resize_handle(&self) -> PendingResize { self.pending_resize.clone() }

    /// Resize immediately (render thread only).
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
    ) {
        self.viewport.resize(width, height);
    }

    /// Turn optional measurement panel blocks on or off.
    pub fn set_features(
        &mut self,
        features: HudFeatures,
    ) {
        self.features = features;
    }

    pub const fn phase(&self) -> FramePhase { self.phase }

    pub const fn frame_count(&self) -> u64 { self.frame_count }

    pub const fn viewport(&self) -> &ViewportGeometry { &self.viewport }

    pub const fn pipeline(&self) -> &P { &self.pipeline }

    pub fn pipeline_mut(&mut self) -> &mut P { &mut self.pipeline }

    pub const fn canvas(&self) -> &C { &self.canvas }

    pub fn canvas_mut(&mut self) -> &mut C { &mut self.canvas }

    pub fn drawers(&self) -> &[Drawer<C>] { &self.drawers }

    /// Render one tick.
    ///
    /// A failed frame is abandoned, never retried; the next call starts over.
    pub fn draw_frame(
        &mut self,
        store: &impl TelemetryStore,
        video: &impl VideoSource,
    ) -> Result<FrameStats, FrameError> {
        if let Some((width, height)) = self.pending_resize.take() {
            self.viewport.resize(width, height);
        }
        self.frame_count += 1;

        let scene = SceneSnapshot::capture(store);
        let (width, height) = (self.viewport.width(), self.viewport.height());
        self.pipeline.set_viewport(width, height);
        self.pipeline.clear(CLEAR);

        let vision = scene.started && video.is_connected();
        let mut stats = FrameStats {
            frame: self.frame_count,
            vision,
            blitted: false,
            drawers_run: 0,
        };

        if vision {
            self.phase = FramePhase::VideoBlit;
            match self.blit_video(video) {
                Ok(blitted) => stats.blitted = blitted,
                Err(e) => {
                    self.phase = FramePhase::Idle;
                    error!("frame {}: {e}", self.frame_count);
                    return Err(FrameError::Blit(e));
                }
            }
        } else {
            debug!(
                "frame {}: overlays skipped (started: {}, connected: {})",
                self.frame_count,
                scene.started,
                video.is_connected()
            );
        }

        self.phase = FramePhase::VectorOverlay;
        self.pipeline.set_blending(true);
        self.canvas.begin_frame(width, height);
        if vision {
            stats.drawers_run = self.run_drawers(&scene);
        }
        self.canvas.end_frame();
        self.pipeline.set_blending(false);
        self.phase = FramePhase::Idle;

        if let Err(e) = self.pipeline.check_error() {
            error!("frame {}: {e}", self.frame_count);
            return Err(FrameError::Overlay(e));
        }
        debug!("frame {}: {} drawers", stats.frame, stats.drawers_run);
        Ok(stats)
    }

    /// Blit the latest camera frame; `Ok(false)` if none arrived yet.
    fn blit_video(
        &mut self,
        video: &impl VideoSource,
    ) -> Result<bool, PipelineError> {
        let Some(frame) = video.last_frame() else {
            warn!("camera connected but no frame received yet");
            return Ok(false);
        };
        self.pipeline.blit_video(frame, self.viewport.projection())?;
        self.pipeline.check_error()?;
        Ok(true)
    }

    fn run_drawers(
        &mut self,
        scene: &SceneSnapshot,
    ) -> usize {
        let alert = scene.alert_active();
        let bounds = self.viewport.bounds();
        let mut ctx = RenderContext {
            canvas: &mut self.canvas,
            viewport: &self.viewport,
            scene,
            resources: &self.resources,
            features: self.features,
        };

        let mut run = 0;
        for drawer in &self.drawers {
            if alert && drawer.hidden_during_alert {
                continue;
            }
            match drawer.layer {
                Layer::World => {
                    if !scene.world_objects_visible {
                        continue;
                    }
                    ctx.canvas.save();
                    ctx.canvas.scissor(bounds);
                    (drawer.draw)(&mut ctx);
                    ctx.canvas.restore();
                }
                Layer::Screen => (drawer.draw)(&mut ctx),
            }
            run += 1;
        }
        run
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};
    use crate::pipeline::{PipelineCall, RecordingPipeline, VideoFrame};
    use crate::telemetry::{AlertSize, ControlsState, Record, SharedTelemetry, UiState};

    struct TestVideo {
        connected: bool,
        frame: Option<VideoFrame>,
    }

    impl TestVideo {
        fn connected() -> Self {
            let frame = VideoFrame::new(0, 7, 4, 2, Arc::from(vec![0u8; 4 * 2 * 3]));
            Self {
                connected: true,
                frame: frame.ok(),
            }
        }

        fn disconnected() -> Self {
            Self {
                connected: false,
                frame: None,
            }
        }
    }

    impl VideoSource for TestVideo {
        fn is_connected(&self) -> bool { self.connected }

        fn last_frame(&self) -> Option<&VideoFrame> { self.frame.as_ref() }
    }

    type TestCompositor = Compositor<RecordingPipeline, RecordingCanvas>;

    fn compositor() -> TestCompositor {
        match Compositor::new(&HudConfig::default(), RecordingPipeline::new(), RecordingCanvas::new(), 2160, 1080) {
            Ok(c) => c,
            Err(e) => panic!("{e}"),
        }
    }

    fn started_store() -> SharedTelemetry {
        let store = SharedTelemetry::new();
        store.publish(Record::UiState(UiState {
            started: true,
            world_objects_visible: true,
            ..UiState::default()
        }));
        store
    }

    fn drawn(c: &TestCompositor) -> usize { c.canvas().draw_call_count() }

    fn frame(
        c: &mut TestCompositor,
        store: &SharedTelemetry,
        video: &TestVideo,
    ) -> FrameStats {
        match c.draw_frame(store, video) {
            Ok(stats) => stats,
            Err(e) => panic!("frame failed: {e}"),
        }
    }

    #[test]
    fn test_disconnected_source_draws_nothing() {
        let mut c = compositor();
        let stats = frame(&mut c, &started_store(), &TestVideo::disconnected());
        assert!(!stats.vision);
        assert_eq!(drawn(&c), 0, "only a cleared viewport");
        assert_eq!(c.pipeline().blit_count(), 0);
        assert!(c.pipeline().calls().contains(&PipelineCall::Clear(CLEAR)));
    }

    #[test]
    fn test_not_started_draws_nothing() {
        let mut c = compositor();
        let stats = c.draw_frame(&SharedTelemetry::new(), &TestVideo::connected());
        assert!(matches!(stats, Ok(FrameStats { vision: false, drawers_run: 0, .. })));
        assert_eq!(drawn(&c), 0);
    }

    #[test]
    fn test_frame_order_and_blending() {
        let mut c = compositor();
        c.pipeline_mut().clear_calls();
        let stats = c.draw_frame(&started_store(), &TestVideo::connected());
        assert!(matches!(stats, Ok(FrameStats { vision: true, blitted: true, .. })));

        let calls = c.pipeline().calls();
        let blit = calls.iter().position(|call| matches!(call, PipelineCall::BlitVideo { frame_id: 7, .. }));
        let blend_on = calls.iter().position(|call| *call == PipelineCall::SetBlending(true));
        assert!(blit < blend_on, "blit happens before blending is enabled");
        assert!(!c.pipeline().blending(), "blending is off after the frame");
        assert_eq!(c.phase(), FramePhase::Idle);

        let commands = c.canvas().commands();
        assert!(matches!(commands.first(), Some(DrawCommand::BeginFrame { width: 2160, height: 1080 })));
        assert!(matches!(commands.last(), Some(DrawCommand::EndFrame)));
    }

    #[test]
    fn test_blit_uses_viewport_projection() {
        let mut c = compositor();
        c.draw_frame(&started_store(), &TestVideo::connected()).ok();
        let projection = *c.viewport().projection();
        assert!(
            c.pipeline()
                .calls()
                .iter()
                .any(|call| *call == PipelineCall::BlitVideo { frame_id: 7, projection })
        );
    }

    #[test]
    fn test_connected_without_frame_still_draws_overlays() {
        let mut c = compositor();
        let video = TestVideo {
            connected: true,
            frame: None,
        };
        let stats = c.draw_frame(&started_store(), &video);
        assert!(matches!(stats, Ok(FrameStats { blitted: false, vision: true, .. })));
        assert!(drawn(&c) > 0);
    }

    #[test]
    fn test_blit_error_abandons_frame() {
        let mut c = compositor();
        c.pipeline_mut().fail_blits(Some(0x0505));
        let result = c.draw_frame(&started_store(), &TestVideo::connected());
        assert_eq!(result, Err(FrameError::Blit(PipelineError::Backend(0x0505))));
        assert_eq!(drawn(&c), 0);
        assert!(!c.pipeline().blending());
        assert_eq!(c.phase(), FramePhase::Idle);

        c.pipeline_mut().fail_blits(None);
        assert!(c.draw_frame(&started_store(), &TestVideo::connected()).is_ok(), "next tick proceeds");
    }

    #[test]
    fn test_overlay_error_still_closes_frame() {
        let mut c = compositor();
        c.pipeline_mut().raise(0x0500);
        // no blit, so the end-of-frame check reports it
        let result = c.draw_frame(&started_store(), &TestVideo::disconnected());
        assert_eq!(result, Err(FrameError::Overlay(PipelineError::Backend(0x0500))));
        assert!(matches!(c.canvas().commands().last(), Some(DrawCommand::EndFrame)));
        assert!(!c.pipeline().blending());
    }

    #[test]
    fn test_alert_suppresses_most_drawers() {
        let mut c = compositor();
        let store = started_store();
        store.publish(Record::ControlsState(ControlsState {
            engageable: true,
            alert_size: AlertSize::Mid,
            accel_profile: 1,
            ..ControlsState::default()
        }));

        let stats = frame(&mut c, &store, &TestVideo::connected());
        let visible: Vec<_> = c.drawers().iter().filter(|d| !d.hidden_during_alert).map(|d| d.name).collect();
        assert_eq!(visible, vec!["lane_lines", "header_shade", "speed", "steering_icon"]);
        assert_eq!(stats.drawers_run, 4);
        assert!(!c.canvas().texts().contains(&"ACCEL"));
        assert!(!c.canvas().texts().contains(&"REL DIST"));
    }

    #[test]
    fn test_no_alert_runs_every_drawer() {
        let mut c = compositor();
        let stats = frame(&mut c, &started_store(), &TestVideo::connected());
        assert_eq!(stats.drawers_run, DRAWER_COUNT);
        assert!(c.canvas().texts().contains(&"REL DIST"));
    }

    #[test]
    fn test_world_layer_needs_fresh_model() {
        let mut c = compositor();
        let store = started_store();
        store.publish(Record::UiState(UiState {
            started: true,
            world_objects_visible: false,
            ..UiState::default()
        }));
        let stats = frame(&mut c, &store, &TestVideo::connected());
        assert_eq!(stats.drawers_run, DRAWER_COUNT - 2);
        assert_eq!(c.canvas().save_depth(), 0);
    }

    #[test]
    fn test_pending_resize_applied_before_frame() {
        let mut c = compositor();
        let handle = c.resize_handle();
        handle.request(1280, 720);
        handle.request(1920, 1080);

        c.draw_frame(&started_store(), &TestVideo::connected()).ok();
        assert_eq!((c.viewport().width(), c.viewport().height()), (1920, 1080), "latest request wins");
        assert!(!handle.is_pending());
        assert!(c.pipeline().calls().contains(&PipelineCall::SetViewport { width: 1920, height: 1080 }));
        assert!(matches!(
            c.canvas().commands().first(),
            Some(DrawCommand::BeginFrame { width: 1920, height: 1080 })
        ));
    }

    #[test]
    fn test_missing_resource_fails_init() {
        let canvas = RecordingCanvas::new().with_missing_asset("img_chffr_wheel.png");
        let result = Compositor::new(&HudConfig::default(), RecordingPipeline::new(), canvas, 2160, 1080);
        assert!(matches!(result, Err(InitError::Resource(ResourceError::MissingImage { name: "wheel", .. }))));
    }

    #[test]
    fn test_pipeline_setup_failure() {
        let pipeline = RecordingPipeline::new().failing_prepare(0x0501);
        let result = Compositor::new(&HudConfig::default(), pipeline, RecordingCanvas::new(), 2160, 1080);
        assert!(matches!(result, Err(InitError::Pipeline(PipelineError::Backend(0x0501)))));
    }
}
