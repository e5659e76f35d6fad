//! Overlay drawers and the vector primitives they share.
//!
//! This module organizes all visual elements into logical submodules:
//!
//! - [`primitives`]: Shared drawing helpers (polygon fill, chevron, circle image, text, measurement block)
//! - [`world`]: Camera-space objects (lane lines, road edges, path, lead chevrons)
//! - [`header`]: Header shade, max-speed panel, speed readout, steering icon
//! - [`badges`]: Bottom badge row (gap, accel profile, ACC, brake, autohold)
//! - [`measures`]: Left measurement panel and the diagnostic line
//!
//! # Architecture
//!
//! Every drawer has the same shape: it takes a [`RenderContext`], reads the
//! frame's [`SceneSnapshot`], decides whether it applies, and issues canvas
//! calls through [`primitives`]. Drawers hold no state between frames and
//! never keep the context past the call. The mapping from telemetry to
//! visual parameters lives in small pure functions next to each drawer
//! (`lead_fill_alpha`, `speed_readout`, `max_speed_values`, ...), so it can
//! be tested without a canvas.

pub mod badges;
pub mod header;
pub mod measures;
pub mod primitives;
pub mod world;

use crate::canvas::Canvas;
use crate::config::HudFeatures;
use crate::geometry::ViewportGeometry;
use crate::resources::ResourceTable;
use crate::scene::SceneSnapshot;

/// Everything a drawer may read or draw to during one frame.
pub struct RenderContext<'a, C: Canvas> {
    pub canvas: &'a mut C,
    pub viewport: &'a ViewportGeometry,
    pub scene: &'a SceneSnapshot,
    pub resources: &'a ResourceTable,
    pub features: HudFeatures,
}

impl<C: Canvas> RenderContext<'_, C> {
    /// Viewport width in pixels.
    #[inline]
    pub fn width(&self) -> f32 { self.viewport.width() as f32 }

    /// Viewport height in pixels.
    #[inline]
    pub fn height(&self) -> f32 { self.viewport.height() as f32 }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixture shared by the drawer tests.

    use crate::canvas::RecordingCanvas;
    use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, HudConfig, HudFeatures};
    use crate::geometry::ViewportGeometry;
    use crate::resources::ResourceTable;
    use crate::scene::SceneSnapshot;

    use super::RenderContext;

    pub struct Fixture {
        pub canvas: RecordingCanvas,
        pub viewport: ViewportGeometry,
        pub resources: ResourceTable,
        pub features: HudFeatures,
    }

    impl Fixture {
        pub fn new() -> Self {
            let mut canvas = RecordingCanvas::new();
            let resources = match ResourceTable::load(&mut canvas) {
                Ok(r) => r,
                Err(e) => panic!("{e}"),
            };
            let mut viewport = ViewportGeometry::new(&HudConfig::default());
            viewport.resize(DEFAULT_WIDTH, DEFAULT_HEIGHT);
            Self {
                canvas,
                viewport,
                resources,
                features: HudFeatures::ALL,
            }
        }

        /// Run one drawer against `scene` and return the canvas.
        pub fn draw(
            &mut self,
            scene: &SceneSnapshot,
            drawer: fn(&mut RenderContext<'_, RecordingCanvas>),
        ) -> &RecordingCanvas {
            self.canvas.clear();
            let mut ctx = RenderContext {
                canvas: &mut self.canvas,
                viewport: &self.viewport,
                scene,
                resources: &self.resources,
                features: self.features,
            };
            drawer(&mut ctx);
            &self.canvas
        }
    }
}
