//! 3D pipeline seam used for the video blit.
//!
//! The compositor only needs a handful of operations from the graphics
//! pipeline: bind and clear the viewport, draw the current video frame as a
//! textured quad through the projection matrix, toggle alpha blending around
//! the vector phase, and report backend errors. [`FramePipeline`] captures
//! exactly that.
//!
//! - [`SoftwarePipeline`]: CPU blit into the shared framebuffer
//! - [`RecordingPipeline`]: call log with error injection for tests
//!
//! # Blit Quad
//!
//! ```text
//!  (-1, 1) tl ---- tr (1, 1)      texcoords: bl (0,1)  tl (0,0)
//!          |  \     |                        tr (1,0)  br (1,1)
//!          |    \   |             indices:   0,1,2  0,2,3
//! (-1,-1) bl ---- br (1,-1)
//! ```

mod recording;
mod software;

use std::sync::Arc;

use glam::{Mat4, Vec2};
use thiserror::Error;

use crate::colors::Color;

pub use recording::{PipelineCall, RecordingPipeline};
pub use software::SoftwarePipeline;

// =============================================================================
// Video Frames
// =============================================================================

/// One decoded camera frame ready for sampling.
#[derive(Clone, PartialEq, Debug)]
pub struct VideoFrame {
    /// Texture slot the decoder wrote the frame into.
    pub buffer_index: usize,
    /// Monotonically increasing frame counter.
    pub frame_id: u64,
    width: u32,
    height: u32,
    /// Packed RGB8, row-major.
    data: Arc<[u8]>,
}

impl VideoFrame {
    /// Validate buffer length against the frame size.
    pub fn new(
        buffer_index: usize,
        frame_id: u64,
        width: u32,
        height: u32,
        data: Arc<[u8]>,
    ) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(PipelineError::FrameSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            buffer_index,
            frame_id,
            width,
            height,
            data,
        })
    }

    pub const fn width(&self) -> u32 { self.width }

    pub const fn height(&self) -> u32 { self.height }

    /// RGB at a texel, clamped to the frame edge.
    pub fn texel(
        &self,
        x: i32,
        y: i32,
    ) -> [u8; 3] {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        let i = (y * self.width as usize + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Nearest texel at normalized texture coordinates.
    pub fn sample(
        &self,
        uv: Vec2,
    ) -> [u8; 3] {
        self.texel((uv.x * self.width as f32) as i32, (uv.y * self.height as f32) as i32)
    }
}

/// Provider of decoded camera frames.
pub trait VideoSource {
    /// Whether the camera stream is up.
    fn is_connected(&self) -> bool;

    /// Most recent decoded frame, if any arrived yet.
    fn last_frame(&self) -> Option<&VideoFrame>;
}

// =============================================================================
// Pipeline Seam
// =============================================================================

/// Error reported by the 3D pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("graphics backend error 0x{0:04x}")]
    Backend(u32),
    #[error("video frame {width}x{height} does not match its {len}-byte buffer")]
    FrameSize { width: u32, height: u32, len: usize },
}

/// Operations the frame orchestrator issues on the 3D pipeline.
pub trait FramePipeline {
    /// One-time setup of the blit program and quad buffers.
    fn prepare(&mut self) -> Result<(), PipelineError>;

    /// Bind the output and set the viewport.
    fn set_viewport(
        &mut self,
        width: u32,
        height: u32,
    );

    fn clear(
        &mut self,
        color: Color,
    );

    /// Draw the frame as a full quad through `projection`.
    fn blit_video(
        &mut self,
        frame: &VideoFrame,
        projection: &Mat4,
    ) -> Result<(), PipelineError>;

    fn set_blending(
        &mut self,
        enabled: bool,
    );

    /// Pending backend error since the last check.
    fn check_error(&mut self) -> Result<(), PipelineError>;
}

/// Quad corner positions in clip space.
pub const QUAD_POSITIONS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, -1.0),
];

/// Texture coordinates of each quad corner.
pub const QUAD_TEXCOORDS: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
];

/// Two triangles covering the quad.
pub const QUAD_INDICES: [usize; 6] = [0, 1, 2, 0, 2, 3];
