//! CPU implementation of the video blit.
//!
//! Each covered pixel is mapped back through the inverse projection onto the
//! blit quad; the quad position gives the texture coordinate exactly as the
//! interpolated texcoords of the two quad triangles would.

use glam::{Mat4, Vec2, Vec4};

use super::{FramePipeline, PipelineError, VideoFrame};
use crate::colors::Color;
use crate::framebuffer::{Rgba, SharedFramebuffer};

/// Invalid-operation code raised when blitting before [`FramePipeline::prepare`].
pub const ERROR_INVALID_OPERATION: u32 = 0x0502;

/// Texture slots the decoder cycles through.
const TEXTURE_SLOTS: usize = 4;

/// Software pipeline writing into a shared framebuffer.
pub struct SoftwarePipeline {
    framebuffer: SharedFramebuffer,
    prepared: bool,
    blending: bool,
    pending_error: Option<PipelineError>,
    /// Frame id currently uploaded to each texture slot.
    slots: [Option<u64>; TEXTURE_SLOTS],
}

impl SoftwarePipeline {
    pub fn new(framebuffer: SharedFramebuffer) -> Self {
        Self {
            framebuffer,
            prepared: false,
            blending: false,
            pending_error: None,
            slots: [None; TEXTURE_SLOTS],
        }
    }

    pub const fn blending(&self) -> bool { self.blending }

    fn fail(
        &mut self,
        code: u32,
    ) -> PipelineError {
        let error = PipelineError::Backend(code);
        self.pending_error = Some(error.clone());
        error
    }
}

impl FramePipeline for SoftwarePipeline {
    fn prepare(&mut self) -> Result<(), PipelineError> {
        self.prepared = true;
        log::info!("software blit pipeline ready ({TEXTURE_SLOTS} texture slots)");
        Ok(())
    }

    fn set_viewport(
        &mut self,
        width: u32,
        height: u32,
    ) {
        self.framebuffer.borrow_mut().resize(width, height);
    }

    fn clear(
        &mut self,
        color: Color,
    ) {
        self.framebuffer.borrow_mut().fill_solid(color);
    }

    fn blit_video(
        &mut self,
        frame: &VideoFrame,
        projection: &Mat4,
    ) -> Result<(), PipelineError> {
        if !self.prepared {
            return Err(self.fail(ERROR_INVALID_OPERATION));
        }

        let slot = frame.buffer_index % TEXTURE_SLOTS;
        if self.slots[slot] != Some(frame.frame_id) {
            self.slots[slot] = Some(frame.frame_id);
            log::trace!("uploaded frame {} to slot {slot}", frame.frame_id);
        }

        let mut fb = self.framebuffer.borrow_mut();
        let (w, h) = (fb.width() as f32, fb.height() as f32);
        let to_screen = |ndc: Vec4| Vec2::new((ndc.x + 1.0) / 2.0 * w, (1.0 - ndc.y) / 2.0 * h);

        let corners = super::QUAD_POSITIONS.map(|p| to_screen(*projection * Vec4::new(p.x, p.y, 0.0, 1.0)));
        let (min, max) = corners.iter().fold((corners[0], corners[0]), |(lo, hi), c| (lo.min(*c), hi.max(*c)));
        let x0 = min.x.floor().max(0.0) as i32;
        let y0 = min.y.floor().max(0.0) as i32;
        let x1 = max.x.ceil().min(w) as i32;
        let y1 = max.y.ceil().min(h) as i32;

        let inverse = projection.inverse();
        for y in y0..y1 {
            for x in x0..x1 {
                let ndc = Vec4::new((x as f32 + 0.5) / w * 2.0 - 1.0, 1.0 - (y as f32 + 0.5) / h * 2.0, 0.0, 1.0);
                let quad = inverse * ndc;
                if quad.x.abs() > 1.0 || quad.y.abs() > 1.0 {
                    continue;
                }
                let uv = Vec2::new((quad.x + 1.0) / 2.0, (1.0 - quad.y) / 2.0);
                let [r, g, b] = frame.sample(uv);
                if self.blending {
                    fb.blend(x, y, Color::rgba(r, g, b, 255), 1.0);
                } else {
                    fb.set(x, y, Rgba::new(r, g, b, 255));
                }
            }
        }
        Ok(())
    }

    fn set_blending(
        &mut self,
        enabled: bool,
    ) {
        self.blending = enabled;
    }

    fn check_error(&mut self) -> Result<(), PipelineError> {
        match self.pending_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
