//! Pipeline double that logs calls and can inject backend errors.

use glam::Mat4;

use super::{FramePipeline, PipelineError, VideoFrame};
use crate::colors::Color;

/// One recorded pipeline call.
#[derive(Clone, PartialEq, Debug)]
pub enum PipelineCall {
    Prepare,
    SetViewport { width: u32, height: u32 },
    Clear(Color),
    BlitVideo { frame_id: u64, projection: Mat4 },
    SetBlending(bool),
    CheckError,
}

/// Recording pipeline.
#[derive(Debug, Default)]
pub struct RecordingPipeline {
    calls: Vec<PipelineCall>,
    fail_prepare: Option<u32>,
    fail_blit: Option<u32>,
    pending_error: Option<PipelineError>,
}

impl RecordingPipeline {
    pub fn new() -> Self { Self::default() }

    /// Make [`FramePipeline::prepare`] fail with `code`.
    pub fn failing_prepare(
        mut self,
        code: u32,
    ) -> Self {
        self.fail_prepare = Some(code);
        self
    }

    /// Make every blit fail with `code`.
    pub fn fail_blits(
        &mut self,
        code: Option<u32>,
    ) {
        self.fail_blit = code;
    }

    /// Queue an error for the next [`FramePipeline::check_error`].
    pub fn raise(
        &mut self,
        code: u32,
    ) {
        self.pending_error = Some(PipelineError::Backend(code));
    }

    pub fn calls(&self) -> &[PipelineCall] { &self.calls }

    pub fn clear_calls(&mut self) { self.calls.clear(); }

    pub fn blit_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, PipelineCall::BlitVideo { .. })).count()
    }

    /// Blending state after the last recorded toggle.
    pub fn blending(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                PipelineCall::SetBlending(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl FramePipeline for RecordingPipeline {
    fn prepare(&mut self) -> Result<(), PipelineError> {
        self.calls.push(PipelineCall::Prepare);
        match self.fail_prepare {
            Some(code) => Err(PipelineError::Backend(code)),
            None => Ok(()),
        }
    }

    fn set_viewport(
        &mut self,
        width: u32,
        height: u32,
    ) {
        self.calls.push(PipelineCall::SetViewport { width, height });
    }

    fn clear(
        &mut self,
        color: Color,
    ) {
        self.calls.push(PipelineCall::Clear(color));
    }

    fn blit_video(
        &mut self,
        frame: &VideoFrame,
        projection: &Mat4,
    ) -> Result<(), PipelineError> {
        self.calls.push(PipelineCall::BlitVideo {
            frame_id: frame.frame_id,
            projection: *projection,
        });
        match self.fail_blit {
            Some(code) => Err(PipelineError::Backend(code)),
            None => Ok(()),
        }
    }

    fn set_blending(
        &mut self,
        enabled: bool,
    ) {
        self.calls.push(PipelineCall::SetBlending(enabled));
    }

    fn check_error(&mut self) -> Result<(), PipelineError> {
        self.calls.push(PipelineCall::CheckError);
        match self.pending_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
