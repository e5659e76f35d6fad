//! Canvas double that records every call.
//!
//! Drawers and the orchestrator are tested against this backend: each fill,
//! stroke and text call is stored with the transform and scissor in effect,
//! so tests can assert on exactly what would reach the screen.

use glam::{Affine2, Vec2};

use super::{Canvas, FontHandle, ImageHandle, Paint, Shape, StateStack, TextStyle};
use crate::colors::Color;
use crate::geometry::Rect;

/// Owned copy of a [`Shape`].
#[derive(Clone, PartialEq, Debug)]
pub enum RecordedShape {
    Polygon(Vec<Vec2>),
    Rect(Rect),
    RoundedRect { rect: Rect, radius: f32 },
    Circle { center: Vec2, radius: f32 },
}

impl From<&Shape<'_>> for RecordedShape {
    fn from(shape: &Shape<'_>) -> Self {
        match *shape {
            Shape::Polygon(points) => Self::Polygon(points.to_vec()),
            Shape::Rect(rect) => Self::Rect(rect),
            Shape::RoundedRect { rect, radius } => Self::RoundedRect { rect, radius },
            Shape::Circle { center, radius } => Self::Circle { center, radius },
        }
    }
}

/// One recorded canvas call.
#[derive(Clone, PartialEq, Debug)]
pub enum DrawCommand {
    BeginFrame {
        width: u32,
        height: u32,
    },
    EndFrame,
    Fill {
        shape: RecordedShape,
        paint: Paint,
        transform: Affine2,
        scissor: Option<Rect>,
    },
    Stroke {
        shape: RecordedShape,
        color: Color,
        width: f32,
        transform: Affine2,
        scissor: Option<Rect>,
    },
    Text {
        pos: Vec2,
        text: String,
        style: TextStyle,
        transform: Affine2,
        scissor: Option<Rect>,
    },
}

impl DrawCommand {
    /// Fill, stroke and text calls produce pixels; frame markers do not.
    pub const fn is_draw_call(&self) -> bool { matches!(self, Self::Fill { .. } | Self::Stroke { .. } | Self::Text { .. }) }
}

/// Recording canvas backend.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    state: StateStack,
    fonts: Vec<String>,
    images: Vec<String>,
    missing: Vec<String>,
    frame_open: bool,
}

impl RecordingCanvas {
    pub fn new() -> Self { Self::default() }

    /// Pretend an asset path does not exist.
    pub fn with_missing_asset(
        mut self,
        path: &str,
    ) -> Self {
        self.missing.push(path.to_owned());
        self
    }

    pub fn commands(&self) -> &[DrawCommand] { &self.commands }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) { self.commands.clear(); }

    /// Number of fill, stroke and text calls.
    pub fn draw_call_count(&self) -> usize { self.commands.iter().filter(|c| c.is_draw_call()).count() }

    /// Every drawn string, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First text command drawing exactly `needle`.
    pub fn find_text(
        &self,
        needle: &str,
    ) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .find(|c| matches!(c, DrawCommand::Text { text, .. } if text == needle))
    }

    /// Every fill call.
    pub fn fills(&self) -> Vec<(&RecordedShape, &Paint)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { shape, paint, .. } => Some((shape, paint)),
                _ => None,
            })
            .collect()
    }

    /// Name a font handle was created with.
    pub fn font_name(
        &self,
        font: FontHandle,
    ) -> Option<&str> {
        self.fonts.get(font.0 as usize).map(String::as_str)
    }

    /// Path an image handle was created from.
    pub fn image_path(
        &self,
        image: ImageHandle,
    ) -> Option<&str> {
        self.images.get(image.0 as usize).map(String::as_str)
    }

    /// Whether a frame is open (between begin and end).
    pub const fn frame_open(&self) -> bool { self.frame_open }

    /// Save-stack depth; non-zero after a frame means an unbalanced save.
    pub fn save_depth(&self) -> usize { self.state.depth() }
}

impl Canvas for RecordingCanvas {
    fn begin_frame(
        &mut self,
        width: u32,
        height: u32,
    ) {
        self.state.reset();
        self.frame_open = true;
        self.commands.push(DrawCommand::BeginFrame { width, height });
    }

    fn end_frame(&mut self) {
        self.frame_open = false;
        self.commands.push(DrawCommand::EndFrame);
    }

    fn create_font(
        &mut self,
        name: &str,
        path: &str,
    ) -> Option<FontHandle> {
        if self.missing.iter().any(|m| m == path) {
            return None;
        }
        self.fonts.push(name.to_owned());
        Some(FontHandle(self.fonts.len() as u32 - 1))
    }

    fn create_image(
        &mut self,
        path: &str,
    ) -> Option<ImageHandle> {
        if self.missing.iter().any(|m| m == path) {
            return None;
        }
        self.images.push(path.to_owned());
        Some(ImageHandle(self.images.len() as u32 - 1))
    }

    fn save(&mut self) { self.state.save(); }

    fn restore(&mut self) { self.state.restore(); }

    fn transform(
        &mut self,
        t: Affine2,
    ) {
        self.state.transform(t);
    }

    fn reset_transform(&mut self) { self.state.reset_transform(); }

    fn scissor(
        &mut self,
        rect: Rect,
    ) {
        self.state.scissor(rect);
    }

    fn reset_scissor(&mut self) { self.state.reset_scissor(); }

    fn fill(
        &mut self,
        shape: &Shape<'_>,
        paint: &Paint,
    ) {
        let current = self.state.current();
        self.commands.push(DrawCommand::Fill {
            shape: shape.into(),
            paint: *paint,
            transform: current.transform,
            scissor: current.scissor,
        });
    }

    fn stroke(
        &mut self,
        shape: &Shape<'_>,
        color: Color,
        width: f32,
    ) {
        let current = self.state.current();
        self.commands.push(DrawCommand::Stroke {
            shape: shape.into(),
            color,
            width,
            transform: current.transform,
            scissor: current.scissor,
        });
    }

    fn text(
        &mut self,
        pos: Vec2,
        text: &str,
        style: &TextStyle,
    ) {
        let current = self.state.current();
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_owned(),
            style: *style,
            transform: current.transform,
            scissor: current.scissor,
        });
    }
}
