// Crate-level lints: Allow common graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // Intentional f32->i32, u32->i32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u32/i32->f32 in graphics calculations
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for viewport sizes
#![allow(clippy::cast_sign_loss)] // f32->u8 alpha after clamping
#![allow(clippy::struct_excessive_bools)] // Telemetry records mirror the published flags
#![allow(clippy::similar_names)] // cx/cy, rx/ry in layout math are clear
#![allow(clippy::module_name_repetitions)] // RecordingCanvas in canvas, PipelineError in pipeline

//! Driving-assistance HUD compositor.
//!
//! Every display tick the [`Compositor`](render::Compositor) blits the latest
//! camera frame through the camera-to-screen projection, then opens a vector
//! canvas frame and runs the overlay drawers in a fixed order: lane lines,
//! road edges and predicted path, lead chevrons, the speed header, the badge
//! row, the measurement panel and the diagnostic line. All visual parameters
//! come from one [`SceneSnapshot`](scene::SceneSnapshot) read per frame.
//!
//! # Module Organization
//!
//! - [`config`]: Layout constants, device profiles, panel feature flags
//! - [`colors`]: RGBA color type, named colors, status colors
//! - [`thresholds`]: Unit conversions, color thresholds, lead indicator constants
//! - [`styles`]: Text anchors and type sizes
//! - [`geometry`]: Viewport geometry, projection and canvas transforms, resize fence
//! - [`telemetry`]: Channels, typed records, the snapshot store
//! - [`scene`]: Per-frame scene snapshot and decoded control modes
//! - [`canvas`]: 2D vector canvas seam plus recording and raster backends
//! - [`pipeline`]: 3D pipeline seam (video blit) plus recording and software backends
//! - [`framebuffer`]: RGBA framebuffer shared by the software backends
//! - [`resources`]: Font and image identifiers resolved at startup
//! - [`widgets`]: Draw primitives and overlay drawers
//! - [`render`]: Frame orchestration
//!
//! # Backends
//!
//! The compositor is generic over a [`FramePipeline`](pipeline::FramePipeline)
//! and a [`Canvas`](canvas::Canvas). The software pair
//! ([`SoftwarePipeline`](pipeline::SoftwarePipeline) and
//! [`RasterCanvas`](canvas::RasterCanvas)) renders into a shared
//! [`Framebuffer`](framebuffer::Framebuffer) that is also an
//! `embedded-graphics` draw target; the recording pair captures every call
//! for tests.

pub mod canvas;
pub mod colors;
pub mod config;
pub mod framebuffer;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod resources;
pub mod scene;
pub mod styles;
pub mod telemetry;
pub mod thresholds;
pub mod widgets;
