//! HUD compositor simulator for desktop.
//!
//! Drives the compositor with a synthetic drive and camera, rendering through
//! the software backends into a shared framebuffer that is shown, downscaled,
//! in an `embedded-graphics-simulator` window.
//!
//! # Keys
//!
//! | Key | Toggle |
//! |-----|--------|
//! | M | metric / imperial units |
//! | E | end-to-end path (no lane lines) |
//! | A | mid-size alert |
//! | L | longitudinal control |
//! | C | camera connection |
//! | I | ignition (car started) |
//! | W | model freshness (world objects) |
//! | B | battery block of the measurement panel |
//! | R | viewport resize request |
//! | X | status overlay |

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

mod assets;
mod drive;
mod perception;
mod profiling;
mod timing;
mod video;

use std::thread;
use std::time::Instant;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use hud_compositor::canvas::RasterCanvas;
use hud_compositor::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, HudConfig, HudFeatures};
use hud_compositor::framebuffer::Framebuffer;
use hud_compositor::pipeline::{SoftwarePipeline, VideoSource};
use hud_compositor::render::Compositor;
use hud_compositor::telemetry::SharedTelemetry;
use profont::PROFONT_12_POINT;

use crate::drive::{Drive, DriveToggles};
use crate::profiling::FrameMetrics;
use crate::timing::{DOWNSCALE, FRAME_TIME};
use crate::video::SyntheticCamera;

/// Narrower viewport the R key switches to.
const ALT_WIDTH: u32 = 1920;

fn main() {
    env_logger::init();

    let config = HudConfig::default();
    let framebuffer = Framebuffer::shared(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut canvas = RasterCanvas::new(framebuffer.clone());
    assets::register_images(&mut canvas);
    let pipeline = SoftwarePipeline::new(framebuffer.clone());

    let mut compositor = match Compositor::new(&config, pipeline, canvas, DEFAULT_WIDTH, DEFAULT_HEIGHT) {
        Ok(compositor) => compositor,
        Err(e) => {
            log::error!("HUD init failed: {e}");
            return;
        }
    };
    let resize = compositor.resize_handle();

    let mut display: SimulatorDisplay<Rgb888> =
        SimulatorDisplay::new(Size::new(DEFAULT_WIDTH / DOWNSCALE, DEFAULT_HEIGHT / DOWNSCALE));
    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    let mut window = Window::new("HUD Compositor Sim", &output_settings);

    let telemetry = SharedTelemetry::new();
    let mut camera = SyntheticCamera::new();
    let mut drive = Drive::new();
    let mut toggles = DriveToggles::default();
    let mut features = config.features;
    let mut narrow = false;
    let mut show_status = true;

    let mut metrics = FrameMetrics::new();
    let overlay_style = MonoTextStyle::new(&PROFONT_12_POINT, Rgb888::YELLOW);
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();

        // Handle events
        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::M => toggles.metric = !toggles.metric,
                        Keycode::E => toggles.end_to_end = !toggles.end_to_end,
                        Keycode::A => toggles.alert = !toggles.alert,
                        Keycode::L => toggles.longitudinal = !toggles.longitudinal,
                        Keycode::I => toggles.started = !toggles.started,
                        Keycode::W => toggles.model_fresh = !toggles.model_fresh,
                        Keycode::C => camera.set_connected(!camera.is_connected()),
                        Keycode::B => {
                            features = HudFeatures {
                                battery_level: !features.battery_level,
                                ..features
                            };
                            compositor.set_features(features);
                        }
                        Keycode::R => {
                            narrow = !narrow;
                            resize.request(if narrow { ALT_WIDTH } else { DEFAULT_WIDTH }, DEFAULT_HEIGHT);
                        }
                        Keycode::X => show_status = !show_status,
                        _ => {}
                    }
                    log::debug!("toggles: {toggles:?}");
                }
                _ => {}
            }
        }

        // Advance the drive and publish one consistent update
        let dt = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        drive.step(dt);
        telemetry.publish_batch(drive.records(&toggles, compositor.viewport()));
        if let Err(e) = camera.capture(compositor.viewport().intrinsics(), drive.road(), drive.odometer()) {
            log::error!("camera frame rejected: {e}");
        }

        let render_start = Instant::now();
        let stats = match compositor.draw_frame(&telemetry, &camera) {
            Ok(stats) => Some(stats),
            Err(e) => {
                if cfg!(debug_assertions) {
                    panic!("frame {} failed: {e}", compositor.frame_count());
                }
                log::error!("frame {} failed: {e}", compositor.frame_count());
                None
            }
        };

        display.clear(Rgb888::BLACK).ok();
        framebuffer.borrow().blit_downsampled(&mut display, DOWNSCALE).ok();
        let render_time = render_start.elapsed();

        if show_status {
            Text::new(&metrics.status_line(), Point::new(8, 14), overlay_style).draw(&mut display).ok();
            if !camera.is_connected() {
                Text::new("camera disconnected (C)", Point::new(8, 30), overlay_style).draw(&mut display).ok();
            }
        }
        window.update(&display);

        // Frame timing
        let pre_sleep = frame_start.elapsed();
        if let Some(remaining) = FRAME_TIME.checked_sub(pre_sleep) {
            thread::sleep(remaining);
        }
        let sleep_time = frame_start.elapsed().saturating_sub(pre_sleep);
        metrics.record_frame(frame_start.elapsed(), render_time, sleep_time, stats.as_ref());
    }
}
