//! Left measurement panel and the bottom diagnostic line.
//!
//! The panel stacks [`Measure`] blocks from the top of its frame: relative
//! distance and relative speed of the first lead always, then battery level,
//! body temperature and average CPU temperature when their feature flags are
//! on. Each block picks its value color from [`crate::thresholds`]; the frame
//! is stroked last, sized to whatever was stacked.
//!
//! # Color Rules
//!
//! | Block     | Amber          | Red             |
//! |-----------|----------------|-----------------|
//! | REL DIST  | `(int)d < 30`  | `(int)d < 10`   |
//! | REL SPEED | `(int)v < 0`   | `(int)v < -5`   |
//! | BODY Temp | `> 48 C`       | `> 55 C`        |
//! | CPU Temp  | `> 80 C`       | `> 92 C`        |

use core::fmt::Write;

use glam::Vec2;
use heapless::String;

use super::RenderContext;
use super::primitives::{Measure, draw_measure, draw_text, stroke_rect};
use crate::canvas::Canvas;
use crate::colors::{CRITICAL_RED, Color, PANEL_FRAME, VALUE_WHITE, WARNING_AMBER, white_alpha};
use crate::config::BDR_S;
use crate::config::layout::{DIAG_BOTTOM_MARGIN, PANEL_RADIUS, PANEL_STROKE, PANEL_W, PANEL_X, PANEL_Y};
use crate::geometry::Rect;
use crate::resources::FontId;
use crate::scene::{Diagnostics, UnitSystem};
use crate::styles::{DIAGNOSTIC_SIZE, LEFT_MIDDLE, PANEL_LABEL_SIZE, PANEL_UNIT_SIZE, PANEL_VALUE_SIZE, scaled};
use crate::thresholds::{
    AMBIENT_TEMP_CRITICAL, AMBIENT_TEMP_WARNING, CPU_TEMP_CRITICAL, CPU_TEMP_WARNING, LEAD_DISTANCE_CRITICAL,
    LEAD_DISTANCE_WARNING, MS_TO_KPH, REL_MS_TO_MPH, REL_SPEED_CRITICAL, REL_SPEED_WARNING, is_batteryless,
};

/// Value shown in the lead blocks when there is no lead.
const NO_LEAD: &str = "-";

/// Padding above the first block.
const PANEL_TOP_PAD: i32 = 5;

/// Padding below the last block.
const PANEL_BOTTOM_PAD: i32 = 20;

// =============================================================================
// Color Rules
// =============================================================================

pub fn distance_color(distance: f32) -> Color {
    let d = distance as i32;
    if d < LEAD_DISTANCE_CRITICAL {
        CRITICAL_RED
    } else if d < LEAD_DISTANCE_WARNING {
        WARNING_AMBER
    } else {
        VALUE_WHITE
    }
}

pub fn rel_speed_color(rel_speed: f32) -> Color {
    let v = rel_speed as i32;
    if v < REL_SPEED_CRITICAL {
        CRITICAL_RED
    } else if v < REL_SPEED_WARNING {
        WARNING_AMBER
    } else {
        VALUE_WHITE
    }
}

fn rising_color(
    value: f32,
    warning: f32,
    critical: f32,
) -> Color {
    if value > critical {
        CRITICAL_RED
    } else if value > warning {
        WARNING_AMBER
    } else {
        VALUE_WHITE
    }
}

pub fn ambient_temp_color(temp_c: f32) -> Color { rising_color(temp_c, AMBIENT_TEMP_WARNING, AMBIENT_TEMP_CRITICAL) }

pub fn cpu_temp_color(temp_c: f32) -> Color { rising_color(temp_c, CPU_TEMP_WARNING, CPU_TEMP_CRITICAL) }

/// Relative speed in display units.
pub fn rel_speed_value(
    rel_speed: f32,
    units: UnitSystem,
) -> i32 {
    let factor = if units.is_metric() { MS_TO_KPH } else { REL_MS_TO_MPH };
    (rel_speed * factor + 0.5) as i32
}

// =============================================================================
// Drawers
// =============================================================================

/// Measurement blocks plus their frame.
pub fn draw_measures_panel<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let height = draw_panel_blocks(ctx) + PANEL_BOTTOM_PAD;
    let frame = Rect::new(PANEL_X as f32, PANEL_Y as f32, PANEL_W as f32, height as f32);
    stroke_rect(ctx.canvas, frame, PANEL_FRAME, PANEL_STROKE, PANEL_RADIUS);
}

/// Running position while blocks are stacked top to bottom.
struct PanelStack {
    x: i32,
    y: i32,
    unit_dx: i32,
    height: i32,
}

impl PanelStack {
    fn new() -> Self {
        Self {
            x: PANEL_X + PANEL_W / 2,
            y: PANEL_Y,
            unit_dx: (PANEL_W as f32 / 2.0 - scaled(PANEL_UNIT_SIZE)) as i32,
            height: PANEL_TOP_PAD,
        }
    }

    fn push<C: Canvas>(
        &mut self,
        ctx: &mut RenderContext<'_, C>,
        value: &str,
        unit: &str,
        label: &str,
        value_color: Color,
    ) {
        let measure = Measure {
            value,
            unit,
            label,
            value_color,
            label_color: white_alpha(200),
            unit_color: white_alpha(200),
            value_size: PANEL_VALUE_SIZE as i32,
            label_size: PANEL_LABEL_SIZE as i32,
            unit_size: PANEL_UNIT_SIZE as i32,
        };
        self.height += draw_measure(ctx.canvas, ctx.resources, &measure, self.x, self.y, self.unit_dx);
        self.y = PANEL_Y + self.height;
    }
}

/// Stack every enabled block; returns the stacked height.
fn draw_panel_blocks<C: Canvas>(ctx: &mut RenderContext<'_, C>) -> i32 {
    let scene = ctx.scene;
    let lead = scene.lead_one();
    let mut stack = PanelStack::new();
    let mut value: String<16> = String::new();

    if lead.status {
        write!(value, "{}", lead.distance as i32).ok();
    } else {
        value.push_str(NO_LEAD).ok();
    }
    let color = if lead.status { distance_color(lead.distance) } else { VALUE_WHITE };
    stack.push(ctx, &value, "m", "REL DIST", color);

    value.clear();
    if lead.status {
        write!(value, "{}", rel_speed_value(lead.rel_speed, scene.units)).ok();
    } else {
        value.push_str(NO_LEAD).ok();
    }
    let color = if lead.status { rel_speed_color(lead.rel_speed) } else { VALUE_WHITE };
    stack.push(ctx, &value, scene.units.speed_label(), "REL SPEED", color);

    let device = &scene.device;
    if ctx.features.battery_level && !is_batteryless(device.battery_temp_c) {
        value.clear();
        write!(value, "{}%", device.battery_percent).ok();
        stack.push(ctx, &value, "", "BAT LVL", VALUE_WHITE);
    }

    if ctx.features.ambient_temp {
        value.clear();
        write!(value, "{:.1}°", device.ambient_temp_c).ok();
        stack.push(ctx, &value, "", "BODY Temp", ambient_temp_color(device.ambient_temp_c));
    }

    if ctx.features.cpu_temp {
        let cpu = device.cpu_temp_mean();
        value.clear();
        write!(value, "{cpu:.1}°").ok();
        stack.push(ctx, &value, "", "CPU Temp", cpu_temp_color(cpu));
    }

    stack.height
}

/// Longest `{:.2}` rendering of an `f32`: sign, 39 integer digits, point, 2 decimals.
const DIAG_FIELD_MAX: usize = 43;

/// Fixed text of the diagnostic line around its eight fields.
const DIAG_LITERAL_LEN: usize = 41;

/// Capacity that fits the diagnostic line for any field values.
pub const DIAG_TEXT_CAPACITY: usize = DIAG_LITERAL_LEN + 8 * DIAG_FIELD_MAX;

/// Format the diagnostic line.
pub fn diagnostics_text(diag: &Diagnostics) -> String<DIAG_TEXT_CAPACITY> {
    let mut text = String::new();
    write!(
        text,
        "AO({:.2}/{:.2}) SR({:.2}) SRC({:.2}) SAD({:.2}) LAD({:.2}) LAT({:.2}) CURV({:.2})",
        diag.angle_offset,
        diag.angle_offset_average,
        diag.steer_ratio,
        diag.steer_rate_cost,
        diag.steer_actuator_delay,
        diag.longitudinal_actuator_delay,
        diag.lead_accel_tau,
        diag.curvature_factor,
    )
    .ok();
    text
}

/// Tuning values along the bottom-left edge.
pub fn draw_diagnostics<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let text = diagnostics_text(&ctx.scene.diagnostics);
    let pos = Vec2::new((BDR_S * 2) as f32, (ctx.viewport.height() as i32 - DIAG_BOTTOM_MARGIN) as f32);
    draw_text(
        ctx.canvas,
        pos,
        &text,
        ctx.resources.font(FontId::SansSemibold),
        scaled(DIAGNOSTIC_SIZE),
        white_alpha(200),
        LEFT_MIDDLE,
    );
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordedShape};
    use crate::config::HudFeatures;
    use crate::scene::{LeadSnapshot, SceneSnapshot};
    use crate::widgets::testing::Fixture;

    fn value_color(
        fixture: &Fixture,
        text: &str,
    ) -> Color {
        match fixture.canvas.find_text(text) {
            Some(DrawCommand::Text { style, .. }) => style.color,
            other => panic!("{text} drawn as {other:?}"),
        }
    }

    fn frame_height(fixture: &Fixture) -> f32 {
        let strokes: Vec<_> = fixture
            .canvas
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Stroke { shape: RecordedShape::RoundedRect { rect, .. }, .. } => Some(rect.h),
                _ => None,
            })
            .collect();
        assert_eq!(strokes.len(), 1, "exactly one frame stroke");
        strokes[0]
    }

    fn scene_with_lead(
        distance: f32,
        rel_speed: f32,
    ) -> SceneSnapshot {
        let mut scene = SceneSnapshot::default();
        scene.leads[0] = LeadSnapshot {
            status: true,
            distance,
            rel_speed,
            screen: Vec2::ZERO,
        };
        scene
    }

    #[test]
    fn test_distance_colors() {
        assert_eq!(distance_color(35.0), VALUE_WHITE);
        assert_eq!(distance_color(30.9), VALUE_WHITE, "truncated to 30");
        assert_eq!(distance_color(25.0), WARNING_AMBER);
        assert_eq!(distance_color(9.9), CRITICAL_RED);
    }

    #[test]
    fn test_rel_speed_colors_and_value() {
        assert_eq!(rel_speed_color(-0.5), VALUE_WHITE, "truncates toward zero");
        assert_eq!(rel_speed_color(-1.0), WARNING_AMBER);
        assert_eq!(rel_speed_color(-6.0), CRITICAL_RED);
        assert_eq!(rel_speed_value(-2.0, UnitSystem::Metric), -6);
        assert_eq!(rel_speed_value(10.0, UnitSystem::Imperial), 22);
    }

    #[test]
    fn test_temperature_colors() {
        assert_eq!(ambient_temp_color(48.0), VALUE_WHITE);
        assert_eq!(ambient_temp_color(50.0), WARNING_AMBER);
        assert_eq!(ambient_temp_color(56.0), CRITICAL_RED);
        assert_eq!(cpu_temp_color(80.5), WARNING_AMBER);
        assert_eq!(cpu_temp_color(93.0), CRITICAL_RED);
    }

    #[test]
    fn test_close_lead_is_red() {
        let mut fixture = Fixture::new();
        fixture.draw(&scene_with_lead(5.0, -2.0), draw_measures_panel);
        assert_eq!(value_color(&fixture, "5"), CRITICAL_RED);
        assert_eq!(value_color(&fixture, "-6"), WARNING_AMBER);
    }

    #[test]
    fn test_no_lead_shows_dashes() {
        let mut fixture = Fixture::new();
        fixture.draw(&SceneSnapshot::default(), draw_measures_panel);
        let texts = fixture.canvas.texts();
        assert_eq!(&texts[..6], &["-", "REL DIST", "m", "-", "REL SPEED", "km/h"]);
    }

    #[test]
    fn test_frame_sized_to_blocks() {
        let mut fixture = Fixture::new();
        let mut scene = scene_with_lead(20.0, 0.0);
        scene.device.battery_temp_c = 30.0;
        fixture.draw(&scene, draw_measures_panel);
        assert!((frame_height(&fixture) - 610.0).abs() < f32::EPSILON, "5 blocks of 117 plus padding");

        scene.device.battery_temp_c = -30.0;
        fixture.draw(&scene, draw_measures_panel);
        assert!(fixture.canvas.find_text("BAT LVL").is_none(), "batteryless device");
        assert!((frame_height(&fixture) - 493.0).abs() < f32::EPSILON);

        fixture.features = HudFeatures::NONE;
        fixture.draw(&scene, draw_measures_panel);
        assert!((frame_height(&fixture) - 259.0).abs() < f32::EPSILON, "lead blocks only");
    }

    #[test]
    fn test_blocks_stack_downward() {
        let mut fixture = Fixture::new();
        fixture.features = HudFeatures::NONE;
        fixture.draw(&scene_with_lead(20.0, 0.0), draw_measures_panel);
        let y_of = |text: &str| match fixture.canvas.find_text(text) {
            Some(DrawCommand::Text { pos, .. }) => pos.y,
            other => panic!("{other:?}"),
        };
        assert!((y_of("REL DIST") - 387.0).abs() < f32::EPSILON);
        assert!((y_of("REL SPEED") - 509.0).abs() < f32::EPSILON, "second block starts 122 px lower");
    }

    #[test]
    fn test_diagnostics_line() {
        let diag = Diagnostics {
            steer_ratio: 15.5,
            curvature_factor: 0.98,
            ..Diagnostics::default()
        };
        assert_eq!(
            diagnostics_text(&diag).as_str(),
            "AO(0.00/0.00) SR(15.50) SRC(0.00) SAD(0.00) LAD(0.00) LAT(0.00) CURV(0.98)"
        );

        let mut fixture = Fixture::new();
        fixture.draw(&SceneSnapshot::default(), draw_diagnostics);
        match fixture.canvas.commands().iter().find(|c| c.is_draw_call()) {
            Some(DrawCommand::Text { pos, style, .. }) => {
                assert_eq!(*pos, Vec2::new(60.0, 1056.0));
                assert_eq!(style.align, LEFT_MIDDLE);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_diagnostics_extreme_values_keep_every_field() {
        let diag = Diagnostics {
            angle_offset: f32::MIN,
            angle_offset_average: f32::MIN,
            steer_ratio: f32::MIN,
            steer_rate_cost: f32::MIN,
            steer_actuator_delay: f32::MIN,
            longitudinal_actuator_delay: f32::MIN,
            lead_accel_tau: f32::MIN,
            curvature_factor: f32::MIN,
        };
        let text = diagnostics_text(&diag);
        assert_eq!(text.len(), DIAG_TEXT_CAPACITY, "worst case fills the buffer exactly");
        assert!(text.ends_with("CURV(-340282346638528859811704183484516925440.00)"), "{text}");
    }
}
