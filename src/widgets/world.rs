//! World-space overlays: lane lines, road edges, the predicted path and the
//! lead vehicle chevrons.
//!
//! Vertex lists arrive already mapped to screen space. The orchestrator clips
//! these drawers to the viewport and skips them while model outputs are stale.
//!
//! # Lead Chevron Mapping
//!
//! | Quantity | Rule |
//! |----------|------|
//! | alpha    | `255 * (1 - d/40)`, plus `255 * (-v/10)` when closing, capped at 255; 0 for `d >= 40` |
//! | size     | `clamp(750 / (d/3 + 30), 15, 30) * 2.35` |
//! | x        | `clamp(x, 0, width - size/2)` |
//! | y        | `min(y, height - 0.6 * size)` |

use glam::Vec2;

use super::RenderContext;
use super::primitives::{draw_chevron, fill_vertices};
use crate::canvas::{Canvas, Paint};
use crate::colors::{Color, RED, WHITE, YELLOW, red_alpha, white_alpha};
use crate::scene::LeadSnapshot;
use crate::thresholds::{
    CHEVRON_MAX_SIZE, CHEVRON_MIN_SIZE, CHEVRON_SCALE, LEAD_ALPHA_DISTANCE, LEAD_ALPHA_SPEED, SECOND_LEAD_SEPARATION,
};

// =============================================================================
// Mapping Rules
// =============================================================================

/// Chevron body alpha for a lead at `distance` m closing at `-rel_speed` m/s.
pub fn lead_fill_alpha(
    distance: f32,
    rel_speed: f32,
) -> u8 {
    if distance >= LEAD_ALPHA_DISTANCE {
        return 0;
    }
    let mut alpha = 255.0 * (1.0 - distance / LEAD_ALPHA_DISTANCE);
    if rel_speed < 0.0 {
        alpha += 255.0 * (-rel_speed / LEAD_ALPHA_SPEED);
    }
    alpha.clamp(0.0, 255.0) as u8
}

/// Chevron size for a lead at `distance` m.
pub fn chevron_size(distance: f32) -> f32 {
    let base = (25.0 * 30.0) / (distance / 3.0 + 30.0);
    base.clamp(CHEVRON_MIN_SIZE, CHEVRON_MAX_SIZE) * CHEVRON_SCALE
}

/// Keep the chevron inside the viewport horizontally and off the bottom edge.
pub fn chevron_position(
    anchor: Vec2,
    size: f32,
    width: f32,
    height: f32,
) -> Vec2 {
    let x = anchor.x.max(0.0).min(width - size / 2.0);
    let y = anchor.y.min(height - size * 0.6);
    Vec2::new(x, y)
}

/// Second lead is drawn only when it is clearly apart from the first.
pub fn second_lead_visible(
    lead_one: &LeadSnapshot,
    lead_two: &LeadSnapshot,
) -> bool {
    lead_two.status && (lead_one.distance - lead_two.distance).abs() > SECOND_LEAD_SEPARATION
}

/// Road edge alpha from the standard deviation of its position.
pub fn road_edge_alpha(std: f32) -> f32 { (1.0 - std).clamp(0.0, 1.0) }

/// Vertical fade of the predicted path, opaque at the bottom edge.
pub fn path_paint(
    width: f32,
    height: f32,
    end_to_end: bool,
) -> Paint {
    let (inner, outer) = if end_to_end { (RED, red_alpha(0)) } else { (WHITE, white_alpha(0)) };
    Paint::LinearGradient {
        start: Vec2::new(width, height),
        end: Vec2::new(width, height * 0.4),
        inner,
        outer,
    }
}

// =============================================================================
// Drawers
// =============================================================================

/// Lane lines and road edges (unless end-to-end), then the path.
pub fn draw_lane_lines<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let scene = ctx.scene;
    if !scene.end_to_end {
        for line in &scene.lane_lines {
            let color = Color::rgbaf(1.0, 1.0, 1.0, line.probability.clamp(0.0, 1.0));
            fill_vertices(ctx.canvas, &line.vertices, &Paint::Solid(color));
        }
        for edge in &scene.road_edges {
            let color = Color::rgbaf(1.0, 0.0, 0.0, road_edge_alpha(edge.std));
            fill_vertices(ctx.canvas, &edge.vertices, &Paint::Solid(color));
        }
    }
    let paint = path_paint(ctx.width(), ctx.height(), scene.end_to_end);
    fill_vertices(ctx.canvas, &scene.track, &paint);
}

/// Lead chevrons, only while longitudinal control is active.
pub fn draw_leads<C: Canvas>(ctx: &mut RenderContext<'_, C>) {
    let scene = ctx.scene;
    if !scene.longitudinal_control {
        return;
    }
    let (lead_one, lead_two) = (scene.lead_one(), scene.lead_two());
    if lead_one.status {
        draw_lead(ctx, lead_one);
    }
    if second_lead_visible(lead_one, lead_two) {
        draw_lead(ctx, lead_two);
    }
}

fn draw_lead<C: Canvas>(
    ctx: &mut RenderContext<'_, C>,
    lead: &LeadSnapshot,
) {
    let size = chevron_size(lead.distance);
    let pos = chevron_position(lead.screen, size, ctx.width(), ctx.height());
    let fill = red_alpha(lead_fill_alpha(lead.distance, lead.rel_speed));
    draw_chevron(ctx.canvas, pos, size, fill, YELLOW);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordedShape;
    use crate::scene::SceneSnapshot;
    use crate::widgets::testing::Fixture;

    fn lead(
        distance: f32,
        rel_speed: f32,
    ) -> LeadSnapshot {
        LeadSnapshot {
            status: true,
            distance,
            rel_speed,
            screen: Vec2::new(1080.0, 700.0),
        }
    }

    #[test]
    fn test_alpha_zero_beyond_forty_meters() {
        for d in [40.0, 40.5, 80.0, 250.0] {
            assert_eq!(lead_fill_alpha(d, -5.0), 0, "d = {d}");
        }
    }

    #[test]
    fn test_alpha_monotonic_in_distance() {
        let mut previous = u8::MAX;
        for step in 0..40 {
            let alpha = lead_fill_alpha(step as f32, 0.0);
            assert!(alpha < previous || step == 0, "alpha rose at d = {step}");
            previous = alpha;
        }
        assert_eq!(lead_fill_alpha(0.0, 0.0), 255);
    }

    #[test]
    fn test_closing_speed_only_increases_alpha() {
        for d in [5.0, 20.0, 35.0] {
            let base = lead_fill_alpha(d, 0.0);
            assert!(lead_fill_alpha(d, -3.0) >= base);
            assert_eq!(lead_fill_alpha(d, 4.0), base, "opening speed adds nothing");
        }
        assert_eq!(lead_fill_alpha(30.0, -100.0), 255, "capped at 255");
    }

    #[test]
    fn test_close_lead_chevron() {
        // d = 5 -> 750 / 31.67 = 23.68 (inside the band), alpha saturates
        let size = chevron_size(5.0);
        assert!((size - 23.684_21 * 2.35).abs() < 1e-3, "size {size}");
        assert_eq!(lead_fill_alpha(5.0, -2.0), 255);
        assert!((chevron_size(0.0) - 25.0 * 2.35).abs() < 1e-4);
        assert!((chevron_size(1000.0) - 15.0 * 2.35).abs() < 1e-4);
    }

    #[test]
    fn test_chevron_position_clamps() {
        let size = 50.0;
        let p = chevron_position(Vec2::new(5000.0, 5000.0), size, 2160.0, 1080.0);
        assert!((p.x - (2160.0 - 25.0)).abs() < 1e-4);
        assert!((p.y - (1080.0 - 30.0)).abs() < 1e-4);

        let p = chevron_position(Vec2::new(-40.0, 300.0), size, 2160.0, 1080.0);
        assert_eq!(p, Vec2::new(0.0, 300.0));
    }

    #[test]
    fn test_second_lead_separation() {
        let one = lead(20.0, 0.0);
        assert!(!second_lead_visible(&one, &lead(22.0, 0.0)));
        assert!(!second_lead_visible(&one, &lead(23.0, 0.0)), "exactly 3 m is not enough");
        assert!(second_lead_visible(&one, &lead(23.5, 0.0)));
        let hidden = LeadSnapshot { status: false, ..lead(60.0, 0.0) };
        assert!(!second_lead_visible(&one, &hidden));
    }

    #[test]
    fn test_road_edge_alpha() {
        assert!((road_edge_alpha(0.25) - 0.75).abs() < f32::EPSILON);
        assert!(road_edge_alpha(3.0).abs() < f32::EPSILON);
        assert!((road_edge_alpha(-1.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_lane_lines_skip_empty_and_end_to_end() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        scene.lane_lines[1].vertices.extend([Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(5.0, 9.0)]);
        scene.lane_lines[1].probability = 0.6;
        scene.track.extend([Vec2::new(0.0, 1080.0), Vec2::new(20.0, 500.0), Vec2::new(40.0, 1080.0)]);

        let canvas = fixture.draw(&scene, draw_lane_lines);
        let fills = canvas.fills();
        assert_eq!(fills.len(), 2, "one lane line plus the path");
        assert!(matches!(fills[0].1, Paint::Solid(c) if (c.a - 0.6).abs() < 1e-6));
        assert!(matches!(fills[1].1, Paint::LinearGradient { inner, .. } if *inner == WHITE));

        scene.end_to_end = true;
        let canvas = fixture.draw(&scene, draw_lane_lines);
        let fills = canvas.fills();
        assert_eq!(fills.len(), 1, "end-to-end draws only the path");
        assert!(matches!(fills[0].1, Paint::LinearGradient { inner, .. } if *inner == RED));
    }

    #[test]
    fn test_leads_need_longitudinal_control() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        scene.leads = [lead(10.0, -1.0), lead(30.0, 0.0)];

        assert_eq!(fixture.draw(&scene, draw_leads).draw_call_count(), 0);

        scene.longitudinal_control = true;
        let canvas = fixture.draw(&scene, draw_leads);
        assert_eq!(canvas.draw_call_count(), 4, "two chevrons of two triangles");
    }

    #[test]
    fn test_close_lead_drawn_high_alpha_near_bottom() {
        let mut fixture = Fixture::new();
        let mut scene = SceneSnapshot::default();
        scene.longitudinal_control = true;
        scene.leads[0] = LeadSnapshot { screen: Vec2::new(1080.0, 2000.0), ..lead(5.0, -2.0) };

        let canvas = fixture.draw(&scene, draw_leads);
        let fills = canvas.fills();
        assert_eq!(fills.len(), 2);
        match fills[1] {
            (RecordedShape::Polygon(points), Paint::Solid(color)) => {
                assert_eq!(color.alpha_u8(), 255);
                let size = chevron_size(5.0);
                assert!((points[1].y - (1080.0 - size * 0.6)).abs() < 1e-3, "apex clamped above the bottom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
