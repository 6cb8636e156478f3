//! Integration tests: steps, edges and hit testing agree under one transform.

use jf_core::id::StepId;
use jf_core::map::JourneyMap;
use jf_core::model::Step;
use jf_core::transform::CanvasTransform;
use jf_render::frame::{EDGE_COLOR, EDGE_HOVER_COLOR, Frame, FrameInput};
use jf_render::hit::{self, StepPart};
use jf_render::render_svg;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn pair(prefix: &str) -> (JourneyMap, StepId, StepId) {
    let mut map = JourneyMap::new();
    let a = map.add_step(Step::new(StepId::intern(&format!("{prefix}-a")), 0.0, 0.0));
    let b = map.add_step(Step::new(StepId::intern(&format!("{prefix}-b")), 600.0, 200.0));
    map.connect(a, b).unwrap();
    (map, a, b)
}

#[test]
fn edges_follow_cards_under_pan_and_scale() {
    let (map, a, b) = pair("layers-pan");
    let t = CanvasTransform::new(35.0, -20.0, 0.5).unwrap();
    let frame = Frame::build(&map, t, &FrameInput::default());

    let edge = &frame.edges[0];
    let from = frame.step(a).unwrap().rect;
    let to = frame.step(b).unwrap().rect;
    assert_eq!(edge.curve.p0, from.center());
    assert_eq!(edge.curve.p2, to.center());
    assert_eq!((from.x0, from.y0), (35.0, -20.0));
    assert_eq!(from.width(), 140.0);

    // Arrow stops on the target's boundary, not its centre.
    let tip = edge.arrow_tip;
    assert!(!to.contains(tip));
    assert!((tip.x - to.x0).abs() < 0.01);
}

#[test]
fn hover_changes_style_only() {
    let (map, _, _) = pair("layers-hover");
    let id = map.connections()[0].id;
    let plain = Frame::build(&map, CanvasTransform::IDENTITY, &FrameInput::default());
    let hovered_set: HashSet<_> = [id].into_iter().collect();
    let hovered = Frame::build(
        &map,
        CanvasTransform::IDENTITY,
        &FrameInput {
            hovered_connections: Some(&hovered_set),
            ..Default::default()
        },
    );
    assert_eq!(plain.edges[0].stroke, EDGE_COLOR);
    assert_eq!(hovered.edges[0].stroke, EDGE_HOVER_COLOR);
    assert_eq!(plain.edges[0].curve, hovered.edges[0].curve);
    assert_eq!(hit::edge_delete_button_at(&plain, plain.edges[0].midpoint.x, plain.edges[0].midpoint.y), None);
    assert_eq!(
        hit::edge_delete_button_at(&hovered, hovered.edges[0].midpoint.x, hovered.edges[0].midpoint.y),
        Some(id)
    );
}

#[test]
fn hit_testing_uses_screen_space() {
    let (map, _, b) = pair("layers-hit");
    let t = CanvasTransform::new(100.0, 100.0, 2.0).unwrap();
    // Card b spans screen (1300, 500)..(1860, 820) at this transform.
    let hit = hit::hit_test(&map, &t, Some(b), 1500.0, 600.0).unwrap();
    assert_eq!((hit.step, hit.part), (b, StepPart::Body));
    assert_eq!(hit::step_at(&map, &t, 1290.0, 600.0), None);

    let frame = Frame::build(&map, t, &FrameInput::default());
    let mid = frame.edges[0].midpoint;
    assert_eq!(hit::edge_at(&frame, mid.x, mid.y + 5.0), Some(map.connections()[0].id));
    assert_eq!(hit::edge_at(&frame, mid.x, mid.y + 60.0), None);
}

#[test]
fn connect_preview_starts_at_source_centre() {
    let (map, a, b) = pair("layers-preview");
    let t = CanvasTransform::new(10.0, 0.0, 1.0).unwrap();
    let frame = Frame::build(
        &map,
        t,
        &FrameInput {
            connect_preview: Some((a, (700.0, 250.0))),
            connect_target: Some(b),
            ..Default::default()
        },
    );
    let preview = frame.preview.unwrap();
    assert_eq!(preview.from, frame.step(a).unwrap().rect.center());
    assert_eq!((preview.to.x, preview.to.y), (710.0, 250.0));
    assert!(frame.step(b).unwrap().connect_target);
}

#[test]
fn svg_escapes_user_text() {
    let mut map = JourneyMap::new();
    let id = map.add_step(Step::new(StepId::intern("layers-svg"), 0.0, 0.0));
    map.set_title(id, "Q&A <live>");
    let svg = render_svg(&map);
    assert!(svg.contains("Q&amp;A &lt;live&gt;"));
    assert!(!svg.contains("<live>"));
}
