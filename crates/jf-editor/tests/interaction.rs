//! Integration tests: pointer gestures through the editor session.

use jf_core::id::StepId;
use jf_core::map::JourneyMap;
use jf_core::model::*;
use jf_core::transform::{CanvasTransform, Viewport};
use jf_editor::interaction::Interaction;
use jf_editor::mutation::apply_mutation;
use jf_editor::session::{EditField, EditorSession, HostRequest};
use pretty_assertions::assert_eq;

const VIEWPORT: Viewport = Viewport {
    width: 1200.0,
    height: 800.0,
};

/// Two cards: A at (0,0), B at (600,0), both 280×160.
fn session_ab(prefix: &str) -> (EditorSession, StepId, StepId) {
    let mut map = JourneyMap::new();
    let a = map.add_step(Step::new(StepId::intern(&format!("{prefix}-a")), 0.0, 0.0));
    let b = map.add_step(Step::new(StepId::intern(&format!("{prefix}-b")), 600.0, 0.0));
    (EditorSession::with_map(map, VIEWPORT), a, b)
}

fn pan_to(session: &mut EditorSession, x: f64, y: f64) {
    // grab empty background far from both cards
    session.pointer_down(1000.0, 700.0);
    session.pointer_move(1000.0 + x, 700.0 + y, 0.0);
    session.pointer_up(1000.0 + x, 700.0 + y);
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_moves_by_screen_delta_at_identity() {
    let (mut s, a, _) = session_ab("drag1");
    assert!(s.pointer_down(100.0, 100.0));
    assert_eq!(s.selected(), Some(a));
    s.pointer_move(130.0, 90.0, 0.0);
    s.pointer_move(150.0, 120.0, 0.0);
    s.pointer_up(150.0, 120.0);

    let step = s.map().step(a).unwrap();
    assert_eq!((step.x, step.y), (50.0, 20.0));
    assert!(s.interaction().is_idle());
    assert!(s.is_dirty());
}

#[test]
fn drag_delta_is_divided_by_scale() {
    // Zoom has no gesture, so drive the controller with a scaled view directly.
    let mut map = JourneyMap::new();
    let a = map.add_step(Step::new(StepId::intern("drag2-a"), 100.0, 50.0));
    let mut view = CanvasTransform::new(50.0, 50.0, 2.0).unwrap();
    let (sx, sy) = view.canvas_to_screen(150.0, 100.0);
    let hit = jf_render::hit::hit_test(&map, &view, None, sx, sy);
    let mut gesture = Interaction::begin(hit, sx, sy, &map, &view);
    assert!(matches!(gesture, Interaction::Dragging { .. }));

    let mutations = gesture.pointer_move(sx + 40.0, sy - 10.0, &map, &mut view);
    for m in mutations {
        apply_mutation(&mut map, m);
    }
    let step = map.step(a).unwrap();
    assert_eq!((step.x, step.y), (120.0, 45.0));
}

#[test]
fn drag_after_pan_keeps_pointer_offset() {
    let (mut s, a, _) = session_ab("drag3");
    pan_to(&mut s, -100.0, 40.0);
    assert_eq!((s.transform().x, s.transform().y), (-100.0, 40.0));

    // A is now on screen at (-100, 40); grab it at (20, 100)
    s.pointer_down(20.0, 100.0);
    s.pointer_move(70.0, 80.0, 0.0);
    s.pointer_up(70.0, 80.0);
    let step = s.map().step(a).unwrap();
    assert_eq!((step.x, step.y), (50.0, -20.0));
}

// ─── Connect ────────────────────────────────────────────────────────────

#[test]
fn connect_a_to_b_creates_one_connection() {
    let (mut s, a, b) = session_ab("conn1");
    // A's connect handle sits on its right edge midpoint
    assert!(s.pointer_down(280.0, 80.0));
    assert!(matches!(s.interaction(), Interaction::Connecting { .. }));
    s.pointer_move(700.0, 80.0, 0.0);
    assert!(matches!(
        s.interaction(),
        Interaction::Connecting { hovered: Some(h), .. } if *h == b
    ));
    let frame = s.frame();
    assert!(frame.preview.is_some());
    assert!(frame.step(b).unwrap().connect_target);

    s.pointer_up(700.0, 80.0);
    let conns = s.map().connections();
    assert_eq!(conns.len(), 1);
    assert_eq!((conns[0].from_id, conns[0].to_id), (a, b));
    assert!(s.interaction().is_idle());
    assert!(s.frame().preview.is_none());
}

#[test]
fn connect_rejects_reverse_duplicate_and_self() {
    let (mut s, _, b) = session_ab("conn2");
    s.pointer_down(280.0, 80.0);
    s.pointer_up(700.0, 80.0);
    assert_eq!(s.map().connections().len(), 1);

    // B → A is a duplicate in the other direction
    s.pointer_down(880.0, 80.0);
    s.pointer_up(100.0, 80.0);
    assert_eq!(s.map().connections().len(), 1);

    // B → B
    s.pointer_down(880.0, 80.0);
    s.pointer_up(700.0, 80.0);
    assert_eq!(s.map().connections().len(), 1);
    assert!(s.map().step(b).is_some());
}

#[test]
fn connect_released_on_background_creates_nothing() {
    let (mut s, _, _) = session_ab("conn3");
    s.pointer_down(280.0, 80.0);
    s.pointer_move(450.0, 500.0, 0.0);
    s.pointer_up(450.0, 500.0);
    assert!(s.map().connections().is_empty());
    assert!(!s.can_undo());
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[test]
fn se_resize_never_goes_below_minimum() {
    let (mut s, a, _) = session_ab("resize1");
    s.select(Some(a));
    s.pointer_down(275.0, 155.0);
    assert!(matches!(s.interaction(), Interaction::Resizing { .. }));
    for (x, y) in [(200.0, 100.0), (-50.0, -50.0), (10.0, 400.0)] {
        s.pointer_move(x, y, 0.0);
        let step = s.map().step(a).unwrap();
        assert!(step.width >= MIN_STEP_WIDTH, "width {}", step.width);
        assert!(step.height >= MIN_STEP_HEIGHT, "height {}", step.height);
    }
    s.pointer_up(10.0, 400.0);
    let step = s.map().step(a).unwrap();
    assert_eq!((step.x, step.y, step.width, step.height), (0.0, 0.0, 240.0, 400.0));
}

#[test]
fn corner_of_unselected_card_drags_instead_of_resizing() {
    let (mut s, a, _) = session_ab("resize2");
    s.pointer_down(275.0, 155.0);
    assert!(matches!(s.interaction(), Interaction::Dragging { .. }));
    assert_eq!(s.selected(), Some(a));
    s.pointer_up(275.0, 155.0);

    // now selected, the same corner grabs the resize grip
    s.pointer_down(275.0, 155.0);
    assert!(matches!(s.interaction(), Interaction::Resizing { .. }));
}

#[test]
fn resize_after_pan_measures_from_panned_origin() {
    let (mut s, a, _) = session_ab("resize3");
    pan_to(&mut s, 200.0, 100.0);
    s.select(Some(a));

    // A spans screen (200,100)..(480,260); grab inside the se grip
    s.pointer_down(475.0, 255.0);
    assert!(matches!(s.interaction(), Interaction::Resizing { .. }));
    s.pointer_move(475.0, 255.0, 0.0);
    let step = s.map().step(a).unwrap();
    assert_eq!((step.x, step.y, step.width, step.height), (0.0, 0.0, 275.0, 155.0));

    s.pointer_move(545.0, 305.0, 0.0);
    s.pointer_up(545.0, 305.0);
    let step = s.map().step(a).unwrap();
    assert_eq!((step.x, step.y, step.width, step.height), (0.0, 0.0, 345.0, 205.0));
}

#[test]
fn nw_resize_after_pan_moves_origin_in_canvas_units() {
    let (mut s, a, _) = session_ab("resize4");
    pan_to(&mut s, 200.0, 100.0);
    s.select(Some(a));

    s.pointer_down(205.0, 105.0);
    assert!(matches!(s.interaction(), Interaction::Resizing { .. }));
    s.pointer_move(170.0, 80.0, 0.0);
    s.pointer_up(170.0, 80.0);
    let step = s.map().step(a).unwrap();
    assert_eq!((step.x, step.y, step.width, step.height), (-30.0, -20.0, 310.0, 180.0));
}

// ─── Pan & exclusivity ──────────────────────────────────────────────────

#[test]
fn pan_leaves_scale_and_steps_untouched() {
    let (mut s, _, _) = session_ab("pan1");
    let before = s.map().clone();
    pan_to(&mut s, 25.0, -75.0);
    assert_eq!(s.transform().scale(), 1.0);
    assert_eq!((s.transform().x, s.transform().y), (25.0, -75.0));
    assert_eq!(*s.map(), before);
    assert_eq!(s.selected(), None);
}

#[test]
fn second_pointer_down_during_gesture_is_ignored() {
    let (mut s, a, _) = session_ab("excl");
    s.pointer_down(100.0, 100.0);
    assert!(!s.pointer_down(700.0, 100.0));
    assert!(matches!(s.interaction(), Interaction::Dragging { step, .. } if *step == a));
}

#[test]
fn reset_view_restores_identity() {
    let (mut s, _, _) = session_ab("reset");
    pan_to(&mut s, 300.0, 300.0);
    assert!(s.handle_key("0", true, false, false, false));
    assert!(s.transform().is_identity());
    assert!(!s.reset_view());
}

// ─── Hover & connection delete ──────────────────────────────────────────

#[test]
fn hovered_connection_offers_delete() {
    let (mut s, _, _) = session_ab("hover1");
    s.pointer_down(280.0, 80.0);
    s.pointer_up(700.0, 80.0);
    let id = s.map().connections()[0].id;

    // midpoint of the edge between the two centres (140,80)→(740,80)
    assert!(s.pointer_move(440.0, 85.0, 1000.0));
    assert!(s.hover().is_hovered(id));
    let edge = s.frame().edge(id).unwrap().clone();
    assert_eq!(edge.stroke, "#8b5cf6");
    assert_eq!(edge.width, 3.0);

    assert!(s.pointer_down(440.0, 80.0));
    assert_eq!(s.take_requests(), vec![HostRequest::DeleteConnection(id)]);
    assert!(s.interaction().is_idle());

    let prior = s.begin_connection_delete(id).unwrap();
    assert!(s.map().connections().is_empty());
    s.rollback_connections(prior.clone());
    assert_eq!(s.map().connections(), prior.as_slice());
}

#[test]
fn hover_clears_after_debounce() {
    let (mut s, _, _) = session_ab("hover2");
    s.pointer_down(280.0, 80.0);
    s.pointer_up(700.0, 80.0);
    let id = s.map().connections()[0].id;

    s.pointer_move(440.0, 85.0, 0.0);
    s.pointer_move(440.0, 400.0, 10.0);
    assert!(s.hover().is_hovered(id), "still hovered inside the debounce");
    assert!(s.tick(60.0));
    assert!(!s.hover().is_hovered(id));
}

// ─── Inline editing ─────────────────────────────────────────────────────

#[test]
fn double_click_edits_title_and_enter_commits() {
    let (mut s, a, _) = session_ab("edit1");
    assert!(s.double_click(100.0, 20.0));
    assert_eq!(s.inline_edit().unwrap().field, EditField::Title);
    assert_eq!(s.inline_edit().unwrap().value, "New Step");
    s.set_inline_value("Checkout");
    // Delete goes to the text field, not the step
    assert!(!s.handle_key("Delete", false, false, false, false));
    assert!(s.handle_key("Enter", false, false, false, false));
    assert_eq!(s.map().step(a).unwrap().title, "Checkout");
    assert!(s.inline_edit().is_none());
}

#[test]
fn escape_cancels_description_edit() {
    let (mut s, a, _) = session_ab("edit2");
    assert!(s.double_click(100.0, 120.0));
    assert_eq!(s.inline_edit().unwrap().field, EditField::Description);
    s.set_inline_value("changed");
    assert!(s.handle_key("Escape", false, false, false, false));
    assert_eq!(s.map().step(a).unwrap().description, "Describe this step...");
}

#[test]
fn pointer_down_elsewhere_commits_edit() {
    let (mut s, a, _) = session_ab("edit3");
    s.begin_inline_edit(a, EditField::Title);
    s.set_inline_value("Blurred");
    s.pointer_down(1000.0, 700.0);
    s.pointer_up(1000.0, 700.0);
    assert_eq!(s.map().step(a).unwrap().title, "Blurred");
}

// ─── Step operations ────────────────────────────────────────────────────

#[test]
fn delete_key_removes_selected_step_and_its_connections() {
    let (mut s, a, b) = session_ab("del1");
    s.pointer_down(280.0, 80.0);
    s.pointer_up(700.0, 80.0);
    s.pointer_down(700.0, 100.0);
    s.pointer_up(700.0, 100.0);
    assert_eq!(s.selected(), Some(b));
    assert!(s.handle_key("Delete", false, false, false, false));
    assert!(s.map().step(b).is_none());
    assert!(s.map().connections().is_empty());
    assert_eq!(s.selected(), None);
    assert!(s.map().step(a).is_some());
}

#[test]
fn add_step_lands_near_view_center() {
    let mut s = EditorSession::new(VIEWPORT);
    let id = s.add_step();
    let step = s.map().step(id).unwrap();
    let (cx, cy) = s.view_center();
    assert_eq!((cx, cy), (600.0, 400.0));
    assert!((step.x - cx).abs() <= 100.0 && (step.y - cy).abs() <= 100.0);
    assert_eq!(step.title, DEFAULT_STEP_TITLE);
    assert_eq!(step.step_type, StepType::Action);
}

#[test]
fn change_type_resets_color_override() {
    let (mut s, a, _) = session_ab("type1");
    assert!(s.set_step_color(a, "#123abc"));
    assert!(s.map().step(a).unwrap().custom_color_override);
    assert!(s.change_step_type(a, "webhook"));
    let step = s.map().step(a).unwrap();
    assert_eq!(step.step_color.as_str(), "#ef4444");
    assert!(!step.custom_color_override);
    assert!(!s.change_step_type(a, "teleport"));
}

#[test]
fn save_shortcut_is_forwarded_to_host() {
    let (mut s, _, _) = session_ab("save1");
    assert!(s.handle_key("s", false, false, false, true));
    assert_eq!(s.take_requests(), vec![HostRequest::Save]);
    assert!(s.take_requests().is_empty());
}
