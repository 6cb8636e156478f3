//! Hit testing: screen point → step part / connection lookup.
//!
//! Walks steps back-to-front (last painted = topmost) using the same
//! transform snapshot the frame was drawn with. Handle sizes are in screen
//! pixels so they stay grabbable at any scale.

use crate::frame::Frame;
use jf_core::id::{ConnectionId, StepId};
use jf_core::map::JourneyMap;
use jf_core::transform::CanvasTransform;
use kurbo::{ParamCurveNearest, Point, Rect};

/// Side length of the square resize grips at each card corner.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;
/// Radius of the connect affordance centred on the card's right edge.
pub const CONNECT_HANDLE_RADIUS: f64 = 10.0;
/// Half of the invisible stroke used for connection hover detection.
pub const EDGE_HOVER_TOLERANCE: f64 = 20.0;
/// Radius of the delete button shown at a hovered connection's midpoint.
pub const EDGE_DELETE_RADIUS: f64 = 20.0;

const NEAREST_ACCURACY: f64 = 1e-3;

/// Card corner grabbed by a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Corner::NorthWest => "nw",
            Corner::NorthEast => "ne",
            Corner::SouthWest => "sw",
            Corner::SouthEast => "se",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// The grip square for this corner, inset inside `card`.
    pub fn handle_rect(self, card: Rect) -> Rect {
        let s = RESIZE_HANDLE_SIZE;
        let (x, y) = match self {
            Corner::NorthWest => (card.x0, card.y0),
            Corner::NorthEast => (card.x1 - s, card.y0),
            Corner::SouthWest => (card.x0, card.y1 - s),
            Corner::SouthEast => (card.x1 - s, card.y1 - s),
        };
        Rect::new(x, y, x + s, y + s)
    }
}

/// Which affordance of a step a pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPart {
    Body,
    ConnectHandle,
    Resize(Corner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepHit {
    pub step: StepId,
    pub part: StepPart,
}

/// Screen-space rectangle of a card.
pub fn step_screen_rect(transform: &CanvasTransform, step: &jf_core::Step) -> Rect {
    let b = transform.bounds_to_screen(&step.bounds());
    Rect::new(b.x, b.y, b.x + b.width, b.y + b.height)
}

/// Centre of the connect affordance.
pub fn connect_handle_center(card: Rect) -> Point {
    Point::new(card.x1, card.center().y)
}

fn part_at(card: Rect, p: Point, selected: bool) -> Option<StepPart> {
    if connect_handle_center(card).distance(p) <= CONNECT_HANDLE_RADIUS {
        return Some(StepPart::ConnectHandle);
    }
    if !rect_contains_inclusive(card, p) {
        return None;
    }
    if !selected {
        return Some(StepPart::Body);
    }
    let part = Corner::ALL
        .into_iter()
        .find(|corner| rect_contains_inclusive(corner.handle_rect(card), p))
        .map_or(StepPart::Body, StepPart::Resize);
    Some(part)
}

fn rect_contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Find the topmost step part at screen position `(sx, sy)`.
/// Returns `None` on the background.
///
/// Resize grips exist only on the `selected` card; elsewhere a corner is
/// part of the body.
pub fn hit_test(
    map: &JourneyMap,
    transform: &CanvasTransform,
    selected: Option<StepId>,
    sx: f64,
    sy: f64,
) -> Option<StepHit> {
    let p = Point::new(sx, sy);
    map.steps().iter().rev().find_map(|step| {
        let card = step_screen_rect(transform, step);
        part_at(card, p, selected == Some(step.id)).map(|part| StepHit {
            step: step.id,
            part,
        })
    })
}

/// Topmost step whose on-screen rectangle contains the point, ignoring
/// handles. Used for connect drop targets.
pub fn step_at(map: &JourneyMap, transform: &CanvasTransform, sx: f64, sy: f64) -> Option<StepId> {
    let p = Point::new(sx, sy);
    map.steps()
        .iter()
        .rev()
        .find(|step| rect_contains_inclusive(step_screen_rect(transform, step), p))
        .map(|step| step.id)
}

/// Connection whose curve passes within [`EDGE_HOVER_TOLERANCE`] of the
/// point, nearest first.
pub fn edge_at(frame: &Frame, sx: f64, sy: f64) -> Option<ConnectionId> {
    let p = Point::new(sx, sy);
    let limit = EDGE_HOVER_TOLERANCE * EDGE_HOVER_TOLERANCE;
    frame
        .edges
        .iter()
        .map(|edge| (edge.id, edge.curve.nearest(p, NEAREST_ACCURACY).distance_sq))
        .filter(|(_, d)| *d <= limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Delete button of a hovered connection under the point.
pub fn edge_delete_button_at(frame: &Frame, sx: f64, sy: f64) -> Option<ConnectionId> {
    let p = Point::new(sx, sy);
    frame
        .edges
        .iter()
        .filter(|edge| edge.hovered)
        .find(|edge| edge.midpoint.distance(p) <= EDGE_DELETE_RADIUS)
        .map(|edge| edge.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jf_core::model::Step;

    fn one_step(id: &str, x: f64, y: f64) -> (JourneyMap, StepId) {
        let mut map = JourneyMap::new();
        let id = map.add_step(Step::new(StepId::intern(id), x, y));
        (map, id)
    }

    #[test]
    fn hit_body_and_background() {
        let (map, id) = one_step("hit-body", 100.0, 100.0);
        let t = CanvasTransform::IDENTITY;
        assert_eq!(
            hit_test(&map, &t, None, 200.0, 150.0),
            Some(StepHit {
                step: id,
                part: StepPart::Body
            })
        );
        assert_eq!(hit_test(&map, &t, None, 50.0, 50.0), None);
    }

    #[test]
    fn hit_corners_and_connect_handle() {
        let (map, id) = one_step("hit-corner", 0.0, 0.0);
        let t = CanvasTransform::IDENTITY;
        let part = |x, y| hit_test(&map, &t, Some(id), x, y).map(|h| h.part);
        assert_eq!(part(2.0, 2.0), Some(StepPart::Resize(Corner::NorthWest)));
        assert_eq!(part(278.0, 2.0), Some(StepPart::Resize(Corner::NorthEast)));
        assert_eq!(part(2.0, 158.0), Some(StepPart::Resize(Corner::SouthWest)));
        assert_eq!(part(278.0, 158.0), Some(StepPart::Resize(Corner::SouthEast)));
        // right-edge midpoint, slightly outside the card
        assert_eq!(part(285.0, 80.0), Some(StepPart::ConnectHandle));
        assert_eq!(hit_test(&map, &t, Some(id), 285.0, 80.0).unwrap().step, id);
    }

    #[test]
    fn unselected_corners_are_body() {
        let (map, id) = one_step("hit-unselected", 0.0, 0.0);
        let t = CanvasTransform::IDENTITY;
        let part = |x, y| hit_test(&map, &t, None, x, y).map(|h| h.part);
        assert_eq!(part(2.0, 2.0), Some(StepPart::Body));
        assert_eq!(part(278.0, 158.0), Some(StepPart::Body));
        // the connect handle does not depend on selection
        assert_eq!(part(285.0, 80.0), Some(StepPart::ConnectHandle));

        let other = StepId::intern("hit-unselected-other");
        assert_eq!(
            hit_test(&map, &t, Some(other), 278.0, 158.0).map(|h| h.part),
            Some(StepPart::Body)
        );
        assert_eq!(
            hit_test(&map, &t, Some(id), 278.0, 158.0).map(|h| h.part),
            Some(StepPart::Resize(Corner::SouthEast))
        );
    }

    #[test]
    fn hit_uses_transform() {
        let (map, id) = one_step("hit-scaled", 0.0, 0.0);
        let t = CanvasTransform::new(50.0, 50.0, 0.5).unwrap();
        // card spans 50..190 x 50..130 on screen
        assert_eq!(step_at(&map, &t, 120.0, 90.0), Some(id));
        assert_eq!(step_at(&map, &t, 250.0, 90.0), None);
    }

    #[test]
    fn topmost_step_wins() {
        let mut map = JourneyMap::new();
        map.add_step(Step::new(StepId::intern("hit-under"), 0.0, 0.0));
        let top = map.add_step(Step::new(StepId::intern("hit-over"), 100.0, 50.0));
        assert_eq!(
            step_at(&map, &CanvasTransform::IDENTITY, 150.0, 100.0),
            Some(top)
        );
    }

    #[test]
    fn corner_names_roundtrip() {
        for c in Corner::ALL {
            assert_eq!(Corner::parse(c.as_str()), Some(c));
        }
        assert_eq!(Corner::parse("n"), None);
    }
}
