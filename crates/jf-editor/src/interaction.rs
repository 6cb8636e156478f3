//! Pointer interaction state machine.
//!
//! Exactly one gesture is active at a time. Each pointer-down on the idle
//! machine picks a gesture from what was grabbed:
//!
//! | Grabbed            | Gesture      |
//! |--------------------|--------------|
//! | card body          | `Dragging`   |
//! | connect handle     | `Connecting` |
//! | corner handle      | `Resizing`   |
//! | background         | `Panning`    |
//!
//! Moves produce [`MapMutation`]s (or, for panning, change the view
//! directly). Pointer-up ends the gesture and returns to `Idle`.

use crate::mutation::MapMutation;
use jf_core::id::StepId;
use jf_core::map::JourneyMap;
use jf_core::model::{Bounds, MIN_STEP_HEIGHT, MIN_STEP_WIDTH};
use jf_core::transform::CanvasTransform;
use jf_render::hit::{self, Corner, StepHit, StepPart};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        step: StepId,
        /// Pointer minus card origin, in canvas units.
        offset: (f64, f64),
    },
    Connecting {
        from: StepId,
        /// Canvas-space pointer, end of the preview edge.
        pointer: (f64, f64),
        hovered: Option<StepId>,
    },
    Resizing {
        step: StepId,
        corner: Corner,
        start: Bounds,
    },
    Panning {
        /// Pointer minus view offset at gesture start.
        start: (f64, f64),
    },
}

/// New card bounds for a resize gesture with the pointer at `(px, py)`.
///
/// The pointer is relative to the panned canvas origin (screen minus view
/// offset) and is not divided by the scale.
///
/// Only the size is clamped; the dragged edge follows the pointer, so the
/// opposite corner can drift once a minimum is hit.
pub fn resize_bounds(corner: Corner, start: Bounds, px: f64, py: f64) -> Bounds {
    let west = matches!(corner, Corner::NorthWest | Corner::SouthWest);
    let north = matches!(corner, Corner::NorthWest | Corner::NorthEast);

    let (x, width) = if west {
        (px, MIN_STEP_WIDTH.max(start.x + start.width - px))
    } else {
        (start.x, MIN_STEP_WIDTH.max(px - start.x))
    };
    let (y, height) = if north {
        (py, MIN_STEP_HEIGHT.max(start.y + start.height - py))
    } else {
        (start.y, MIN_STEP_HEIGHT.max(py - start.y))
    };
    Bounds {
        x,
        y,
        width,
        height,
    }
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Start a gesture for a pointer-down at screen `(x, y)`.
    pub fn begin(
        hit: Option<StepHit>,
        x: f64,
        y: f64,
        map: &JourneyMap,
        view: &CanvasTransform,
    ) -> Interaction {
        let Some(hit) = hit else {
            return Interaction::Panning {
                start: (x - view.x, y - view.y),
            };
        };
        let Some(step) = map.step(hit.step) else {
            return Interaction::Idle;
        };
        match hit.part {
            StepPart::Body => {
                let (cx, cy) = view.screen_to_canvas(x, y);
                Interaction::Dragging {
                    step: step.id,
                    offset: (cx - step.x, cy - step.y),
                }
            }
            StepPart::ConnectHandle => Interaction::Connecting {
                from: step.id,
                pointer: view.screen_to_canvas(x, y),
                hovered: None,
            },
            StepPart::Resize(corner) => Interaction::Resizing {
                step: step.id,
                corner,
                start: step.bounds(),
            },
        }
    }

    pub fn pointer_move(
        &mut self,
        x: f64,
        y: f64,
        map: &JourneyMap,
        view: &mut CanvasTransform,
    ) -> Vec<MapMutation> {
        match self {
            Interaction::Idle => vec![],
            Interaction::Dragging { step, offset } => {
                let (cx, cy) = view.screen_to_canvas(x, y);
                vec![MapMutation::MoveStep {
                    id: *step,
                    x: cx - offset.0,
                    y: cy - offset.1,
                }]
            }
            Interaction::Connecting {
                pointer, hovered, ..
            } => {
                *pointer = view.screen_to_canvas(x, y);
                *hovered = hit::step_at(map, view, x, y);
                vec![]
            }
            Interaction::Resizing {
                step,
                corner,
                start,
            } => vec![MapMutation::SetStepBounds {
                id: *step,
                bounds: resize_bounds(*corner, *start, x - view.x, y - view.y),
            }],
            Interaction::Panning { start } => {
                view.set_offset(x - start.0, y - start.1);
                vec![]
            }
        }
    }

    /// End the gesture. Only a successful connect produces a mutation.
    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        map: &JourneyMap,
        view: &CanvasTransform,
    ) -> Vec<MapMutation> {
        let finished = std::mem::take(self);
        let Interaction::Connecting { from, .. } = finished else {
            return vec![];
        };
        match hit::step_at(map, view, x, y) {
            Some(to) if to != from && !map.has_connection_between(from, to) => {
                vec![MapMutation::Connect { from, to }]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jf_core::model::Step;
    use pretty_assertions::assert_eq;

    fn start() -> Bounds {
        Bounds {
            x: 100.0,
            y: 100.0,
            width: 280.0,
            height: 160.0,
        }
    }

    #[test]
    fn se_resize_clamps_to_minimum() {
        let b = resize_bounds(Corner::SouthEast, start(), 110.0, 105.0);
        assert_eq!(b.width, MIN_STEP_WIDTH);
        assert_eq!(b.height, MIN_STEP_HEIGHT);
        assert_eq!((b.x, b.y), (100.0, 100.0));

        let b = resize_bounds(Corner::SouthEast, start(), 600.0, 400.0);
        assert_eq!((b.width, b.height), (500.0, 300.0));
    }

    #[test]
    fn sw_resize_moves_left_edge() {
        let b = resize_bounds(Corner::SouthWest, start(), 50.0, 300.0);
        assert_eq!(b.x, 50.0);
        assert_eq!(b.width, 330.0);
        assert_eq!(b.height, 200.0);
        assert_eq!(b.y, 100.0);
    }

    #[test]
    fn ne_resize_moves_top_edge() {
        let b = resize_bounds(Corner::NorthEast, start(), 500.0, 60.0);
        assert_eq!(b.y, 60.0);
        assert_eq!(b.height, 200.0);
        assert_eq!(b.width, 400.0);
        assert_eq!(b.x, 100.0);
    }

    #[test]
    fn nw_clamped_resize_lets_origin_drift() {
        // Pointer dragged past the opposite corner: size clamps, origin follows.
        let b = resize_bounds(Corner::NorthWest, start(), 500.0, 400.0);
        assert_eq!((b.x, b.y), (500.0, 400.0));
        assert_eq!((b.width, b.height), (MIN_STEP_WIDTH, MIN_STEP_HEIGHT));
    }

    #[test]
    fn background_starts_pan_and_pan_moves_view() {
        let map = JourneyMap::new();
        let mut view = CanvasTransform::new(10.0, 20.0, 1.5).unwrap();
        let mut gesture = Interaction::begin(None, 100.0, 100.0, &map, &view);
        assert_eq!(gesture, Interaction::Panning { start: (90.0, 80.0) });
        assert!(gesture.pointer_move(130.0, 90.0, &map, &mut view).is_empty());
        assert_eq!((view.x, view.y, view.scale()), (40.0, 10.0, 1.5));
        gesture.pointer_up(130.0, 90.0, &map, &view);
        assert!(gesture.is_idle());
    }

    #[test]
    fn connect_to_empty_space_is_noop() {
        let mut map = JourneyMap::new();
        let a = map.add_step(Step::new(StepId::intern("ix-a"), 0.0, 0.0));
        let mut view = CanvasTransform::IDENTITY;
        let mut gesture = Interaction::begin(
            Some(StepHit {
                step: a,
                part: StepPart::ConnectHandle,
            }),
            280.0,
            80.0,
            &map,
            &view,
        );
        gesture.pointer_move(900.0, 900.0, &map, &mut view);
        assert_eq!(
            gesture,
            Interaction::Connecting {
                from: a,
                pointer: (900.0, 900.0),
                hovered: None
            }
        );
        assert!(gesture.pointer_up(900.0, 900.0, &map, &view).is_empty());
        assert!(gesture.is_idle());
    }
}
