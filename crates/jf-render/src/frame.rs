//! Per-frame visual derivation.
//!
//! A [`Frame`] is built from the stores plus ONE copy of the view
//! transform. Cards and edges are both mapped through that copy, so the
//! edge layer can never lag behind the card layer after a pan.

use crate::hit::step_screen_rect;
use jf_core::id::{ConnectionId, StepId};
use jf_core::map::JourneyMap;
use jf_core::model::StepType;
use jf_core::transform::CanvasTransform;
use kurbo::{ParamCurve, Point, QuadBez, Rect};
use std::collections::HashSet;

pub const EDGE_COLOR: &str = "#64748b";
pub const EDGE_WIDTH: f64 = 2.0;
pub const EDGE_HOVER_COLOR: &str = "#8b5cf6";
pub const EDGE_HOVER_WIDTH: f64 = 3.0;
pub const PREVIEW_COLOR: &str = "#3b82f6";
pub const PREVIEW_WIDTH: f64 = 3.0;
pub const PREVIEW_DASH: [f64; 2] = [8.0, 4.0];

/// Editor state the renderer needs beyond the stores.
#[derive(Debug, Clone, Default)]
pub struct FrameInput<'a> {
    pub selected: Option<StepId>,
    pub hovered_connections: Option<&'a HashSet<ConnectionId>>,
    /// Source step and canvas-space pointer of an in-progress connect.
    pub connect_preview: Option<(StepId, (f64, f64))>,
    /// Step currently under the pointer while connecting.
    pub connect_target: Option<StepId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepVisual {
    pub id: StepId,
    /// 1-based display number.
    pub number: usize,
    pub rect: Rect,
    pub color: String,
    pub step_type: StepType,
    pub title: String,
    pub description: String,
    pub highlighted: bool,
    pub selected: bool,
    pub connect_target: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVisual {
    pub id: ConnectionId,
    pub curve: QuadBez,
    pub midpoint: Point,
    /// Where the curve leaves the target card; arrowheads sit here.
    pub arrow_tip: Point,
    pub arrow_angle: f64,
    pub hovered: bool,
    pub stroke: &'static str,
    pub width: f64,
}

/// Dashed line from the source card's centre to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewEdge {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub transform: CanvasTransform,
    pub steps: Vec<StepVisual>,
    pub edges: Vec<EdgeVisual>,
    pub preview: Option<PreviewEdge>,
}

/// Quadratic curve between two centres, control point at the midpoint.
pub fn edge_curve(from: Point, to: Point) -> QuadBez {
    QuadBez::new(from, from.midpoint(to), to)
}

/// Latest point of `curve` that is outside `target`, found by bisection.
fn exit_point(curve: &QuadBez, target: Rect) -> (Point, f64) {
    let inside = |t: f64| target.contains(curve.eval(t));
    let (mut lo, mut hi) = (0.0, 1.0);
    if inside(lo) {
        // source and target overlap; point at the end
        lo = 1.0;
    } else {
        for _ in 0..24 {
            let mid = (lo + hi) / 2.0;
            if inside(mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
    }
    let tip = curve.eval(lo);
    let d = curve.p2 - curve.p0;
    (tip, d.y.atan2(d.x))
}

impl Frame {
    pub fn build(map: &JourneyMap, transform: CanvasTransform, input: &FrameInput<'_>) -> Frame {
        let t = transform;

        let steps: Vec<StepVisual> = map
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| StepVisual {
                id: step.id,
                number: i + 1,
                rect: step_screen_rect(&t, step),
                color: step.display_color().to_string(),
                step_type: step.step_type,
                title: step.title.clone(),
                description: step.description.clone(),
                highlighted: step.highlighted,
                selected: input.selected == Some(step.id),
                connect_target: input.connect_target == Some(step.id),
            })
            .collect();

        let rect_of = |id: StepId| steps.iter().find(|s| s.id == id).map(|s| s.rect);

        let mut edges = Vec::with_capacity(map.connections().len());
        for conn in map.connections() {
            let (Some(from), Some(to)) = (rect_of(conn.from_id), rect_of(conn.to_id)) else {
                log::trace!("skipping dangling connection {}", conn.id);
                continue;
            };
            let curve = edge_curve(from.center(), to.center());
            let (arrow_tip, arrow_angle) = exit_point(&curve, to);
            let hovered = input
                .hovered_connections
                .is_some_and(|set| set.contains(&conn.id));
            edges.push(EdgeVisual {
                id: conn.id,
                curve,
                midpoint: curve.eval(0.5),
                arrow_tip,
                arrow_angle,
                hovered,
                stroke: if hovered { EDGE_HOVER_COLOR } else { EDGE_COLOR },
                width: if hovered { EDGE_HOVER_WIDTH } else { EDGE_WIDTH },
            });
        }

        let preview = input.connect_preview.and_then(|(source, (cx, cy))| {
            let from = rect_of(source)?.center();
            let (sx, sy) = t.canvas_to_screen(cx, cy);
            Some(PreviewEdge {
                from,
                to: Point::new(sx, sy),
            })
        });

        Frame {
            transform: t,
            steps,
            edges,
            preview,
        }
    }

    pub fn step(&self, id: StepId) -> Option<&StepVisual> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn edge(&self, id: ConnectionId) -> Option<&EdgeVisual> {
        self.edges.iter().find(|e| e.id == id)
    }
}
