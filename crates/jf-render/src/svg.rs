//! Standalone SVG export of a journey map.
//!
//! Drawn in canvas space (identity transform) so the output doesn't depend
//! on where the user happened to be panned. Same input → same bytes.

use crate::frame::{EDGE_COLOR, EDGE_WIDTH, Frame, FrameInput, StepVisual};
use jf_core::map::JourneyMap;
use jf_core::transform::CanvasTransform;

const PAD: f64 = 16.0;
const CARD_RADIUS: f64 = 8.0;
const STRIPE_WIDTH: f64 = 4.0;
const TITLE_SIZE: f64 = 14.0;
const BODY_SIZE: f64 = 12.0;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render the whole map. An empty map yields an empty 800×600 document.
pub fn render_svg(map: &JourneyMap) -> String {
    let frame = Frame::build(map, CanvasTransform::IDENTITY, &FrameInput::default());

    let (min_x, min_y, max_x, max_y) = match map.bounding_box() {
        Some(b) => (b.x, b.y, b.x + b.width, b.y + b.height),
        None => (0.0, 0.0, 800.0, 600.0),
    };

    let width = max_x - min_x + PAD * 2.0;
    let height = max_y - min_y + PAD * 2.0;
    let offset_x = min_x - PAD;
    let offset_y = min_y - PAD;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    ));
    svg.push_str("<defs>\n");
    svg.push_str(&format!(
        "  <marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"9\" refY=\"3.5\" orient=\"auto\"><polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{EDGE_COLOR}\" /></marker>\n"
    ));
    svg.push_str("</defs>\n");
    svg.push_str("<style>\n");
    svg.push_str("  text { font-family: Inter, system-ui, sans-serif; }\n");
    svg.push_str("</style>\n");
    svg.push_str(&format!(
        "<g transform=\"translate({}, {})\">\n",
        -offset_x, -offset_y
    ));

    // Edges end at the target card boundary so the marker stays visible.
    for edge in &frame.edges {
        let c = edge.curve;
        svg.push_str(&format!(
            "  <path d=\"M {} {} Q {} {} {} {}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#arrowhead)\" />\n",
            c.p0.x, c.p0.y, c.p1.x, c.p1.y, edge.arrow_tip.x, edge.arrow_tip.y, EDGE_COLOR, EDGE_WIDTH
        ));
    }

    for step in &frame.steps {
        render_card(&mut svg, step);
    }

    svg.push_str("</g>\n</svg>");
    svg
}

fn render_card(out: &mut String, step: &StepVisual) {
    let r = step.rect;
    let (fill, border) = if step.highlighted {
        ("#ecfdf5", "#22c55e")
    } else {
        ("#ffffff", "#e2e8f0")
    };
    out.push_str(&format!(
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{CARD_RADIUS}\" ry=\"{CARD_RADIUS}\" fill=\"{fill}\" stroke=\"{border}\" stroke-width=\"1\" />\n",
        r.x0,
        r.y0,
        r.width(),
        r.height()
    ));
    out.push_str(&format!(
        "  <rect x=\"{}\" y=\"{}\" width=\"{STRIPE_WIDTH}\" height=\"{}\" fill=\"{}\" />\n",
        r.x0,
        r.y0,
        r.height(),
        escape(&step.color)
    ));
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\" fill=\"{}\">{} {}</text>\n",
        r.x1 - 8.0,
        r.y0 + 16.0,
        escape(&step.color),
        step.step_type.icon(),
        step.step_type.label()
    ));
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"{TITLE_SIZE}\" font-weight=\"600\" fill=\"#0f172a\">{}. {}</text>\n",
        r.x0 + 12.0,
        r.y0 + 40.0,
        step.number,
        escape(&step.title)
    ));
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"{BODY_SIZE}\" fill=\"#475569\">{}</text>\n",
        r.x0 + 12.0,
        r.y0 + 62.0,
        escape(&step.description)
    ));
}
