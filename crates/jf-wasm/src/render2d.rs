//! Canvas2D renderer.
//!
//! Paints a [`Frame`] to an HTML `<canvas>` via `CanvasRenderingContext2d`.
//! Everything in a frame is already in screen space, so nothing here
//! touches the view transform except the background grid and font scale.

use jf_render::frame::{EdgeVisual, Frame, PREVIEW_COLOR, PREVIEW_DASH, PREVIEW_WIDTH, StepVisual};
use jf_render::hit::{CONNECT_HANDLE_RADIUS, Corner, EDGE_DELETE_RADIUS, connect_handle_center};
use kurbo::Point;
use web_sys::CanvasRenderingContext2d;

const CARD_RADIUS: f64 = 12.0;
const STRIPE_WIDTH: f64 = 6.0;
const SELECTED_COLOR: &str = "#3b82f6";
const HIGHLIGHT_COLOR: &str = "#f59e0b";
const TARGET_COLOR: &str = "#10b981";
const DELETE_COLOR: &str = "#ef4444";

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub card_bg: &'static str,
    pub card_border: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub handle_fill: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F8FAFC",
            grid: "rgba(0, 0, 0, 0.08)",
            card_bg: "#FFFFFF",
            card_border: "#E2E8F0",
            title: "#0F172A",
            body: "#475569",
            handle_fill: "#FFFFFF",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#0F172A",
            grid: "rgba(255, 255, 255, 0.06)",
            card_bg: "#1E293B",
            card_border: "#334155",
            title: "#F1F5F9",
            body: "#94A3B8",
            handle_fill: "#1E293B",
        }
    }
}

/// Render one frame.
pub fn render_frame(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    canvas_width: f64,
    canvas_height: f64,
    theme: &CanvasTheme,
) {
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    draw_grid(ctx, frame, canvas_width, canvas_height, theme);

    // Edges under cards, delete buttons above them.
    for edge in &frame.edges {
        draw_edge(ctx, edge);
    }
    if let Some(preview) = &frame.preview {
        draw_preview(ctx, preview.from, preview.to);
    }

    let scale = frame.transform.scale();
    for step in &frame.steps {
        draw_card(ctx, step, scale, theme);
    }

    for edge in frame.edges.iter().filter(|e| e.hovered) {
        draw_delete_button(ctx, edge.midpoint);
    }
}

// ─── Background ──────────────────────────────────────────────────────────

/// Dot grid that pans and zooms with the view.
fn draw_grid(ctx: &CanvasRenderingContext2d, frame: &Frame, width: f64, height: f64, theme: &CanvasTheme) {
    let spacing = 20.0 * frame.transform.scale();
    if spacing < 6.0 {
        return;
    }
    ctx.set_fill_style_str(theme.grid);
    let mut x = frame.transform.x.rem_euclid(spacing);
    while x < width {
        let mut y = frame.transform.y.rem_euclid(spacing);
        while y < height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeVisual) {
    let (p0, p1) = (edge.curve.p0, edge.curve.p1);

    ctx.save();
    ctx.set_stroke_style_str(edge.stroke);
    ctx.set_line_width(edge.width);
    ctx.begin_path();
    ctx.move_to(p0.x, p0.y);
    ctx.quadratic_curve_to(p1.x, p1.y, edge.arrow_tip.x, edge.arrow_tip.y);
    ctx.stroke();
    ctx.restore();

    draw_arrowhead(ctx, edge.arrow_tip, edge.arrow_angle, edge.stroke, edge.width);
}

fn draw_preview(ctx: &CanvasRenderingContext2d, from: Point, to: Point) {
    ctx.save();
    ctx.set_stroke_style_str(PREVIEW_COLOR);
    ctx.set_line_width(PREVIEW_WIDTH);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &wasm_bindgen::JsValue::from_f64(PREVIEW_DASH[0]),
        &wasm_bindgen::JsValue::from_f64(PREVIEW_DASH[1]),
    ));
    ctx.begin_path();
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke();
    ctx.restore();
}

/// Filled arrowhead with its tip at `tip`, pointing along `angle`.
fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip: Point, angle: f64, color: &str, line_width: f64) {
    let size = 8.0 + line_width * 1.5;

    ctx.save();
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(
        tip.x - size * (angle - 0.4).cos(),
        tip.y - size * (angle - 0.4).sin(),
    );
    ctx.line_to(
        tip.x - size * (angle + 0.4).cos(),
        tip.y - size * (angle + 0.4).sin(),
    );
    ctx.close_path();
    ctx.fill();
    ctx.restore();
}

/// Red "×" button at a hovered edge's midpoint.
fn draw_delete_button(ctx: &CanvasRenderingContext2d, at: Point) {
    let radius = EDGE_DELETE_RADIUS * 0.6;
    let arm = radius * 0.4;

    ctx.save();
    ctx.set_fill_style_str(DELETE_COLOR);
    ctx.begin_path();
    let _ = ctx.arc(at.x, at.y, radius, 0.0, std::f64::consts::TAU);
    ctx.fill();

    ctx.set_stroke_style_str("#FFFFFF");
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(at.x - arm, at.y - arm);
    ctx.line_to(at.x + arm, at.y + arm);
    ctx.move_to(at.x + arm, at.y - arm);
    ctx.line_to(at.x - arm, at.y + arm);
    ctx.stroke();
    ctx.restore();
}

// ─── Cards ───────────────────────────────────────────────────────────────

fn draw_card(ctx: &CanvasRenderingContext2d, step: &StepVisual, scale: f64, theme: &CanvasTheme) {
    let r = step.rect;
    let (x, y, w, h) = (r.x0, r.y0, r.width(), r.height());
    let radius = CARD_RADIUS * scale;

    ctx.save();

    // Body
    ctx.set_shadow_color("rgba(0, 0, 0, 0.08)");
    ctx.set_shadow_blur(8.0);
    ctx.set_shadow_offset_y(2.0);
    rounded_rect_path(ctx, x, y, w, h, radius);
    ctx.set_fill_style_str(theme.card_bg);
    ctx.fill();
    ctx.set_shadow_color("transparent");
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_y(0.0);

    ctx.set_stroke_style_str(theme.card_border);
    ctx.set_line_width(1.0);
    ctx.stroke();

    // Category stripe, clipped to the card's rounded outline.
    ctx.save();
    rounded_rect_path(ctx, x, y, w, h, radius);
    ctx.clip();
    ctx.set_fill_style_str(&step.color);
    ctx.fill_rect(x, y, STRIPE_WIDTH * scale, h);
    ctx.restore();

    draw_card_text(ctx, step, scale, theme);

    if step.highlighted {
        ring(ctx, x, y, w, h, radius, 4.0, HIGHLIGHT_COLOR, 3.0);
    }
    if step.selected {
        ring(ctx, x, y, w, h, radius, 2.0, SELECTED_COLOR, 2.0);
    }
    if step.connect_target {
        ring(ctx, x, y, w, h, radius, 2.0, TARGET_COLOR, 3.0);
    }

    draw_connect_handle(ctx, step, theme);
    if step.selected {
        draw_resize_handles(ctx, step, theme);
    }

    ctx.restore();
}

fn draw_card_text(ctx: &CanvasRenderingContext2d, step: &StepVisual, scale: f64, theme: &CanvasTheme) {
    let r = step.rect;
    let pad = 14.0 * scale;
    let left = r.x0 + STRIPE_WIDTH * scale + pad;
    let right = r.x1 - pad;
    let max_width = (right - left).max(0.0);

    ctx.set_text_baseline("top");

    // Type label, top-right.
    ctx.set_font(&format!("500 {}px Inter, sans-serif", 11.0 * scale));
    ctx.set_fill_style_str(&step.color);
    ctx.set_text_align("right");
    let label = format!("{} {}", step.step_type.icon(), step.step_type.label());
    let _ = ctx.fill_text(&label, right, r.y0 + pad);

    // Numbered title.
    ctx.set_text_align("left");
    ctx.set_font(&format!("600 {}px Inter, sans-serif", 14.0 * scale));
    ctx.set_fill_style_str(theme.title);
    let title = format!("{}. {}", step.number, step.title);
    let title_y = r.y0 + pad + 18.0 * scale;
    let _ = ctx.fill_text_with_max_width(&title, left, title_y, max_width);

    // Wrapped description, cut off at the card's bottom edge.
    ctx.set_font(&format!("400 {}px Inter, sans-serif", 12.0 * scale));
    ctx.set_fill_style_str(theme.body);
    let line_height = 16.0 * scale;
    let mut line_y = title_y + 24.0 * scale;
    for line in wrap_text(ctx, &step.description, max_width) {
        if line_y + line_height > r.y1 - pad / 2.0 {
            break;
        }
        let _ = ctx.fill_text(&line, left, line_y);
        line_y += line_height;
    }
}

/// Greedy word wrap using the context's current font.
fn wrap_text(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> Vec<String> {
    let fits = |s: &str| ctx.measure_text(s).map(|m| m.width() <= max_width).unwrap_or(true);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if line.is_empty() || fits(&candidate) {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            }
        }
        lines.push(line);
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn ring(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    radius: f64,
    gap: f64,
    color: &str,
    width: f64,
) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    rounded_rect_path(ctx, x - gap, y - gap, w + gap * 2.0, h + gap * 2.0, radius + gap);
    ctx.stroke();
}

fn draw_connect_handle(ctx: &CanvasRenderingContext2d, step: &StepVisual, theme: &CanvasTheme) {
    let c = connect_handle_center(step.rect);
    ctx.set_fill_style_str(theme.handle_fill);
    ctx.set_stroke_style_str(SELECTED_COLOR);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let _ = ctx.arc(c.x, c.y, CONNECT_HANDLE_RADIUS * 0.7, 0.0, std::f64::consts::TAU);
    ctx.fill();
    ctx.stroke();
}

fn draw_resize_handles(ctx: &CanvasRenderingContext2d, step: &StepVisual, theme: &CanvasTheme) {
    ctx.set_fill_style_str(theme.handle_fill);
    ctx.set_stroke_style_str(SELECTED_COLOR);
    ctx.set_line_width(1.5);
    for corner in Corner::ALL {
        // 3px inside the hit area.
        let hr = corner.handle_rect(step.rect).inset(-3.0);
        ctx.fill_rect(hr.x0, hr.y0, hr.width(), hr.height());
        ctx.stroke_rect(hr.x0, hr.y0, hr.width(), hr.height());
    }
}

/// Build a rounded rectangle path.
fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
