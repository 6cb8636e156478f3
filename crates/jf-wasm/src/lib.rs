//! WASM bridge for JourneyFlow: exposes the editor session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page forwards
//! pointer and key events, calls `render` on each animation frame, and
//! services the requests the session can't do alone (saving, remote
//! connection deletes) with its own backend client.

mod render2d;

use jf_core::export::export_csv;
use jf_core::generate::{AdvancedContext, GenerationRequest, parse_response, system_prompt};
use jf_core::id::StepId;
use jf_core::map::JourneyMap;
use jf_core::model::Connection;
use jf_core::transform::Viewport;
use jf_editor::session::{EditField, EditorSession, HostRequest};
use jf_render::svg::render_svg;
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct JourneyCanvas {
    session: EditorSession,
    width: f64,
    height: f64,
    /// `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl JourneyCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self {
            session: EditorSession::new(Viewport { width, height }),
            width,
            height,
            dark_mode: false,
        }
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the map with `{"steps":[...],"connections":[...]}`.
    /// Returns `false` (and leaves the map alone) if the JSON doesn't parse.
    pub fn load_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<JourneyMap>(json) {
            Ok(map) => {
                self.session.load(map);
                true
            }
            Err(e) => {
                log::warn!("load_json: {e}");
                false
            }
        }
    }

    /// The current map as `{"steps":[...],"connections":[...]}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self.session.map()).unwrap_or_default()
    }

    pub fn export_svg(&self) -> String {
        render_svg(self.session.map())
    }

    /// `{"ok":true,"csv":"..."}` or `{"ok":false,"error":"..."}`.
    pub fn export_csv(&self) -> String {
        match export_csv(self.session.map()) {
            Ok(csv) => json!({ "ok": true, "csv": csv }).to_string(),
            Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
        }
    }

    /// Validate a generation response and merge it around the view centre.
    /// Returns `{"ok":true,"steps":n,"connections":m}` or an error object;
    /// nothing is merged on error.
    pub fn merge_generated(&mut self, response_text: &str) -> String {
        match parse_response(response_text) {
            Ok(journey) => {
                let (steps, connections) = self.session.merge_generated(&journey);
                json!({
                    "ok": true,
                    "title": journey.journey_title,
                    "steps": steps,
                    "connections": connections,
                })
                .to_string()
            }
            Err(e) => json!({
                "ok": false,
                "error": e.to_string(),
                "retryable": e.is_retryable(),
            })
            .to_string(),
        }
    }

    pub fn clear(&mut self) -> bool {
        self.session.clear()
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    pub fn mark_saved(&mut self) {
        self.session.mark_saved();
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        let frame = self.session.frame();
        render2d::render_frame(ctx, &frame, self.width, self.height, &theme);
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.session.set_viewport(Viewport { width, height });
    }

    pub fn reset_view(&mut self) -> bool {
        self.session.reset_view()
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────
    // Each handler returns true when the canvas needs a redraw.

    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_down(x, y)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        self.session.pointer_move(x, y, now_ms)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_up(x, y)
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> bool {
        self.session.double_click(x, y)
    }

    /// Advance timers (hover debounce).
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.tick(now_ms)
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.session.handle_key(key, ctrl, shift, alt, meta)
    }

    /// Drain pending host requests as a JSON array:
    /// `[{"kind":"save"},{"kind":"deleteConnection","id":"..."}]`.
    pub fn take_requests(&mut self) -> String {
        let requests: Vec<serde_json::Value> = self
            .session
            .take_requests()
            .into_iter()
            .map(|r| match r {
                HostRequest::Save => json!({ "kind": "save" }),
                HostRequest::DeleteConnection(id) => {
                    json!({ "kind": "deleteConnection", "id": id.as_str() })
                }
            })
            .collect();
        serde_json::Value::Array(requests).to_string()
    }

    // ─── Steps ───────────────────────────────────────────────────────────

    /// Add a default step near the view centre. Returns its id.
    pub fn add_step(&mut self) -> String {
        self.session.add_step().as_str().to_string()
    }

    pub fn delete_step(&mut self, id: &str) -> bool {
        self.step_id(id).is_some_and(|id| self.session.delete_step(id))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    pub fn toggle_highlight(&mut self, id: &str) -> bool {
        self.step_id(id)
            .is_some_and(|id| self.session.toggle_highlight(id))
    }

    pub fn change_step_type(&mut self, id: &str, tag: &str) -> bool {
        self.step_id(id)
            .is_some_and(|id| self.session.change_step_type(id, tag))
    }

    pub fn set_step_color(&mut self, id: &str, color: &str) -> bool {
        self.step_id(id)
            .is_some_and(|id| self.session.set_step_color(id, color))
    }

    /// Selected step id, or empty string if none.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn select(&mut self, id: &str) -> bool {
        let step = self.step_id(id);
        self.session.select(step);
        step.is_some()
    }

    // ─── Inline editing ──────────────────────────────────────────────────

    /// `field` is `"title"` or `"description"`.
    pub fn begin_inline_edit(&mut self, id: &str, field: &str) -> bool {
        let field = match field {
            "title" => EditField::Title,
            "description" => EditField::Description,
            _ => return false,
        };
        self.step_id(id)
            .is_some_and(|id| self.session.begin_inline_edit(id, field))
    }

    /// The open edit as `{"step","field","value"}`, or empty string.
    pub fn get_inline_edit(&self) -> String {
        let Some(edit) = self.session.inline_edit() else {
            return String::new();
        };
        let field = match edit.field {
            EditField::Title => "title",
            EditField::Description => "description",
        };
        json!({ "step": edit.step.as_str(), "field": field, "value": edit.value }).to_string()
    }

    pub fn set_inline_value(&mut self, value: &str) -> bool {
        self.session.set_inline_value(value)
    }

    pub fn commit_inline_edit(&mut self) -> bool {
        self.session.commit_inline_edit()
    }

    pub fn cancel_inline_edit(&mut self) -> bool {
        self.session.cancel_inline_edit()
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Remove a connection locally before the host deletes it remotely.
    /// Returns the prior connection list as JSON (hand it back to
    /// `rollback_connections` if the remote call fails), or empty string
    /// when there was nothing to delete.
    pub fn begin_connection_delete(&mut self, id: &str) -> String {
        let Some(id) = self
            .session
            .map()
            .connections()
            .iter()
            .find(|c| c.id.as_str() == id)
            .map(|c| c.id)
        else {
            return String::new();
        };
        self.session
            .begin_connection_delete(id)
            .and_then(|prior| serde_json::to_string(&prior).ok())
            .unwrap_or_default()
    }

    pub fn rollback_connections(&mut self, prior_json: &str) -> bool {
        match serde_json::from_str::<Vec<Connection>>(prior_json) {
            Ok(prior) => {
                self.session.rollback_connections(prior);
                true
            }
            Err(e) => {
                log::error!("rollback_connections: {e}");
                false
            }
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }
}

impl JourneyCanvas {
    /// Resolve a step id coming from JS without interning unknown strings.
    fn step_id(&self, id: &str) -> Option<StepId> {
        self.session
            .map()
            .steps()
            .iter()
            .find(|s| s.id.as_str() == id)
            .map(|s| s.id)
    }

    #[cfg(test)]
    fn connection_ids(&self) -> Vec<jf_core::id::ConnectionId> {
        self.session.map().connections().iter().map(|c| c.id).collect()
    }
}

/// Set up better panic messages in the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("JourneyFlow WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone generation helpers (no canvas needed) ────────────────────

/// Body for the host's generation route. `mode` is `"basic"` or
/// `"advanced"`; advanced context fields may be empty.
/// Returns `{"ok":true,"body":{...}}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn generation_request(prompt: &str, mode: &str, persona: &str, scenario: &str, goals: &str) -> String {
    let request = if mode == "advanced" {
        GenerationRequest::advanced(
            prompt,
            AdvancedContext {
                persona: persona.to_string(),
                scenario: scenario.to_string(),
                goals: goals.to_string(),
            },
        )
    } else {
        GenerationRequest::basic(prompt)
    };
    match request.validate() {
        Ok(()) => json!({ "ok": true, "body": request.to_json() }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

/// The system prompt for a host that calls the chat model directly.
#[wasm_bindgen]
pub fn generation_system_prompt() -> String {
    system_prompt()
}
