//! Editor session: the single entry point a host drives.
//!
//! Owns the journey map, the view transform, the active interaction, hover
//! and selection state, inline editing and undo history. Hosts feed it
//! normalized input, draw [`EditorSession::frame`], and drain
//! [`HostRequest`]s for work that needs the network (saving, deleting a
//! connection remotely).

use crate::history::History;
use crate::hover::HoverTracker;
use crate::input::InputEvent;
use crate::interaction::Interaction;
use crate::mutation::{MapMutation, apply_mutation};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use jf_core::generate::GeneratedJourney;
use jf_core::id::{ConnectionId, StepId};
use jf_core::layout::new_step_origin;
use jf_core::map::JourneyMap;
use jf_core::model::{Connection, Step, StepColor, StepType};
use jf_core::transform::{CanvasTransform, Viewport};
use jf_render::frame::{Frame, FrameInput};
use jf_render::hit::{self, StepPart};

/// Canvas-space distance from a card's top below which a double-click
/// edits the description instead of the title.
const TITLE_ZONE_HEIGHT: f64 = 56.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
}

/// An in-progress inline text edit. Nothing touches the map until commit.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineEdit {
    pub step: StepId,
    pub field: EditField,
    pub value: String,
}

/// Work the session can't do by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    Save,
    DeleteConnection(ConnectionId),
}

pub struct EditorSession {
    map: JourneyMap,
    transform: CanvasTransform,
    viewport: Viewport,
    interaction: Interaction,
    hover: HoverTracker,
    selected: Option<StepId>,
    inline_edit: Option<InlineEdit>,
    history: History,
    requests: Vec<HostRequest>,
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl EditorSession {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_map(JourneyMap::new(), viewport)
    }

    pub fn with_map(map: JourneyMap, viewport: Viewport) -> Self {
        Self {
            map,
            transform: CanvasTransform::IDENTITY,
            viewport,
            interaction: Interaction::Idle,
            hover: HoverTracker::new(),
            selected: None,
            inline_edit: None,
            history: History::default(),
            requests: Vec::new(),
            dirty: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn map(&self) -> &JourneyMap {
        &self.map
    }

    pub fn transform(&self) -> CanvasTransform {
        self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected(&self) -> Option<StepId> {
        self.selected
    }

    pub fn select(&mut self, step: Option<StepId>) {
        self.selected = step.filter(|id| self.map.step(*id).is_some());
    }

    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    pub fn inline_edit(&self) -> Option<&InlineEdit> {
        self.inline_edit.as_ref()
    }

    /// True when the map changed since the last load or [`mark_saved`](Self::mark_saved).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Canvas-space point at the centre of the viewport.
    pub fn view_center(&self) -> (f64, f64) {
        self.transform.view_center(self.viewport)
    }

    /// Derive this frame's visuals from one snapshot of the transform.
    pub fn frame(&self) -> Frame {
        let (connect_preview, connect_target) = match self.interaction {
            Interaction::Connecting {
                from,
                pointer,
                hovered,
            } => (Some((from, pointer)), hovered),
            _ => (None, None),
        };
        Frame::build(
            &self.map,
            self.transform,
            &FrameInput {
                selected: self.selected,
                hovered_connections: Some(self.hover.hovered()),
                connect_preview,
                connect_target,
            },
        )
    }

    // ─── Mutation plumbing ───────────────────────────────────────────────

    fn apply(&mut self, mutations: Vec<MapMutation>) -> bool {
        let mut changed = false;
        for mutation in mutations {
            changed |= apply_mutation(&mut self.map, mutation);
        }
        self.dirty |= changed;
        changed
    }

    /// Apply one mutation as its own undo step.
    fn apply_recorded(&mut self, mutation: MapMutation, description: &str) -> bool {
        let before = self.map.clone();
        let changed = apply_mutation(&mut self.map, mutation);
        if changed {
            self.history.record(before, &self.map, description);
            self.dirty = true;
        }
        changed
    }

    /// Drop selection/edit/hover state that points at vanished entities.
    fn prune_stale_state(&mut self) {
        if self.selected.is_some_and(|id| self.map.step(id).is_none()) {
            self.selected = None;
        }
        if self
            .inline_edit
            .as_ref()
            .is_some_and(|e| self.map.step(e.step).is_none())
        {
            self.inline_edit = None;
        }
        let stale: Vec<ConnectionId> = self
            .hover
            .hovered()
            .iter()
            .copied()
            .filter(|id| self.map.connection(*id).is_none())
            .collect();
        for id in stale {
            self.hover.forget(id);
        }
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Dispatch a normalized event. Returns true when a redraw is needed.
    pub fn handle_event(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(*x, *y),
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y, now_ms),
            InputEvent::PointerUp { x, y } => self.pointer_up(*x, *y),
            InputEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => self.handle_key(key, *ctrl, *shift, *alt, *meta),
        }
    }

    /// Pointer pressed at screen `(x, y)`. Ignored while a gesture is active.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        if !self.interaction.is_idle() {
            log::debug!("pointer down ignored during {:?}", self.interaction);
            return false;
        }
        if self.inline_edit.is_some() {
            self.commit_inline_edit();
        }

        if let Some(id) = hit::edge_delete_button_at(&self.frame(), x, y) {
            self.requests.push(HostRequest::DeleteConnection(id));
            return true;
        }

        let hit = hit::hit_test(&self.map, &self.transform, self.selected, x, y);
        match hit {
            Some(h) if h.part == StepPart::Body => self.selected = Some(h.step),
            None => self.selected = None,
            Some(_) => {}
        }

        self.interaction = Interaction::begin(hit, x, y, &self.map, &self.transform);
        match self.interaction {
            Interaction::Dragging { .. } => self.history.begin_batch(&self.map, "Move step"),
            Interaction::Resizing { .. } => self.history.begin_batch(&self.map, "Resize step"),
            _ => {}
        }
        true
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        if self.interaction.is_idle() {
            let frame = self.frame();
            let over_card = hit::step_at(&self.map, &self.transform, x, y).is_some();
            let over = hit::edge_delete_button_at(&frame, x, y).or_else(|| {
                if over_card {
                    None
                } else {
                    hit::edge_at(&frame, x, y)
                }
            });
            let before = self.hover.hovered().clone();
            self.hover.pointer_over(over, now_ms);
            self.hover.tick(now_ms);
            return before != *self.hover.hovered();
        }

        let mutations = self
            .interaction
            .pointer_move(x, y, &self.map, &mut self.transform);
        self.apply(mutations);
        true
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        if self.interaction.is_idle() {
            return false;
        }
        let was_connecting = matches!(self.interaction, Interaction::Connecting { .. });
        let mutations = self.interaction.pointer_up(x, y, &self.map, &self.transform);
        if was_connecting {
            for mutation in mutations {
                self.apply_recorded(mutation, "Connect steps");
            }
        } else {
            self.apply(mutations);
        }
        self.history.end_batch(&self.map);
        true
    }

    /// Double-click on a card starts an inline edit of the title, or of the
    /// description when the click is below the title row.
    pub fn double_click(&mut self, x: f64, y: f64) -> bool {
        let Some(hit) = hit::hit_test(&self.map, &self.transform, self.selected, x, y) else {
            return false;
        };
        if hit.part != StepPart::Body {
            return false;
        }
        let Some(step) = self.map.step(hit.step) else {
            return false;
        };
        let (_, cy) = self.transform.screen_to_canvas(x, y);
        let field = if cy - step.y < TITLE_ZONE_HEIGHT {
            EditField::Title
        } else {
            EditField::Description
        };
        self.begin_inline_edit(hit.step, field)
    }

    /// Apply due hover clears. Hosts call this from a timer while
    /// [`HoverTracker::has_pending`] is true.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.hover.tick(now_ms)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Returns true if the key was bound and did something.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return false;
        };

        // While editing text, the text field owns everything except these.
        if self.inline_edit.is_some() {
            return match action {
                ShortcutAction::Commit => self.commit_inline_edit(),
                ShortcutAction::Cancel => self.cancel_inline_edit(),
                ShortcutAction::Save => {
                    self.commit_inline_edit();
                    self.requests.push(HostRequest::Save);
                    true
                }
                _ => false,
            };
        }

        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Commit => false,
            ShortcutAction::Cancel => self.selected.take().is_some(),
            ShortcutAction::Save => {
                self.requests.push(HostRequest::Save);
                true
            }
            ShortcutAction::ResetView => self.reset_view(),
        }
    }

    // ─── Step operations ─────────────────────────────────────────────────

    /// Add a default card near the centre of the view.
    pub fn add_step(&mut self) -> StepId {
        let (x, y) = new_step_origin(self.view_center(), self.map.steps().len());
        let step = Step::new(StepId::generate(), x, y);
        let id = step.id;
        self.apply_recorded(
            MapMutation::AddStep {
                step: Box::new(step),
            },
            "Add step",
        );
        id
    }

    /// Delete a step and its connections.
    pub fn delete_step(&mut self, id: StepId) -> bool {
        let changed = self.apply_recorded(MapMutation::RemoveStep { id }, "Delete step");
        if changed {
            self.prune_stale_state();
        }
        changed
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete_step(id),
            None => false,
        }
    }

    pub fn toggle_highlight(&mut self, id: StepId) -> bool {
        self.apply_recorded(MapMutation::ToggleHighlight { id }, "Toggle highlight")
    }

    /// Change a step's category by tag. Unknown tags are ignored.
    pub fn change_step_type(&mut self, id: StepId, tag: &str) -> bool {
        let Some(step_type) = StepType::from_id(tag) else {
            log::warn!("ignoring unknown step type {tag:?}");
            return false;
        };
        self.apply_recorded(
            MapMutation::SetStepType { id, step_type },
            "Change step type",
        )
    }

    pub fn set_step_color(&mut self, id: StepId, color: &str) -> bool {
        self.apply_recorded(
            MapMutation::SetStepColor {
                id,
                color: StepColor::from(color),
            },
            "Change step color",
        )
    }

    // ─── Inline editing ──────────────────────────────────────────────────

    pub fn begin_inline_edit(&mut self, id: StepId, field: EditField) -> bool {
        let Some(step) = self.map.step(id) else {
            return false;
        };
        let value = match field {
            EditField::Title => step.title.clone(),
            EditField::Description => step.description.clone(),
        };
        self.inline_edit = Some(InlineEdit {
            step: id,
            field,
            value,
        });
        true
    }

    pub fn set_inline_value(&mut self, value: impl Into<String>) -> bool {
        match self.inline_edit.as_mut() {
            Some(edit) => {
                edit.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Write the edited text into the step and end editing.
    pub fn commit_inline_edit(&mut self) -> bool {
        let Some(edit) = self.inline_edit.take() else {
            return false;
        };
        let mutation = match edit.field {
            EditField::Title => MapMutation::SetTitle {
                id: edit.step,
                title: edit.value,
            },
            EditField::Description => MapMutation::SetDescription {
                id: edit.step,
                description: edit.value,
            },
        };
        self.apply_recorded(mutation, "Edit text");
        true
    }

    pub fn cancel_inline_edit(&mut self) -> bool {
        self.inline_edit.take().is_some()
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Optimistically remove a connection. Returns the full connection list
    /// as it was, for [`rollback_connections`](Self::rollback_connections)
    /// if the remote delete fails.
    pub fn begin_connection_delete(&mut self, id: ConnectionId) -> Option<Vec<Connection>> {
        let prior = self.map.connections().to_vec();
        if !self.apply_recorded(MapMutation::RemoveConnection { id }, "Delete connection") {
            return None;
        }
        self.hover.forget(id);
        Some(prior)
    }

    /// Put back the connection list captured by a failed delete.
    ///
    /// The delete's history entry is dropped when nothing was recorded on
    /// top of it, so undo/redo cannot replay a deletion the backend refused.
    pub fn rollback_connections(&mut self, prior: Vec<Connection>) {
        log::warn!("restoring {} connection(s) after failed delete", prior.len());
        if !self.history.discard_last(&self.map) {
            log::debug!("rolled-back delete is no longer the newest history entry");
        }
        self.map.restore_connections(prior);
    }

    // ─── Whole-map operations ────────────────────────────────────────────

    pub fn reset_view(&mut self) -> bool {
        let changed = !self.transform.is_identity();
        self.transform.reset();
        changed
    }

    /// Replace the map with loaded data. Clears history and transient state.
    pub fn load(&mut self, map: JourneyMap) {
        self.map = map;
        self.interaction = Interaction::Idle;
        self.hover.clear();
        self.selected = None;
        self.inline_edit = None;
        self.history.clear();
        self.dirty = false;
    }

    /// Empty the canvas (undoable).
    pub fn clear(&mut self) -> bool {
        if self.map.is_empty() {
            return false;
        }
        let before = self.map.clone();
        self.map.clear();
        self.history.record(before, &self.map, "Clear canvas");
        self.prune_stale_state();
        self.dirty = true;
        true
    }

    /// Append a generated journey around the view centre as one undo step.
    /// Returns the number of steps and connections added.
    pub fn merge_generated(&mut self, journey: &GeneratedJourney) -> (usize, usize) {
        let (steps, connections) = journey.instantiate(self.view_center());
        let counts = (steps.len(), connections.len());
        self.apply_recorded(
            MapMutation::Merge { steps, connections },
            "Generate journey",
        );
        counts
    }

    pub fn undo(&mut self) -> bool {
        if !self.interaction.is_idle() {
            return false;
        }
        let undone = self.history.undo(&mut self.map).is_some();
        if undone {
            self.prune_stale_state();
            self.dirty = true;
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        if !self.interaction.is_idle() {
            return false;
        }
        let redone = self.history.redo(&mut self.map).is_some();
        if redone {
            self.prune_stale_state();
            self.dirty = true;
        }
        redone
    }
}
