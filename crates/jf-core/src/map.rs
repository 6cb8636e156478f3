//! The step and connection stores.
//!
//! `JourneyMap` owns both collections so that the one cross-collection
//! invariant, deleting a step deletes every connection touching it, can't
//! be bypassed. Step order is display order and round-trips through
//! persistence as `order_index`.

use crate::id::{ConnectionId, StepId};
use crate::model::{Bounds, Connection, Step, StepColor, StepType};
use serde::{Deserialize, Serialize};

/// Ordered steps plus directed connections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyMap {
    steps: Vec<Step>,
    connections: Vec<Connection>,
}

impl JourneyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from already-loaded collections, as-is.
    pub fn from_parts(steps: Vec<Step>, connections: Vec<Connection>) -> Self {
        Self { steps, connections }
    }

    pub fn into_parts(self) -> (Vec<Step>, Vec<Connection>) {
        (self.steps, self.connections)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.connections.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.connections.clear();
    }

    // ─── Steps ───────────────────────────────────────────────────────────

    pub fn index_of(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    /// Append a step (drawn on top of existing ones).
    pub fn add_step(&mut self, step: Step) -> StepId {
        let id = step.id;
        self.steps.push(step);
        id
    }

    /// Remove a step and every connection referencing it as either endpoint.
    /// Returns the removed step and the cascaded connections.
    pub fn remove_step(&mut self, id: StepId) -> Option<(Step, Vec<Connection>)> {
        let idx = self.index_of(id)?;
        let step = self.steps.remove(idx);
        let (removed, kept): (Vec<Connection>, Vec<Connection>) = self
            .connections
            .drain(..)
            .partition(|c| c.involves(id));
        self.connections = kept;
        log::debug!(
            "removed step {id} with {} cascaded connection(s)",
            removed.len()
        );
        Some((step, removed))
    }

    pub fn move_step(&mut self, id: StepId, x: f64, y: f64) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.x = x;
                step.y = y;
                true
            }
            None => false,
        }
    }

    pub fn set_step_bounds(&mut self, id: StepId, bounds: Bounds) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.x = bounds.x;
                step.y = bounds.y;
                step.width = bounds.width;
                step.height = bounds.height;
                true
            }
            None => false,
        }
    }

    pub fn set_title(&mut self, id: StepId, title: impl Into<String>) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.title = title.into();
                true
            }
            None => false,
        }
    }

    pub fn set_description(&mut self, id: StepId, description: impl Into<String>) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.description = description.into();
                true
            }
            None => false,
        }
    }

    /// Change a step's category. The color snaps to the category color and
    /// any custom color override is dropped.
    pub fn set_step_type(&mut self, id: StepId, step_type: StepType) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.step_type = step_type;
                step.step_color = StepColor::from(step_type.color());
                step.custom_color_override = false;
                true
            }
            None => false,
        }
    }

    /// Paint a step with a color other than its category's.
    pub fn set_step_color(&mut self, id: StepId, color: StepColor) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.step_color = color;
                step.custom_color_override = true;
                true
            }
            None => false,
        }
    }

    /// Flip the highlight flag. Returns the new value.
    pub fn toggle_highlight(&mut self, id: StepId) -> Option<bool> {
        let step = self.step_mut(id)?;
        step.highlighted = !step.highlighted;
        Some(step.highlighted)
    }

    /// Bounding box of all steps in canvas space.
    pub fn bounding_box(&self) -> Option<Bounds> {
        self.steps
            .iter()
            .map(Step::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    // ─── Connections ─────────────────────────────────────────────────────

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// True if any connection joins `a` and `b`, in either direction.
    pub fn has_connection_between(&self, a: StepId, b: StepId) -> bool {
        self.connections.iter().any(|c| c.joins(a, b))
    }

    /// Guarded creation used by interactive connecting: refuses self-loops,
    /// unknown endpoints and pairs already joined in either direction.
    pub fn connect(&mut self, from: StepId, to: StepId) -> Option<ConnectionId> {
        if from == to || self.step(from).is_none() || self.step(to).is_none() {
            return None;
        }
        if self.has_connection_between(from, to) {
            log::debug!("connection {from} -> {to} already exists");
            return None;
        }
        let conn = Connection::new(from, to);
        self.connections.push(conn);
        Some(conn.id)
    }

    /// Append a connection without any guard (loading, generation).
    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.id == id)?;
        Some(self.connections.remove(idx))
    }

    /// Replace the whole connection list (rollback after a failed remote call).
    pub fn restore_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    pub fn connections_of(&self, step: StepId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves(step))
    }

    /// Append steps and connections produced elsewhere (e.g. a generated
    /// journey), preserving their order.
    pub fn extend(&mut self, steps: Vec<Step>, connections: Vec<Connection>) {
        self.steps.extend(steps);
        self.connections.extend(connections);
    }
}
