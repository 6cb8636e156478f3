//! Map mutations produced by interactions and session operations.
//!
//! Everything that changes a `JourneyMap` from the editor goes through
//! [`apply_mutation`], which keeps the store-level guards (cascade delete,
//! connection duplicate check) in one place.

use jf_core::id::{ConnectionId, StepId};
use jf_core::map::JourneyMap;
use jf_core::model::{Bounds, Connection, Step, StepColor, StepType};

#[derive(Debug, Clone, PartialEq)]
pub enum MapMutation {
    AddStep {
        step: Box<Step>,
    },
    RemoveStep {
        id: StepId,
    },
    MoveStep {
        id: StepId,
        x: f64,
        y: f64,
    },
    SetStepBounds {
        id: StepId,
        bounds: Bounds,
    },
    SetTitle {
        id: StepId,
        title: String,
    },
    SetDescription {
        id: StepId,
        description: String,
    },
    SetStepType {
        id: StepId,
        step_type: StepType,
    },
    SetStepColor {
        id: StepId,
        color: StepColor,
    },
    ToggleHighlight {
        id: StepId,
    },
    /// Guarded: self-loops and pairs already joined either way are dropped.
    Connect {
        from: StepId,
        to: StepId,
    },
    RemoveConnection {
        id: ConnectionId,
    },
    /// Append a batch of already-validated steps and connections.
    Merge {
        steps: Vec<Step>,
        connections: Vec<Connection>,
    },
}

/// Apply a mutation. Returns `false` when it was a no-op (unknown id,
/// rejected connection).
pub fn apply_mutation(map: &mut JourneyMap, mutation: MapMutation) -> bool {
    match mutation {
        MapMutation::AddStep { step } => {
            map.add_step(*step);
            true
        }
        MapMutation::RemoveStep { id } => map.remove_step(id).is_some(),
        MapMutation::MoveStep { id, x, y } => map.move_step(id, x, y),
        MapMutation::SetStepBounds { id, bounds } => map.set_step_bounds(id, bounds),
        MapMutation::SetTitle { id, title } => map.set_title(id, title),
        MapMutation::SetDescription { id, description } => map.set_description(id, description),
        MapMutation::SetStepType { id, step_type } => map.set_step_type(id, step_type),
        MapMutation::SetStepColor { id, color } => map.set_step_color(id, color),
        MapMutation::ToggleHighlight { id } => map.toggle_highlight(id).is_some(),
        MapMutation::Connect { from, to } => map.connect(from, to).is_some(),
        MapMutation::RemoveConnection { id } => map.remove_connection(id).is_some(),
        MapMutation::Merge { steps, connections } => {
            let changed = !steps.is_empty() || !connections.is_empty();
            map.extend(steps, connections);
            changed
        }
    }
}
