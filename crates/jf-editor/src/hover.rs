//! Connection hover with debounced clearing.
//!
//! Entering a connection's hover zone lights it up immediately. Leaving
//! schedules a clear [`HOVER_CLEAR_DELAY_MS`] later; re-entering before
//! then cancels it, so the pointer can travel from the curve onto the
//! midpoint delete button without flicker. Timestamps come from the host.

use jf_core::id::ConnectionId;
use std::collections::{HashMap, HashSet};

pub const HOVER_CLEAR_DELAY_MS: f64 = 50.0;

#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    hovered: HashSet<ConnectionId>,
    /// Connection → time (ms) at which its hover clears.
    pending_clear: HashMap<ConnectionId, f64>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hovered(&mut self, id: ConnectionId, hovered: bool, now_ms: f64) {
        if hovered {
            self.pending_clear.remove(&id);
            self.hovered.insert(id);
        } else if self.hovered.contains(&id) {
            self.pending_clear
                .entry(id)
                .or_insert(now_ms + HOVER_CLEAR_DELAY_MS);
        }
    }

    /// Mark exactly `current` as hovered (or none), scheduling clears for
    /// every other hovered connection.
    pub fn pointer_over(&mut self, current: Option<ConnectionId>, now_ms: f64) {
        let others: Vec<ConnectionId> = self
            .hovered
            .iter()
            .copied()
            .filter(|id| Some(*id) != current)
            .collect();
        for id in others {
            self.set_hovered(id, false, now_ms);
        }
        if let Some(id) = current {
            self.set_hovered(id, true, now_ms);
        }
    }

    /// Apply clears that are due. Returns true if the hovered set changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let due: Vec<ConnectionId> = self
            .pending_clear
            .iter()
            .filter(|(_, deadline)| **deadline <= now_ms)
            .map(|(id, _)| *id)
            .collect();
        for id in &due {
            self.pending_clear.remove(id);
            self.hovered.remove(id);
        }
        !due.is_empty()
    }

    pub fn is_hovered(&self, id: ConnectionId) -> bool {
        self.hovered.contains(&id)
    }

    pub fn hovered(&self) -> &HashSet<ConnectionId> {
        &self.hovered
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_clear.is_empty()
    }

    /// Drop all state for a connection (e.g. after it was deleted).
    pub fn forget(&mut self, id: ConnectionId) {
        self.hovered.remove(&id);
        self.pending_clear.remove(&id);
    }

    pub fn clear(&mut self) {
        self.hovered.clear();
        self.pending_clear.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_after_delay() {
        let id = ConnectionId::intern("hover-a");
        let mut hover = HoverTracker::new();
        hover.set_hovered(id, true, 0.0);
        hover.set_hovered(id, false, 100.0);
        assert!(!hover.tick(149.0));
        assert!(hover.is_hovered(id));
        assert!(hover.tick(150.0));
        assert!(!hover.is_hovered(id));
    }

    #[test]
    fn rehover_cancels_pending_clear() {
        let id = ConnectionId::intern("hover-b");
        let mut hover = HoverTracker::new();
        hover.set_hovered(id, true, 0.0);
        hover.set_hovered(id, false, 10.0);
        hover.set_hovered(id, true, 30.0);
        assert!(!hover.tick(1000.0));
        assert!(hover.is_hovered(id));
    }

    #[test]
    fn leave_without_enter_is_ignored() {
        let id = ConnectionId::intern("hover-c");
        let mut hover = HoverTracker::new();
        hover.set_hovered(id, false, 0.0);
        assert!(!hover.has_pending());
    }

    #[test]
    fn pointer_over_swaps_hover() {
        let a = ConnectionId::intern("hover-d");
        let b = ConnectionId::intern("hover-e");
        let mut hover = HoverTracker::new();
        hover.pointer_over(Some(a), 0.0);
        hover.pointer_over(Some(b), 5.0);
        assert!(hover.is_hovered(a) && hover.is_hovered(b));
        hover.tick(55.0);
        assert!(!hover.is_hovered(a));
        assert!(hover.is_hovered(b));
    }
}
