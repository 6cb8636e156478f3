//! Undo/redo history.
//!
//! Every entry is a pair of whole-map snapshots. Gestures use
//! **snapshot batching**: the map is captured when the gesture starts and
//! compared when it ends, so a drag of a hundred moves is one undo step.
//! The view transform is not part of history.

use jf_core::map::JourneyMap;

#[derive(Debug, Clone)]
struct Snapshot {
    before: JourneyMap,
    after: JourneyMap,
    description: String,
}

pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
    /// Map captured at the start of the open batch, if any.
    batch: Option<(JourneyMap, String)>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch: None,
        }
    }

    /// Start a batch. A second call while one is open is ignored.
    pub fn begin_batch(&mut self, map: &JourneyMap, description: &str) {
        if self.batch.is_none() {
            self.batch = Some((map.clone(), description.to_string()));
        }
    }

    /// Close the open batch, recording it if the map changed.
    pub fn end_batch(&mut self, map: &JourneyMap) {
        if let Some((before, description)) = self.batch.take() {
            self.record(before, map, &description);
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Record a completed edit. No-op if `before == after`.
    pub fn record(&mut self, before: JourneyMap, after: &JourneyMap, description: &str) {
        if before == *after {
            return;
        }
        self.undo_stack.push(Snapshot {
            before,
            after: after.clone(),
            description: description.to_string(),
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Restore the state before the last edit. Returns its description.
    pub fn undo(&mut self, map: &mut JourneyMap) -> Option<String> {
        let snap = self.undo_stack.pop()?;
        *map = snap.before.clone();
        let desc = snap.description.clone();
        self.redo_stack.push(snap);
        Some(desc)
    }

    pub fn redo(&mut self, map: &mut JourneyMap) -> Option<String> {
        let snap = self.redo_stack.pop()?;
        *map = snap.after.clone();
        let desc = snap.description.clone();
        self.undo_stack.push(snap);
        Some(desc)
    }

    /// Drop the newest entry if it produced `map`, as when an edit is
    /// reverted outside of undo. Returns whether an entry was dropped.
    pub fn discard_last(&mut self, map: &JourneyMap) -> bool {
        let produced = self.undo_stack.last().is_some_and(|snap| snap.after == *map);
        if produced {
            self.undo_stack.pop();
        }
        produced
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch = None;
    }
}
