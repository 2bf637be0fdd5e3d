//! Child marker tracking: attach, detach, slot changes.
//!
//! The `ChildTracker` records which markers are currently present under a map
//! element and accumulates slot events (`Attached`, `Detached`). The map drains
//! them on its next update cycle and hands its live map to each marker that
//! joined and is still present.

use std::collections::HashSet;

use slotmap::new_key_type;

new_key_type! {
    /// Identifies a marker element under its map element.
    pub struct MarkerId;
}

// ---------------------------------------------------------------------------
// SlotEvent
// ---------------------------------------------------------------------------

/// A change to the set of child markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEvent {
    Attached { marker: MarkerId },
    Detached { marker: MarkerId },
}

// ---------------------------------------------------------------------------
// ChildTracker
// ---------------------------------------------------------------------------

/// Tracks which markers are present and accumulates slot events.
#[derive(Debug, Default)]
pub struct ChildTracker {
    present: HashSet<MarkerId>,
    pending: Vec<SlotEvent>,
}

impl ChildTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            present: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Record that a marker joined. Re-attaching a present marker is a no-op.
    pub fn on_attach(&mut self, marker: MarkerId) {
        if self.present.insert(marker) {
            self.pending.push(SlotEvent::Attached { marker });
        }
    }

    /// Record that a marker left. Detaching an absent marker is a no-op.
    pub fn on_detach(&mut self, marker: MarkerId) {
        if self.present.remove(&marker) {
            self.pending.push(SlotEvent::Detached { marker });
        }
    }

    /// Whether `marker` is currently under the map.
    pub fn is_present(&self, marker: MarkerId) -> bool {
        self.present.contains(&marker)
    }

    /// Drain and return all pending slot events.
    pub fn pending_events(&mut self) -> Vec<SlotEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Whether slot events are waiting to be drained.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_id(sm: &mut SlotMap<MarkerId, ()>) -> MarkerId {
        sm.insert(())
    }

    #[test]
    fn new_tracker_is_empty() {
        let mut tracker = ChildTracker::new();
        assert!(!tracker.has_pending());
        assert!(tracker.pending_events().is_empty());
    }

    #[test]
    fn attach_produces_event() {
        let mut sm = SlotMap::with_key();
        let id = make_id(&mut sm);
        let mut tracker = ChildTracker::new();

        tracker.on_attach(id);
        assert!(tracker.is_present(id));
        assert_eq!(tracker.pending_events(), vec![SlotEvent::Attached { marker: id }]);
    }

    #[test]
    fn double_attach_is_noop() {
        let mut sm = SlotMap::with_key();
        let id = make_id(&mut sm);
        let mut tracker = ChildTracker::new();

        tracker.on_attach(id);
        tracker.on_attach(id);
        assert!(tracker.is_present(id));
        assert_eq!(tracker.pending_events().len(), 1);
    }

    #[test]
    fn detach_absent_is_noop() {
        let mut sm = SlotMap::with_key();
        let id = make_id(&mut sm);
        let mut tracker = ChildTracker::new();

        tracker.on_detach(id);
        assert!(!tracker.has_pending());
    }

    #[test]
    fn attach_then_detach_sequence() {
        let mut sm = SlotMap::with_key();
        let a = make_id(&mut sm);
        let b = make_id(&mut sm);
        let mut tracker = ChildTracker::new();

        tracker.on_attach(a);
        tracker.on_attach(b);
        tracker.on_detach(a);

        let events = tracker.pending_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], SlotEvent::Detached { marker: a });
        assert!(!tracker.is_present(a));
        assert!(tracker.is_present(b));
        assert!(tracker.pending_events().is_empty());
    }
}
