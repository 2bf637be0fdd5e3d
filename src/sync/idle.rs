//! IdleGate: suppresses outbound writes while the widget is mid-gesture.
//!
//! The gate is closed from `dragstart` until the next `idle`. Key sets admitted
//! while closed are not applied; only their keys are remembered. When the
//! gate reopens it hands those keys back once, and the caller rebuilds the
//! write from its *current* state. Values are never replayed, so the most
//! recent declarative state wins.

use std::collections::BTreeSet;

/// Idle flag plus the keys dropped while it was down.
#[derive(Debug, Clone)]
pub struct IdleGate<K: Ord + Copy> {
    idle: bool,
    deferred: BTreeSet<K>,
}

impl<K: Ord + Copy> IdleGate<K> {
    /// Create an open gate.
    pub fn new() -> Self {
        Self {
            idle: true,
            deferred: BTreeSet::new(),
        }
    }

    /// A gesture started: close the gate.
    pub fn on_drag_start(&mut self) {
        self.idle = false;
    }

    /// The widget settled: open the gate and return the keys dropped while it
    /// was closed.
    pub fn on_idle(&mut self) -> BTreeSet<K> {
        self.idle = true;
        std::mem::take(&mut self.deferred)
    }

    /// Whether outbound writes may be applied right now.
    pub fn can_apply(&self) -> bool {
        self.idle
    }

    /// Offer a set of changed keys for writing.
    ///
    /// Returns the keys to write now, or `None` if the gate is closed, in which
    /// case the keys are remembered for [`on_idle`](Self::on_idle).
    pub fn admit(&mut self, keys: impl IntoIterator<Item = K>) -> Option<BTreeSet<K>> {
        let keys: BTreeSet<K> = keys.into_iter().collect();
        if self.idle {
            Some(keys)
        } else {
            self.deferred.extend(keys);
            None
        }
    }

    /// Keys currently waiting for the gate to reopen.
    pub fn deferred(&self) -> &BTreeSet<K> {
        &self.deferred
    }

    /// Forget deferred keys without applying them.
    pub fn clear_deferred(&mut self) {
        self.deferred.clear();
    }
}

impl<K: Ord + Copy> Default for IdleGate<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
