//! Change batching: which keys changed since the last update cycle.
//!
//! Property writes record their key in a [`PendingChanges`] set. The update
//! cycle drains it into a [`ChangeSet`], so any number of writes between two
//! cycles coalesce into one batch with each key listed once.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Where a recorded change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Written by the parent document (or on behalf of the user); must reach
    /// the external widget.
    Declarative,
    /// Read back from the external widget's live state; the widget already
    /// holds this value, so it is only announced, never written back.
    Absorbed,
}

// ---------------------------------------------------------------------------
// PendingChanges
// ---------------------------------------------------------------------------

/// Keys written since the last update cycle.
#[derive(Debug, Clone)]
pub struct PendingChanges<K: Ord + Copy> {
    keys: BTreeMap<K, Origin>,
}

impl<K: Ord + Copy> PendingChanges<K> {
    /// Create an empty pending set.
    pub fn new() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Record a change to `key`.
    ///
    /// A declarative write upgrades an earlier absorbed one for the same key;
    /// the reverse never downgrades.
    pub fn record(&mut self, key: K, origin: Origin) {
        self.keys
            .entry(key)
            .and_modify(|existing| {
                if origin == Origin::Declarative {
                    *existing = Origin::Declarative;
                }
            })
            .or_insert(origin);
    }

    /// Whether `key` is waiting for the next cycle.
    pub fn contains(&self, key: K) -> bool {
        self.keys.contains_key(&key)
    }

    /// Whether nothing changed since the last cycle.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct pending keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Drain the pending keys into a batch.
    pub fn take(&mut self) -> ChangeSet<K> {
        ChangeSet {
            keys: std::mem::take(&mut self.keys),
        }
    }
}

impl<K: Ord + Copy> Default for PendingChanges<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// The batch of keys that changed in one update cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<K: Ord + Copy> {
    keys: BTreeMap<K, Origin>,
}

impl<K: Ord + Copy> ChangeSet<K> {
    /// Build a batch where every key is declarative.
    pub fn declarative(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|k| (k, Origin::Declarative))
                .collect(),
        }
    }

    /// Whether `key` changed in this cycle.
    pub fn has(&self, key: K) -> bool {
        self.keys.contains_key(&key)
    }

    /// The origin of `key`, if it changed.
    pub fn origin(&self, key: K) -> Option<Origin> {
        self.keys.get(&key).copied()
    }

    /// Whether `key` changed and must be written to the external widget.
    pub fn is_declarative(&self, key: K) -> bool {
        self.origin(key) == Some(Origin::Declarative)
    }

    /// All changed keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.keys.keys().copied()
    }

    /// Changed keys that must be written to the external widget.
    pub fn declarative_keys(&self) -> impl Iterator<Item = K> + '_ {
        self.keys
            .iter()
            .filter(|(_, origin)| **origin == Origin::Declarative)
            .map(|(key, _)| *key)
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of changed keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let pending = PendingChanges::<u8>::new();
        assert!(pending.is_empty());
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn repeated_writes_coalesce() {
        let mut pending = PendingChanges::new();
        pending.record(1u8, Origin::Declarative);
        pending.record(1u8, Origin::Declarative);
        pending.record(2u8, Origin::Absorbed);
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn declarative_upgrades_absorbed() {
        let mut pending = PendingChanges::new();
        pending.record(1u8, Origin::Absorbed);
        pending.record(1u8, Origin::Declarative);
        let batch = pending.take();
        assert_eq!(batch.origin(1), Some(Origin::Declarative));
    }

    #[test]
    fn absorbed_never_downgrades() {
        let mut pending = PendingChanges::new();
        pending.record(1u8, Origin::Declarative);
        pending.record(1u8, Origin::Absorbed);
        let batch = pending.take();
        assert!(batch.is_declarative(1));
    }

    #[test]
    fn take_drains() {
        let mut pending = PendingChanges::new();
        pending.record(3u8, Origin::Declarative);
        let batch = pending.take();
        assert!(batch.has(3));
        assert!(pending.is_empty());
        assert!(pending.take().is_empty());
    }

    #[test]
    fn declarative_keys_skip_absorbed() {
        let mut pending = PendingChanges::new();
        pending.record(1u8, Origin::Absorbed);
        pending.record(2u8, Origin::Declarative);
        pending.record(3u8, Origin::Declarative);
        let batch = pending.take();
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(batch.declarative_keys().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn declarative_constructor() {
        let batch = ChangeSet::declarative([5u8, 4u8]);
        assert_eq!(batch.len(), 2);
        assert!(batch.is_declarative(4));
        assert!(!batch.has(6));
    }
}
