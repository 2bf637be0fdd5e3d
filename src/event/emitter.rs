//! ChangeEventEmitter: outbound notification queue.
//!
//! Components push [`ChangeEvent`]s while they process an update cycle or an
//! inbound widget event. The host drains the queue and forwards the events to
//! the parent document.

use std::collections::VecDeque;

use serde_json::Value;

use super::change::ChangeEvent;

/// Queue of outbound change notifications.
#[derive(Debug, Default)]
pub struct ChangeEventEmitter {
    queue: VecDeque<ChangeEvent>,
}

impl ChangeEventEmitter {
    /// Create a new, empty emitter.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Convert a property name and value into a notification and enqueue it.
    pub fn emit(&mut self, property: &str, value: Value) {
        tracing::trace!(property, "change notification");
        self.queue.push_back(ChangeEvent::new(property, value));
    }

    /// Drain all pending notifications, oldest first.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        self.queue.drain(..).collect()
    }

    /// Number of pending notifications.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
