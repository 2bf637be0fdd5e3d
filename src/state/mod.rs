//! Declarative property model: map and marker state, change batches.

pub mod map;
pub mod marker;
pub mod pending;

pub use map::{MapProperty, MapState, MapValue, UiOptions};
pub use marker::{MarkerProperty, MarkerState, MarkerValue};
pub use pending::{ChangeSet, Origin, PendingChanges};
