//! Elements: the declarative map and marker components.
//!
//! - [`MapElement`] owns map properties, child markers and the map controller.
//! - [`MarkerElement`] owns marker properties and the marker controller.
//! - [`ChildTracker`] records marker slot changes between update cycles.

pub mod lifecycle;
pub mod map;
pub mod marker;

pub use lifecycle::{ChildTracker, MarkerId, SlotEvent};
pub use map::MapElement;
pub use marker::MarkerElement;
