//! Event system: outbound change notifications, inbound widget events.

pub mod change;
pub mod emitter;
pub mod external;

pub use change::{camel_to_dash, ChangeDetail, ChangeEvent};
pub use emitter::ChangeEventEmitter;
pub use external::{InfoWindowEvent, MapEvent, MarkerEvent, MarkerInbound};
