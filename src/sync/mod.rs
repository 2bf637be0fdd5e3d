//! Synchronization engine: declarative state in, imperative widget calls out.
//!
//! - **[`idle`]**: the gate that holds back writes while the user is dragging
//! - **[`diff`]**: options patches built from a change batch
//! - **[`map`]**: the map controller and its `Unbound → Initializing → Bound` machine
//! - **[`marker`]**: the per-marker controller
//! - **[`popup`]**: the marker's info popup sub-machine

pub mod diff;
pub mod idle;
pub mod map;
pub mod marker;
pub mod popup;

pub use diff::{MapOption, MapOptions, OptionsDiffBuilder};
pub use idle::IdleGate;
pub use map::{MapPhase, MapSyncController};
pub use marker::{MarkerPhase, MarkerSyncController};
pub use popup::{InfoPopup, PopupPhase};
