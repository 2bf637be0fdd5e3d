//! Headless testing framework: a fake mapping library and the Pilot.
//!
//! Use [`FakeMaps`] as the [`MapsApi`](crate::capability::MapsApi) in unit
//! tests to record every call the controllers make. Use the [`Pilot`] to drive
//! a whole [`MapElement`](crate::element::MapElement) through gestures and
//! update cycles.

pub mod fake;
pub mod pilot;

pub use fake::{Call, FakeMaps};
pub use pilot::Pilot;
