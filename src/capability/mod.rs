//! The mapping capability: the external library as seen by the sync engine.
//!
//! [`api`] describes the constructor and mutator surface the controllers
//! drive. [`loader`] is the readiness signal that tells elements when that
//! surface exists.

pub mod api;
pub mod loader;

pub use api::{
    InfoWindowHandle, ListenerId, MapBinding, MapHandle, MapToken, MapsApi, MarkerHandle,
    MarkerOptions, MarkerToken,
};
pub use loader::{script_url, MapsLoader, MAPS_SCRIPT_URL};
