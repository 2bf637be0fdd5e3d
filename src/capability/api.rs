//! Collaborator traits for the external map library.
//!
//! Handles are opaque and exclusively owned: a [`MapHandle`] by its map
//! controller, a [`MarkerHandle`] by its marker controller, an
//! [`InfoWindowHandle`] by its popup. Cross references between them (a
//! marker placed on a map, a popup anchored to a marker) go through the
//! copyable [`MapToken`] and [`MarkerToken`] identities instead.

use std::fmt;
use std::rc::Rc;

use crate::event::external::{InfoWindowEvent, MapEvent, MarkerEvent};
use crate::geometry::{LatLng, LatLngBounds};
use crate::sync::diff::MapOptions;

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Identity of an external map, usable as a `setMap` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapToken(pub u64);

/// Identity of an external marker, usable as a popup anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerToken(pub u64);

/// A registered event listener, returned by `add_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

// ---------------------------------------------------------------------------
// MarkerOptions
// ---------------------------------------------------------------------------

/// Construction options for an external marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: String,
    pub label: Option<String>,
    pub draggable: bool,
    pub visible: bool,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Constructors exposed by the loaded library.
pub trait MapsApi {
    /// Construct a map with the full initial options.
    fn create_map(&self, options: &MapOptions) -> Box<dyn MapHandle>;

    /// Construct a marker. It is not placed on any map until `set_map`.
    fn create_marker(&self, options: &MarkerOptions) -> Box<dyn MarkerHandle>;

    /// Construct an empty, closed info popup.
    fn create_info_window(&self) -> Box<dyn InfoWindowHandle>;
}

/// An external map instance.
pub trait MapHandle {
    fn token(&self) -> MapToken;

    /// Apply a partial options object.
    fn set_options(&mut self, options: &MapOptions);

    /// Live center.
    fn center(&self) -> LatLng;

    /// Live zoom level.
    fn zoom(&self) -> f64;

    /// Live viewport, if the map has been laid out.
    fn bounds(&self) -> Option<LatLngBounds>;

    /// Live map type id.
    fn map_type_id(&self) -> String;

    fn add_listener(&mut self, event: MapEvent) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

/// An external marker instance.
pub trait MarkerHandle {
    fn token(&self) -> MarkerToken;

    /// Place the marker on `map`, or take it off its map with `None`.
    fn set_map(&mut self, map: Option<MapToken>);

    fn set_position(&mut self, position: LatLng);

    fn set_title(&mut self, title: &str);

    fn set_label(&mut self, label: Option<&str>);

    fn set_draggable(&mut self, draggable: bool);

    fn set_visible(&mut self, visible: bool);

    /// Live position.
    fn position(&self) -> LatLng;

    fn add_listener(&mut self, event: MarkerEvent) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

/// An external info popup.
pub trait InfoWindowHandle {
    fn set_content(&mut self, html: &str);

    /// Show the popup on `map`, anchored at `anchor`.
    fn open(&mut self, map: MapToken, anchor: MarkerToken);

    fn close(&mut self);

    fn add_listener(&mut self, event: InfoWindowEvent) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

// ---------------------------------------------------------------------------
// MapBinding
// ---------------------------------------------------------------------------

/// What a map element hands to its child markers: the identity of the live
/// map plus the library to construct markers with.
#[derive(Clone)]
pub struct MapBinding {
    pub token: MapToken,
    pub api: Rc<dyn MapsApi>,
}

impl MapBinding {
    /// Pair a live map with the library that created it.
    pub fn new(token: MapToken, api: Rc<dyn MapsApi>) -> Self {
        Self { token, api }
    }
}

impl fmt::Debug for MapBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapBinding")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
