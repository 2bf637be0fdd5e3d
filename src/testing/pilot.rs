//! Pilot: programmatic interaction with a headless map.
//!
//! The `Pilot` wraps a [`MapElement`] bound to a [`FakeMaps`] library and
//! provides methods to simulate user gestures (pan, zoom, drag, click), run
//! update cycles, and collect the change notifications they produce.

use std::rc::Rc;

use crate::config::MapConfig;
use crate::element::{MapElement, MarkerElement, MarkerId};
use crate::error::PropertyError;
use crate::event::change::ChangeEvent;
use crate::event::external::{InfoWindowEvent, MapEvent, MarkerEvent};
use crate::geometry::LatLng;

use super::fake::FakeMaps;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless map driver for testing.
///
/// # Examples
///
/// ```
/// use map_sync::testing::Pilot;
///
/// let mut pilot = Pilot::new();
/// pilot.attach_and_load();
/// pilot.map_mut().set_zoom(12.0).unwrap();
/// pilot.process();
/// assert_eq!(pilot.event_names(), vec!["zoom-changed"]);
/// ```
pub struct Pilot {
    map: MapElement,
    fake: FakeMaps,
    events: Vec<ChangeEvent>,
}

impl Pilot {
    /// Create a pilot around a detached map with default properties.
    pub fn new() -> Self {
        Self::from_element(MapElement::default())
    }

    /// Create a pilot from a [`MapConfig`].
    pub fn with_config(config: MapConfig) -> Result<Self, PropertyError> {
        Ok(Self::from_element(MapElement::new(config)?))
    }

    fn from_element(map: MapElement) -> Self {
        Self {
            map,
            fake: FakeMaps::new(),
            events: Vec::new(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Attach the map element.
    pub fn attach(&mut self) {
        self.map.connected();
    }

    /// Detach the map element.
    pub fn detach(&mut self) {
        self.map.disconnected();
    }

    /// Hand the fake library to the map.
    pub fn load(&mut self) -> bool {
        self.map.capability_ready(Rc::new(self.fake.clone()))
    }

    /// Attach, then load the library.
    pub fn attach_and_load(&mut self) -> bool {
        self.attach();
        self.load()
    }

    /// Add a marker under the map.
    pub fn add_marker(&mut self, marker: MarkerElement) -> MarkerId {
        self.map.insert_marker(marker)
    }

    // ── Gesture simulation ───────────────────────────────────────────

    /// Deliver one map event.
    pub fn fire(&mut self, event: MapEvent) {
        self.map.dispatch(event);
    }

    /// Deliver one marker event. Returns `false` for an unknown marker.
    pub fn fire_marker(&mut self, id: MarkerId, event: MarkerEvent) -> bool {
        self.map.dispatch_marker(id, event)
    }

    /// Simulate the user closing a marker's popup.
    pub fn close_popup(&mut self, id: MarkerId) -> bool {
        self.map.dispatch_marker(id, InfoWindowEvent::CloseClick)
    }

    /// Begin a map gesture.
    pub fn drag_start(&mut self) {
        self.fire(MapEvent::DragStart);
    }

    /// Pan the live map to `center` and report it.
    pub fn pan_to(&mut self, center: LatLng) {
        self.fake.move_map(center);
        self.fire(MapEvent::CenterChanged);
    }

    /// Zoom the live map to `zoom` and report it.
    pub fn zoom_to(&mut self, zoom: f64) {
        self.fake.zoom_map(zoom);
        self.fire(MapEvent::ZoomChanged);
    }

    /// Settle the map after a gesture.
    pub fn idle(&mut self) {
        self.fire(MapEvent::Idle);
    }

    /// Drag a marker to `position`: dragstart, position_changed, idle.
    pub fn drag_marker(&mut self, id: MarkerId, position: LatLng) -> bool {
        let Some(token) = self.map.marker(id).and_then(MarkerElement::handle_token) else {
            return false;
        };
        self.fire_marker(id, MarkerEvent::DragStart);
        self.fake.move_marker(token, position);
        self.fire_marker(id, MarkerEvent::PositionChanged);
        self.fire_marker(id, MarkerEvent::Idle);
        true
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Run one update cycle and collect every notification it produced.
    pub fn process(&mut self) {
        self.map.update();
        self.collect();
    }

    fn collect(&mut self) {
        self.events.extend(self.map.drain_events());
        for id in self.map.marker_ids() {
            if let Some(marker) = self.map.marker_mut(id) {
                self.events.extend(marker.drain_events());
            }
        }
    }

    // ── Query ────────────────────────────────────────────────────────

    /// The driven map element.
    pub fn map(&self) -> &MapElement {
        &self.map
    }

    /// The driven map element, for property writes.
    pub fn map_mut(&mut self) -> &mut MapElement {
        &mut self.map
    }

    /// The fake library shared by every handle this pilot creates.
    pub fn fake(&self) -> &FakeMaps {
        &self.fake
    }

    /// Drain collected notifications, including any not yet collected.
    pub fn take_events(&mut self) -> Vec<ChangeEvent> {
        self.collect();
        std::mem::take(&mut self.events)
    }

    /// Drain collected notification names.
    pub fn event_names(&mut self) -> Vec<String> {
        self.take_events().into_iter().map(|e| e.name).collect()
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
