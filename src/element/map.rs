//! MapElement: the declarative map component.
//!
//! A `MapElement` owns the map's [`MapState`], collects property writes into
//! one batch per update cycle, and drives a [`MapSyncController`]. Child
//! [`MarkerElement`]s live in a slot map under it; the next update after a
//! marker joins hands it the live map.
//!
//! # Update cycle
//!
//! ```text
//!   set(..) / widget events  ──>  PendingChanges
//!                                      │ update()
//!                                      v
//!   apiKey changed? ──> script request
//!   every changed key ──> "<name>-changed" notification
//!   declarative keys ──> one setOptions (unless mid-gesture)
//!   markers joined? ──> hand MapBinding to each of them
//!   every marker ──> its own update()
//! ```

use std::rc::Rc;

use slotmap::SlotMap;
use url::Url;

use super::lifecycle::{ChildTracker, MarkerId, SlotEvent};
use super::marker::MarkerElement;
use crate::capability::api::{MapHandle, MapsApi};
use crate::capability::loader::MapsLoader;
use crate::config::MapConfig;
use crate::error::{LoaderError, PropertyError};
use crate::event::change::ChangeEvent;
use crate::event::emitter::ChangeEventEmitter;
use crate::event::external::{MapEvent, MarkerInbound};
use crate::geometry::{LatLng, LatLngBounds};
use crate::state::map::{MapProperty, MapState, MapValue};
use crate::state::pending::{Origin, PendingChanges};
use crate::sync::map::{MapPhase, MapSyncController};

// ---------------------------------------------------------------------------
// MapElement
// ---------------------------------------------------------------------------

/// The map component.
#[derive(Debug)]
pub struct MapElement {
    state: MapState,
    pending: PendingChanges<MapProperty>,
    controller: MapSyncController,
    emitter: ChangeEventEmitter,
    markers: SlotMap<MarkerId, MarkerElement>,
    children: ChildTracker,
    loader: Option<Rc<MapsLoader>>,
    script_request: Option<Url>,
}

impl MapElement {
    /// Create a detached map with the given initial values.
    ///
    /// Initial values are not a change batch: the first update cycle after
    /// construction writes nothing and emits nothing.
    pub fn new(config: MapConfig) -> Result<Self, PropertyError> {
        Ok(Self::from_state(MapState::from_config(&config)?))
    }

    fn from_state(state: MapState) -> Self {
        Self {
            state,
            pending: PendingChanges::new(),
            controller: MapSyncController::new(),
            emitter: ChangeEventEmitter::new(),
            markers: SlotMap::with_key(),
            children: ChildTracker::new(),
            loader: None,
            script_request: None,
        }
    }

    /// Share a library loader with this map.
    ///
    /// A non-empty `apiKey` asks the loader for the script; once the loader
    /// resolves, [`connected`](Self::connected) or
    /// [`poll_capability`](Self::poll_capability) picks it up.
    pub fn with_loader(mut self, loader: Rc<MapsLoader>) -> Self {
        self.loader = Some(loader);
        self.request_script();
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current property values.
    pub fn state(&self) -> &MapState {
        &self.state
    }

    /// Binding phase of the map widget.
    pub fn phase(&self) -> MapPhase {
        self.controller.phase()
    }

    /// Whether the element is attached.
    pub fn is_connected(&self) -> bool {
        self.controller.is_attached()
    }

    /// Whether the map accepts option writes (not mid-gesture).
    pub fn is_idle(&self) -> bool {
        self.controller.can_apply()
    }

    /// The live widget, once bound.
    pub fn handle(&self) -> Option<&dyn MapHandle> {
        self.controller.handle()
    }

    /// Live center read from the widget.
    pub fn live_center(&self) -> Option<LatLng> {
        self.controller.live_center()
    }

    /// Live viewport read from the widget.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.controller.live_bounds()
    }

    /// Whether property writes or marker slot changes are waiting for the
    /// next cycle.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.children.has_pending()
    }

    /// The script URL the host should load, if a load was requested since the
    /// last call.
    pub fn take_script_request(&mut self) -> Option<Url> {
        self.script_request.take()
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Write a property. The change reaches the widget on the next
    /// [`update`](Self::update).
    ///
    /// Invalid values are rejected and the previous value kept. Writing the
    /// current value records nothing.
    pub fn set(&mut self, value: MapValue) -> Result<(), PropertyError> {
        let property = value.property();
        if self.state.set(value)? {
            self.pending.record(property, Origin::Declarative);
        }
        Ok(())
    }

    /// Move the center. Both coordinates are validated before either is
    /// written.
    pub fn set_center(&mut self, latitude: f64, longitude: f64) -> Result<(), PropertyError> {
        let center = LatLng::new(latitude, longitude)?;
        self.set(MapValue::Latitude(center.lat()))?;
        self.set(MapValue::Longitude(center.lng()))
    }

    /// Set the zoom level. Non-finite values are rejected.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), PropertyError> {
        self.set(MapValue::Zoom(zoom))
    }

    /// Set or clear the key used to request the library script.
    pub fn set_api_key(&mut self, key: Option<String>) -> Result<(), PropertyError> {
        self.set(MapValue::ApiKey(key))
    }

    /// Switch the base map type, e.g. `roadmap` or `terrain`.
    pub fn set_map_type_id(&mut self, id: impl Into<String>) -> Result<(), PropertyError> {
        self.set(MapValue::MapTypeId(id.into()))
    }

    /// Replace the style rules.
    pub fn set_styles(&mut self, styles: Vec<serde_json::Value>) -> Result<(), PropertyError> {
        self.set(MapValue::Styles(styles))
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// The element was attached to its display surface.
    pub fn connected(&mut self) {
        let bound = self.controller.attach(&self.state);
        for marker in self.markers.values_mut() {
            marker.connected();
        }
        if bound {
            self.bind_children();
        } else {
            self.poll_capability();
        }
    }

    /// The element was detached. Listeners are severed on the map and every
    /// marker; the widgets themselves are kept for a later reattach.
    pub fn disconnected(&mut self) {
        self.controller.detach();
        for marker in self.markers.values_mut() {
            marker.disconnected();
        }
    }

    /// The mapping library is available. Returns `true` if this call bound
    /// the map.
    pub fn capability_ready(&mut self, api: Rc<dyn MapsApi>) -> bool {
        let bound = self.controller.capability_ready(api, &self.state);
        if bound {
            self.bind_children();
        }
        bound
    }

    /// Pick up the library from the shared loader if it has resolved.
    /// Returns `true` if this call bound the map.
    pub fn poll_capability(&mut self) -> bool {
        if self.controller.has_capability() {
            return false;
        }
        match self.loader.as_ref().and_then(|l| l.available()) {
            Some(api) => self.capability_ready(api),
            None => false,
        }
    }

    /// Wait for the shared loader to resolve, then bind.
    ///
    /// Returns `Ok(false)` without waiting if no loader was given.
    pub async fn wait_for_capability(&mut self) -> Result<bool, LoaderError> {
        let Some(loader) = self.loader.clone() else {
            return Ok(false);
        };
        let api = loader.ready().await?;
        Ok(self.capability_ready(api))
    }

    fn request_script(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        let Some(key) = self.state.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return;
        };
        if self.controller.has_capability() {
            return;
        }
        match loader.request(key) {
            Ok(Some(url)) => self.script_request = Some(url),
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "could not build maps script url"),
        }
    }

    fn bind_markers(&mut self, ids: &[MarkerId]) {
        if ids.is_empty() {
            return;
        }
        let Some(binding) = self.controller.binding() else {
            return;
        };
        for &id in ids {
            if let Some(marker) = self.markers.get_mut(id) {
                marker.set_map(Some(binding.clone()));
            }
        }
    }

    fn bind_children(&mut self) {
        let Some(binding) = self.controller.binding() else {
            return;
        };
        for marker in self.markers.values_mut() {
            marker.set_map(Some(binding.clone()));
        }
    }

    // ── Update cycle ─────────────────────────────────────────────────

    /// Run one update cycle for the map and all of its markers.
    pub fn update(&mut self) {
        let mut joined = Vec::new();
        for event in self.children.pending_events() {
            match event {
                SlotEvent::Attached { marker } if self.children.is_present(marker) => {
                    joined.push(marker);
                }
                SlotEvent::Attached { .. } => {}
                SlotEvent::Detached { marker } => {
                    tracing::trace!(?marker, "marker left the map");
                }
            }
        }

        let batch = self.pending.take();
        if !batch.is_empty() {
            if batch.has(MapProperty::ApiKey) {
                self.request_script();
            }
            for property in batch.keys() {
                self.emitter
                    .emit(property.name(), self.state.get(property).to_json());
            }
            self.controller.apply(&self.state, &batch);
        }

        self.bind_markers(&joined);
        for marker in self.markers.values_mut() {
            marker.update();
        }
    }

    /// Deliver an event from the map widget.
    pub fn dispatch(&mut self, event: MapEvent) {
        self.controller.dispatch(
            event,
            &mut self.state,
            &mut self.pending,
            &mut self.emitter,
        );
    }

    /// Deliver an event to one marker. Returns `false` for an unknown id.
    pub fn dispatch_marker(&mut self, id: MarkerId, event: impl Into<MarkerInbound>) -> bool {
        match self.markers.get_mut(id) {
            Some(marker) => {
                marker.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Drain the map's own outbound notifications.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        self.emitter.drain()
    }

    // ── Markers ──────────────────────────────────────────────────────

    /// Add a marker under this map. It receives the live map on the next
    /// update cycle.
    pub fn insert_marker(&mut self, marker: MarkerElement) -> MarkerId {
        let id = self.markers.insert(marker);
        self.children.on_attach(id);
        if self.controller.is_attached() {
            if let Some(marker) = self.markers.get_mut(id) {
                marker.connected();
            }
        }
        id
    }

    /// Remove a marker. Its widget is taken off the map before it is
    /// returned.
    pub fn remove_marker(&mut self, id: MarkerId) -> Option<MarkerElement> {
        let mut marker = self.markers.remove(id)?;
        self.children.on_detach(id);
        if marker.is_connected() {
            marker.disconnected();
        }
        marker.set_map(None);
        Some(marker)
    }

    /// Look up a marker.
    pub fn marker(&self, id: MarkerId) -> Option<&MarkerElement> {
        self.markers.get(id)
    }

    /// Look up a marker for writing.
    pub fn marker_mut(&mut self, id: MarkerId) -> Option<&mut MarkerElement> {
        self.markers.get_mut(id)
    }

    /// Ids of every marker under this map.
    pub fn marker_ids(&self) -> Vec<MarkerId> {
        self.markers.keys().collect()
    }

    /// Number of markers under this map.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl Default for MapElement {
    fn default() -> Self {
        Self::from_state(MapState::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerConfig;
    use crate::sync::marker::MarkerPhase;
    use crate::testing::fake::{Call, FakeMaps};

    fn bound(fake: &FakeMaps) -> MapElement {
        let config = MapConfig::new().with_center(52.0, 5.0).with_zoom(8.0);
        let mut map = MapElement::new(config).unwrap();
        map.connected();
        map.capability_ready(Rc::new(fake.clone()));
        map
    }

    #[test]
    fn first_cycle_after_construction_is_quiet() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        map.update();
        assert!(map.drain_events().is_empty());
        assert_eq!(fake.count(|c| matches!(c, Call::SetOptions { .. })), 0);
    }

    #[test]
    fn invalid_write_keeps_previous_value() {
        let mut map = MapElement::default();
        assert!(map.set_center(120.0, 5.0).is_err());
        assert!(map.set_zoom(f64::INFINITY).is_err());
        assert!(!map.has_pending());
    }

    #[test]
    fn update_emits_every_changed_key() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        map.set_zoom(9.0).unwrap();
        map.set_map_type_id("terrain").unwrap();
        map.update();
        let names: Vec<_> = map.drain_events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["zoom-changed", "map-type-id-changed"]);
        assert_eq!(fake.count(|c| matches!(c, Call::SetOptions { .. })), 1);
    }

    #[test]
    fn api_key_change_requests_script_once() {
        let loader = Rc::new(MapsLoader::new());
        let mut map = MapElement::default().with_loader(Rc::clone(&loader));
        assert!(map.take_script_request().is_none());

        map.set_api_key(Some("abc".into())).unwrap();
        map.update();
        let url = map.take_script_request().unwrap();
        assert_eq!(url.query(), Some("key=abc"));

        map.set_api_key(Some("def".into())).unwrap();
        map.update();
        assert!(map.take_script_request().is_none());
    }

    #[test]
    fn loader_resolution_binds_on_connect() {
        let fake = FakeMaps::new();
        let loader = Rc::new(MapsLoader::new());
        loader.resolve(Rc::new(fake.clone()));

        let mut map = MapElement::default().with_loader(loader);
        map.connected();
        assert_eq!(map.phase(), MapPhase::Bound);
        assert_eq!(fake.maps_created(), 1);
    }

    #[test]
    fn wait_for_capability_binds() {
        let fake = FakeMaps::new();
        let loader = Rc::new(MapsLoader::new());
        let mut map = MapElement::default().with_loader(Rc::clone(&loader));
        map.connected();
        loader.resolve(Rc::new(fake.clone()));

        let bound = tokio_test::block_on(map.wait_for_capability()).unwrap();
        assert!(bound);
        assert_eq!(map.phase(), MapPhase::Bound);
    }

    #[test]
    fn inserted_marker_binds_on_next_cycle() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        let id = map.insert_marker(MarkerElement::default());
        assert_eq!(map.marker(id).unwrap().phase(), MarkerPhase::Unbound);

        map.update();
        let marker = map.marker(id).unwrap();
        assert_eq!(marker.phase(), MarkerPhase::Bound);
        assert_eq!(marker.placed_on(), map.handle().map(|h| h.token()));
    }

    #[test]
    fn only_joined_markers_are_handed_the_map() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        let first = map.insert_marker(MarkerElement::default());
        map.update();
        map.marker_mut(first).unwrap().set_map(None);
        fake.clear_calls();

        let second = map.insert_marker(MarkerElement::default());
        map.update();
        assert_eq!(map.marker(first).unwrap().placed_on(), None);
        assert!(map.marker(second).unwrap().placed_on().is_some());
        assert_eq!(fake.count(|c| matches!(c, Call::SetMap { .. })), 1);
    }

    #[test]
    fn marker_removed_before_update_is_not_bound() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        let id = map.insert_marker(MarkerElement::default());
        let removed = map.remove_marker(id).unwrap();
        assert!(map.has_pending());
        map.update();
        assert!(!map.has_pending());
        assert_eq!(removed.phase(), MarkerPhase::Unbound);
        assert_eq!(fake.markers_created(), 0);
    }

    #[test]
    fn markers_before_bind_are_placed_at_bind() {
        let fake = FakeMaps::new();
        let mut map = MapElement::default();
        let id = map.insert_marker(MarkerElement::new(MarkerConfig::new().with_title("A")).unwrap());
        map.connected();
        map.update();
        assert_eq!(fake.markers_created(), 0);

        map.capability_ready(Rc::new(fake.clone()));
        assert_eq!(fake.markers_created(), 1);
        assert_eq!(map.marker(id).unwrap().phase(), MarkerPhase::Bound);
    }

    #[test]
    fn remove_marker_takes_it_off_the_map() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        let id = map.insert_marker(MarkerElement::default());
        map.update();

        let removed = map.remove_marker(id).unwrap();
        assert_eq!(removed.placed_on(), None);
        assert_eq!(fake.count(|c| matches!(c, Call::SetMap { map: None, .. })), 1);
        assert!(map.marker(id).is_none());
        assert!(!map.dispatch_marker(id, crate::event::external::MarkerEvent::Click));
    }

    #[test]
    fn disconnect_cascades_to_markers() {
        let fake = FakeMaps::new();
        let mut map = bound(&fake);
        let id = map.insert_marker(MarkerElement::default());
        map.update();

        map.disconnected();
        assert!(!map.marker(id).unwrap().is_connected());
        assert_eq!(fake.listener_count(), 0);
    }
}
