//! FakeMaps: an in-memory mapping library that records every call.
//!
//! All handles created by one `FakeMaps` share its call log, listener table
//! and live widget state, so tests can inspect what the controllers did and
//! simulate user gestures (`move_map`, `move_marker`) before firing the
//! matching event.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::capability::api::{
    InfoWindowHandle, ListenerId, MapHandle, MapToken, MapsApi, MarkerHandle, MarkerOptions,
    MarkerToken,
};
use crate::event::external::{InfoWindowEvent, MapEvent, MarkerEvent};
use crate::geometry::{LatLng, LatLngBounds};
use crate::sync::diff::{MapOption, MapOptions};

new_key_type! {
    struct ListenerKey;
}

/// Half the height and width of the fake viewport, in degrees.
const VIEWPORT_SPAN: f64 = 0.5;

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// One recorded call into the fake library.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateMap { map: MapToken, options: MapOptions },
    SetOptions { map: MapToken, options: MapOptions },
    CreateMarker { marker: MarkerToken, options: MarkerOptions },
    SetMap { marker: MarkerToken, map: Option<MapToken> },
    SetPosition { marker: MarkerToken, position: LatLng },
    SetTitle { marker: MarkerToken, title: String },
    SetLabel { marker: MarkerToken, label: Option<String> },
    SetDraggable { marker: MarkerToken, draggable: bool },
    SetVisible { marker: MarkerToken, visible: bool },
    CreateInfoWindow { window: u64 },
    SetContent { window: u64, html: String },
    OpenInfoWindow { window: u64, map: MapToken, anchor: MarkerToken },
    CloseInfoWindow { window: u64 },
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Map(MapToken),
    Marker(MarkerToken),
    InfoWindow(u64),
}

#[derive(Debug)]
struct Listener {
    target: Target,
    event: &'static str,
}

#[derive(Debug)]
struct LiveMap {
    center: LatLng,
    zoom: f64,
    map_type_id: String,
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: u64,
    calls: Vec<Call>,
    listeners: SlotMap<ListenerKey, Listener>,
    maps: HashMap<MapToken, LiveMap>,
    markers: HashMap<MarkerToken, LatLng>,
    windows_created: usize,
    windows_dropped: usize,
}

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn listen(&mut self, target: Target, event: &'static str) -> ListenerId {
        let key = self.listeners.insert(Listener { target, event });
        ListenerId(key.data().as_ffi())
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(ListenerKey::from(KeyData::from_ffi(id.0)));
    }
}

type Shared = Rc<RefCell<FakeState>>;

// ---------------------------------------------------------------------------
// FakeMaps
// ---------------------------------------------------------------------------

/// In-memory [`MapsApi`]. Clones share the same log and widget state.
#[derive(Debug, Clone, Default)]
pub struct FakeMaps {
    inner: Shared,
}

impl FakeMaps {
    /// Create an empty fake library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Forget recorded calls. Widget state and listeners are kept.
    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Number of maps constructed.
    pub fn maps_created(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateMap { .. }))
    }

    /// Number of markers constructed.
    pub fn markers_created(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateMarker { .. }))
    }

    /// Number of info popups constructed.
    pub fn info_windows_created(&self) -> usize {
        self.inner.borrow().windows_created
    }

    /// Info popups whose handle has been dropped.
    pub fn info_windows_dropped(&self) -> usize {
        self.inner.borrow().windows_dropped
    }

    /// Options of the first map construction.
    pub fn created_map_options(&self) -> Option<MapOptions> {
        self.inner.borrow().calls.iter().find_map(|c| match c {
            Call::CreateMap { options, .. } => Some(options.clone()),
            _ => None,
        })
    }

    /// Options of the most recent marker construction.
    pub fn created_marker_options(&self) -> Option<MarkerOptions> {
        self.inner.borrow().calls.iter().rev().find_map(|c| match c {
            Call::CreateMarker { options, .. } => Some(options.clone()),
            _ => None,
        })
    }

    /// The most recent `setOptions` patch.
    pub fn last_set_options(&self) -> Option<MapOptions> {
        self.inner.borrow().calls.iter().rev().find_map(|c| match c {
            Call::SetOptions { options, .. } => Some(options.clone()),
            _ => None,
        })
    }

    /// Number of registered listeners across all handles.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether any handle has a listener for the named event.
    pub fn has_listener(&self, event: &str) -> bool {
        self.inner
            .borrow()
            .listeners
            .values()
            .any(|l| l.event == event)
    }

    /// Number of listeners registered on one marker.
    pub fn marker_listener_count(&self, marker: MarkerToken) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| l.target == Target::Marker(marker))
            .count()
    }

    /// Simulate the user panning every map to `center`.
    pub fn move_map(&self, center: LatLng) {
        for map in self.inner.borrow_mut().maps.values_mut() {
            map.center = center;
        }
    }

    /// Simulate the user zooming every map to `zoom`.
    pub fn zoom_map(&self, zoom: f64) {
        for map in self.inner.borrow_mut().maps.values_mut() {
            map.zoom = zoom;
        }
    }

    /// Simulate the user switching every map to `map_type_id`.
    pub fn set_map_type(&self, map_type_id: &str) {
        for map in self.inner.borrow_mut().maps.values_mut() {
            map.map_type_id = map_type_id.to_owned();
        }
    }

    /// Simulate the user dragging `marker` to `position`.
    pub fn move_marker(&self, marker: MarkerToken, position: LatLng) {
        self.inner.borrow_mut().markers.insert(marker, position);
    }

    /// Live position of `marker`.
    pub fn marker_position(&self, marker: MarkerToken) -> Option<LatLng> {
        self.inner.borrow().markers.get(&marker).copied()
    }

    /// Live center of `map`.
    pub fn map_center(&self, map: MapToken) -> Option<LatLng> {
        self.inner.borrow().maps.get(&map).map(|m| m.center)
    }
}

impl MapsApi for FakeMaps {
    fn create_map(&self, options: &MapOptions) -> Box<dyn MapHandle> {
        let mut state = self.inner.borrow_mut();
        let token = MapToken(state.next_id());
        let map_type_id = match options.get("mapTypeId") {
            Some(MapOption::MapTypeId(id)) => id.clone(),
            _ => String::new(),
        };
        state.maps.insert(
            token,
            LiveMap {
                center: options.center().unwrap_or_default(),
                zoom: options.zoom().unwrap_or_default(),
                map_type_id,
            },
        );
        state.calls.push(Call::CreateMap {
            map: token,
            options: options.clone(),
        });
        Box::new(FakeMap {
            token,
            inner: Rc::clone(&self.inner),
        })
    }

    fn create_marker(&self, options: &MarkerOptions) -> Box<dyn MarkerHandle> {
        let mut state = self.inner.borrow_mut();
        let token = MarkerToken(state.next_id());
        state.markers.insert(token, options.position);
        state.calls.push(Call::CreateMarker {
            marker: token,
            options: options.clone(),
        });
        Box::new(FakeMarker {
            token,
            inner: Rc::clone(&self.inner),
        })
    }

    fn create_info_window(&self) -> Box<dyn InfoWindowHandle> {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id();
        state.windows_created += 1;
        state.calls.push(Call::CreateInfoWindow { window: id });
        Box::new(FakeInfoWindow {
            id,
            inner: Rc::clone(&self.inner),
        })
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

struct FakeMap {
    token: MapToken,
    inner: Shared,
}

impl FakeMap {
    fn read<T>(&self, f: impl FnOnce(&LiveMap) -> T, fallback: T) -> T {
        self.inner.borrow().maps.get(&self.token).map_or(fallback, f)
    }
}

impl MapHandle for FakeMap {
    fn token(&self) -> MapToken {
        self.token
    }

    fn set_options(&mut self, options: &MapOptions) {
        let mut state = self.inner.borrow_mut();
        if let Some(live) = state.maps.get_mut(&self.token) {
            for option in options.iter() {
                match option {
                    MapOption::Center(c) => live.center = *c,
                    MapOption::Zoom(z) => live.zoom = *z,
                    MapOption::MapTypeId(id) => live.map_type_id = id.clone(),
                    _ => {}
                }
            }
        }
        state.calls.push(Call::SetOptions {
            map: self.token,
            options: options.clone(),
        });
    }

    fn center(&self) -> LatLng {
        self.read(|m| m.center, LatLng::default())
    }

    fn zoom(&self) -> f64 {
        self.read(|m| m.zoom, 0.0)
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let center = self.center();
        let south_west = LatLng::new(
            (center.lat() - VIEWPORT_SPAN).max(-90.0),
            (center.lng() - VIEWPORT_SPAN).max(-180.0),
        )
        .ok()?;
        let north_east = LatLng::new(
            (center.lat() + VIEWPORT_SPAN).min(90.0),
            (center.lng() + VIEWPORT_SPAN).min(180.0),
        )
        .ok()?;
        Some(LatLngBounds::new(south_west, north_east))
    }

    fn map_type_id(&self) -> String {
        self.read(|m| m.map_type_id.clone(), String::new())
    }

    fn add_listener(&mut self, event: MapEvent) -> ListenerId {
        self.inner
            .borrow_mut()
            .listen(Target::Map(self.token), event.name())
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.inner.borrow_mut().unlisten(id);
    }
}

struct FakeMarker {
    token: MarkerToken,
    inner: Shared,
}

impl FakeMarker {
    fn record(&self, call: Call) {
        self.inner.borrow_mut().calls.push(call);
    }
}

impl MarkerHandle for FakeMarker {
    fn token(&self) -> MarkerToken {
        self.token
    }

    fn set_map(&mut self, map: Option<MapToken>) {
        self.record(Call::SetMap {
            marker: self.token,
            map,
        });
    }

    fn set_position(&mut self, position: LatLng) {
        self.inner.borrow_mut().markers.insert(self.token, position);
        self.record(Call::SetPosition {
            marker: self.token,
            position,
        });
    }

    fn set_title(&mut self, title: &str) {
        self.record(Call::SetTitle {
            marker: self.token,
            title: title.to_owned(),
        });
    }

    fn set_label(&mut self, label: Option<&str>) {
        self.record(Call::SetLabel {
            marker: self.token,
            label: label.map(str::to_owned),
        });
    }

    fn set_draggable(&mut self, draggable: bool) {
        self.record(Call::SetDraggable {
            marker: self.token,
            draggable,
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(Call::SetVisible {
            marker: self.token,
            visible,
        });
    }

    fn position(&self) -> LatLng {
        self.inner
            .borrow()
            .markers
            .get(&self.token)
            .copied()
            .unwrap_or_default()
    }

    fn add_listener(&mut self, event: MarkerEvent) -> ListenerId {
        self.inner
            .borrow_mut()
            .listen(Target::Marker(self.token), event.name())
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.inner.borrow_mut().unlisten(id);
    }
}

struct FakeInfoWindow {
    id: u64,
    inner: Shared,
}

impl InfoWindowHandle for FakeInfoWindow {
    fn set_content(&mut self, html: &str) {
        self.inner.borrow_mut().calls.push(Call::SetContent {
            window: self.id,
            html: html.to_owned(),
        });
    }

    fn open(&mut self, map: MapToken, anchor: MarkerToken) {
        self.inner.borrow_mut().calls.push(Call::OpenInfoWindow {
            window: self.id,
            map,
            anchor,
        });
    }

    fn close(&mut self) {
        self.inner
            .borrow_mut()
            .calls
            .push(Call::CloseInfoWindow { window: self.id });
    }

    fn add_listener(&mut self, event: InfoWindowEvent) -> ListenerId {
        self.inner
            .borrow_mut()
            .listen(Target::InfoWindow(self.id), event.name())
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.inner.borrow_mut().unlisten(id);
    }
}

impl Drop for FakeInfoWindow {
    fn drop(&mut self) {
        if let Ok(mut state) = self.inner.try_borrow_mut() {
            state.windows_dropped += 1;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
