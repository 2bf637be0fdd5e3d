//! MapSyncController: owns the external map and drives it from [`MapState`].
//!
//! ```text
//!   Unbound --(capability ready AND attached)--> Initializing --> Bound
//! ```
//!
//! Both triggers call the same idempotent `try_init`, so it does not matter
//! whether the library or the attachment arrives first. Once bound, every
//! update cycle turns its declarative keys into one options patch, gated by the
//! [`IdleGate`]. Inbound widget events are absorbed back into the state.

use std::rc::Rc;

use serde_json::Value;

use super::diff::{MapOptions, OptionsDiffBuilder};
use super::idle::IdleGate;
use crate::capability::api::{ListenerId, MapBinding, MapHandle, MapsApi};
use crate::event::emitter::ChangeEventEmitter;
use crate::event::external::MapEvent;
use crate::geometry::{LatLng, LatLngBounds};
use crate::state::map::{MapProperty, MapState, MapValue};
use crate::state::pending::{ChangeSet, Origin, PendingChanges};

// ---------------------------------------------------------------------------
// MapPhase
// ---------------------------------------------------------------------------

/// Observable phase of a [`MapSyncController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPhase {
    /// No external handle.
    Unbound,
    /// Handle construction in progress.
    Initializing,
    /// Handle exists; steady-state sync.
    Bound,
}

// ---------------------------------------------------------------------------
// BoundMap
// ---------------------------------------------------------------------------

struct BoundMap {
    handle: Box<dyn MapHandle>,
    listeners: Vec<(MapEvent, ListenerId)>,
}

impl BoundMap {
    fn listen(&mut self) {
        if !self.listeners.is_empty() {
            return;
        }
        for event in MapEvent::ALL {
            let id = self.handle.add_listener(event);
            self.listeners.push((event, id));
        }
    }

    fn unlisten(&mut self) {
        for (_, id) in self.listeners.drain(..) {
            self.handle.remove_listener(id);
        }
    }

    fn listens(&self, event: MapEvent) -> bool {
        self.listeners.iter().any(|(e, _)| *e == event)
    }

    fn write(&mut self, keys: impl IntoIterator<Item = MapProperty>, state: &MapState) -> bool {
        let patch = OptionsDiffBuilder::build(keys, state);
        if patch.is_empty() {
            return false;
        }
        tracing::trace!(keys = ?patch.keys(), "map setOptions");
        self.handle.set_options(&patch);
        true
    }
}

enum Binding {
    Unbound,
    Initializing,
    Bound(BoundMap),
}

// ---------------------------------------------------------------------------
// MapSyncController
// ---------------------------------------------------------------------------

/// Owns the external map handle and keeps it in sync with a [`MapState`].
pub struct MapSyncController {
    api: Option<Rc<dyn MapsApi>>,
    attached: bool,
    binding: Binding,
    gate: IdleGate<MapProperty>,
}

impl MapSyncController {
    /// Create an unbound, detached controller.
    pub fn new() -> Self {
        Self {
            api: None,
            attached: false,
            binding: Binding::Unbound,
            gate: IdleGate::new(),
        }
    }

    /// Where the controller is in `Unbound → Initializing → Bound`.
    pub fn phase(&self) -> MapPhase {
        match self.binding {
            Binding::Unbound => MapPhase::Unbound,
            Binding::Initializing => MapPhase::Initializing,
            Binding::Bound(_) => MapPhase::Bound,
        }
    }

    /// Whether the owning element is attached to its display surface.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the mapping library has been handed to this controller.
    pub fn has_capability(&self) -> bool {
        self.api.is_some()
    }

    /// Whether outbound writes are currently allowed.
    pub fn can_apply(&self) -> bool {
        self.gate.can_apply()
    }

    /// The live handle, once bound.
    pub fn handle(&self) -> Option<&dyn MapHandle> {
        match &self.binding {
            Binding::Bound(bound) => Some(bound.handle.as_ref()),
            _ => None,
        }
    }

    /// What child markers need to attach to this map, once bound.
    pub fn binding(&self) -> Option<MapBinding> {
        let api = self.api.clone()?;
        let token = self.handle()?.token();
        Some(MapBinding::new(token, api))
    }

    /// Live center read from the widget.
    pub fn live_center(&self) -> Option<LatLng> {
        self.handle().map(|h| h.center())
    }

    /// Live viewport read from the widget.
    pub fn live_bounds(&self) -> Option<LatLngBounds> {
        self.handle().and_then(|h| h.bounds())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// The mapping library is available. Returns `true` if this call bound
    /// the map.
    pub fn capability_ready(&mut self, api: Rc<dyn MapsApi>, state: &MapState) -> bool {
        if self.api.is_none() {
            self.api = Some(api);
        }
        self.try_init(state)
    }

    /// The element was attached. Returns `true` if this call bound the map.
    ///
    /// Reattaching an already bound map re-registers its listeners on the
    /// existing handle.
    pub fn attach(&mut self, state: &MapState) -> bool {
        self.attached = true;
        if let Binding::Bound(bound) = &mut self.binding {
            bound.listen();
            return false;
        }
        self.try_init(state)
    }

    /// The element was detached: sever all widget listeners. The handle is
    /// kept for a later reattach.
    pub fn detach(&mut self) {
        self.attached = false;
        if let Binding::Bound(bound) = &mut self.binding {
            bound.unlisten();
            tracing::debug!("map listeners severed");
        }
    }

    fn try_init(&mut self, state: &MapState) -> bool {
        if !matches!(self.binding, Binding::Unbound) || !self.attached {
            return false;
        }
        let Some(api) = self.api.clone() else {
            return false;
        };

        self.binding = Binding::Initializing;
        let options: MapOptions = OptionsDiffBuilder::full(state);
        let mut bound = BoundMap {
            handle: api.create_map(&options),
            listeners: Vec::new(),
        };
        bound.listen();
        // Construction carried the full state.
        self.gate.clear_deferred();
        tracing::debug!(token = ?bound.handle.token(), "map bound");
        self.binding = Binding::Bound(bound);
        true
    }

    // ── Outbound ─────────────────────────────────────────────────────

    /// Apply one update cycle's changes. Returns `true` if the widget's
    /// options mutator was called.
    ///
    /// Before binding nothing is written: construction reads the full state.
    pub fn apply(&mut self, state: &MapState, changes: &ChangeSet<MapProperty>) -> bool {
        let Binding::Bound(bound) = &mut self.binding else {
            return false;
        };
        match self.gate.admit(changes.declarative_keys()) {
            Some(keys) => bound.write(keys, state),
            None => {
                tracing::trace!(deferred = ?self.gate.deferred(), "map mid-gesture, write dropped");
                false
            }
        }
    }

    // ── Inbound ──────────────────────────────────────────────────────

    /// Handle one event from the widget.
    ///
    /// Events for listeners that are not registered (never bound, or severed
    /// on detach) are ignored.
    pub fn dispatch(
        &mut self,
        event: MapEvent,
        state: &mut MapState,
        pending: &mut PendingChanges<MapProperty>,
        emitter: &mut ChangeEventEmitter,
    ) {
        let Binding::Bound(bound) = &mut self.binding else {
            tracing::trace!(event = event.name(), "event for unbound map ignored");
            return;
        };
        if !bound.listens(event) {
            tracing::trace!(event = event.name(), "event without listener ignored");
            return;
        }

        match event {
            MapEvent::Idle => {
                let released = self.gate.on_idle();
                if !released.is_empty() {
                    bound.write(released, state);
                }
            }
            MapEvent::DragStart => self.gate.on_drag_start(),
            MapEvent::CenterChanged => {
                let center = bound.handle.center();
                absorb(state, pending, MapValue::Latitude(center.lat()));
                absorb(state, pending, MapValue::Longitude(center.lng()));
                emitter.emit("center", center.to_json());
            }
            MapEvent::ZoomChanged => {
                absorb(state, pending, MapValue::Zoom(bound.handle.zoom()));
            }
            MapEvent::BoundsChanged => {
                let bounds = bound.handle.bounds().map_or(Value::Null, |b| b.to_json());
                emitter.emit("bounds", bounds);
            }
            MapEvent::MapTypeIdChanged => {
                absorb(state, pending, MapValue::MapTypeId(bound.handle.map_type_id()));
            }
        }
    }
}

impl Default for MapSyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MapSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSyncController")
            .field("phase", &self.phase())
            .field("attached", &self.attached)
            .field("capability", &self.api.is_some())
            .field("gate", &self.gate)
            .finish()
    }
}

/// Write a value read from the widget into the state.
fn absorb(state: &mut MapState, pending: &mut PendingChanges<MapProperty>, value: MapValue) {
    let property = value.property();
    match state.set(value) {
        Ok(true) => pending.record(property, Origin::Absorbed),
        Ok(false) => {}
        Err(error) => tracing::warn!(%error, "ignoring value reported by map"),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
