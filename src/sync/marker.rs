//! MarkerSyncController: the map contract at marker granularity.
//!
//! A marker becomes `Bound` as soon as it is connected and has been handed a
//! [`MapBinding`]; construction is synchronous. Position writes are gated by
//! the marker's own [`IdleGate`] since each marker is dragged independently.
//! Title, label, draggable and visibility are written immediately because no
//! gesture can perturb them. The info popup lives in an [`InfoPopup`].

use super::idle::IdleGate;
use super::popup::{InfoPopup, PopupPhase};
use crate::capability::api::{ListenerId, MapBinding, MapToken, MarkerHandle, MarkerOptions};
use crate::event::emitter::ChangeEventEmitter;
use crate::event::external::{InfoWindowEvent, MarkerEvent, MarkerInbound};
use crate::state::marker::{MarkerProperty, MarkerState, MarkerValue};
use crate::state::pending::{ChangeSet, Origin, PendingChanges};

/// Observable phase of a [`MarkerSyncController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPhase {
    Unbound,
    Bound,
}

struct BoundMarker {
    handle: Box<dyn MarkerHandle>,
    /// The map the handle is currently placed on.
    placed_on: Option<MapToken>,
    listeners: Vec<(MarkerEvent, ListenerId)>,
}

impl BoundMarker {
    fn place(&mut self, map: Option<MapToken>) {
        if self.placed_on != map {
            self.handle.set_map(map);
            self.placed_on = map;
        }
    }

    fn listen(&mut self) {
        if !self.listeners.is_empty() {
            return;
        }
        for event in MarkerEvent::CORE {
            let id = self.handle.add_listener(event);
            self.listeners.push((event, id));
        }
    }

    fn unlisten(&mut self) {
        for (_, id) in self.listeners.drain(..) {
            self.handle.remove_listener(id);
        }
    }

    fn listens(&self, event: MarkerEvent) -> bool {
        self.listeners.iter().any(|(e, _)| *e == event)
    }
}

fn marker_options(state: &MarkerState) -> MarkerOptions {
    MarkerOptions {
        position: state.position(),
        title: state.title.clone(),
        label: state.label.clone(),
        draggable: state.draggable,
        visible: !state.hidden,
    }
}

/// Owns one external marker and keeps it in sync with a [`MarkerState`].
pub struct MarkerSyncController {
    map: Option<MapBinding>,
    connected: bool,
    bound: Option<BoundMarker>,
    gate: IdleGate<MarkerProperty>,
    popup: InfoPopup,
}

impl MarkerSyncController {
    /// Create a detached controller with no map and no popup.
    pub fn new() -> Self {
        Self {
            map: None,
            connected: false,
            bound: None,
            gate: IdleGate::new(),
            popup: InfoPopup::Closed,
        }
    }

    /// `Bound` once the external marker has been constructed.
    pub fn phase(&self) -> MarkerPhase {
        if self.bound.is_some() {
            MarkerPhase::Bound
        } else {
            MarkerPhase::Unbound
        }
    }

    /// Phase of the marker's info popup.
    pub fn popup_phase(&self) -> PopupPhase {
        self.popup.phase()
    }

    /// Whether the owning element is connected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether position writes are allowed (no drag in progress).
    pub fn can_apply(&self) -> bool {
        self.gate.can_apply()
    }

    /// The map the external marker is currently placed on.
    pub fn placed_on(&self) -> Option<MapToken> {
        self.bound.as_ref().and_then(|b| b.placed_on)
    }

    /// The live handle, once bound.
    pub fn handle(&self) -> Option<&dyn MarkerHandle> {
        self.bound.as_ref().map(|b| b.handle.as_ref())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Receive the parent's map, or `None` when taken away from it.
    pub fn set_map(&mut self, map: Option<MapBinding>, state: &MarkerState) {
        match map {
            Some(binding) => {
                self.map = Some(binding);
                self.sync_placement(state);
            }
            None => {
                self.map = None;
                if let Some(bound) = &mut self.bound {
                    bound.place(None);
                }
            }
        }
    }

    /// The element was connected: re-register listeners and put the marker
    /// back on its map, constructing it first if needed.
    pub fn connect(&mut self, state: &MarkerState) {
        self.connected = true;
        if let Some(bound) = &mut self.bound {
            bound.listen();
            self.popup.relisten(bound.handle.as_mut());
        }
        self.sync_placement(state);
    }

    /// The element was disconnected: sever listeners and take the marker off
    /// its map. The handle is kept so reconnecting is cheap.
    pub fn disconnect(&mut self) {
        self.connected = false;
        if let Some(bound) = &mut self.bound {
            bound.unlisten();
            self.popup.sever(bound.handle.as_mut());
            bound.place(None);
            tracing::debug!("marker detached");
        }
    }

    fn sync_placement(&mut self, state: &MarkerState) {
        if !self.connected {
            return;
        }
        let Some(map) = &self.map else {
            return;
        };
        if let Some(bound) = &mut self.bound {
            bound.place(Some(map.token));
            return;
        }
        let mut bound = BoundMarker {
            handle: map.api.create_marker(&marker_options(state)),
            placed_on: None,
            listeners: Vec::new(),
        };
        bound.listen();
        bound.place(Some(map.token));
        tracing::debug!(token = ?bound.handle.token(), "marker bound");
        self.bound = Some(bound);
        self.sync_popup(state, true);
    }

    /// Bring the popup in line with `state.info`; a popup created while
    /// `state.open` is set is shown right away when `show_new` allows it.
    fn sync_popup(&mut self, state: &MarkerState, show_new: bool) {
        let (Some(bound), Some(map)) = (&mut self.bound, &self.map) else {
            return;
        };
        let existed = self.popup.exists();
        self.popup.sync_content(
            state.info_content(),
            &*map.api,
            bound.handle.as_mut(),
            self.connected,
        );
        if show_new && !existed && self.popup.exists() && state.open {
            if let Some(placed) = bound.placed_on {
                self.popup.show(placed, bound.handle.token());
            }
        }
    }

    // ── Outbound ─────────────────────────────────────────────────────

    /// Apply one update cycle's changes and emit the marker's notifications.
    pub fn apply(
        &mut self,
        state: &MarkerState,
        changes: &ChangeSet<MarkerProperty>,
        emitter: &mut ChangeEventEmitter,
    ) {
        let position_keys: Vec<MarkerProperty> = changes
            .declarative_keys()
            .filter(|k| matches!(k, MarkerProperty::Latitude | MarkerProperty::Longitude))
            .collect();
        if !position_keys.is_empty() {
            if let Some(bound) = &mut self.bound {
                if self.gate.admit(position_keys).is_some() {
                    bound.handle.set_position(state.position());
                } else {
                    tracing::trace!("marker mid-drag, position write dropped");
                }
            }
        }
        if changes.has(MarkerProperty::Latitude) {
            emitter.emit("latitude", MarkerValue::Latitude(state.latitude()).to_json());
        }
        if changes.has(MarkerProperty::Longitude) {
            emitter.emit("longitude", MarkerValue::Longitude(state.longitude()).to_json());
        }

        if let Some(bound) = &mut self.bound {
            if changes.has(MarkerProperty::Title) {
                bound.handle.set_title(&state.title);
            }
            if changes.has(MarkerProperty::Label) {
                bound.handle.set_label(state.label.as_deref());
            }
        }
        if changes.has(MarkerProperty::Info) {
            self.sync_popup(state, !changes.has(MarkerProperty::Open));
        }
        if let Some(bound) = &mut self.bound {
            if changes.has(MarkerProperty::Draggable) {
                bound.handle.set_draggable(state.draggable);
            }
        }
        if changes.has(MarkerProperty::Open) {
            self.apply_open(state, emitter);
        }
        if let Some(bound) = &mut self.bound {
            if changes.has(MarkerProperty::Hidden) {
                bound.handle.set_visible(!state.hidden);
            }
        }
    }

    fn apply_open(&mut self, state: &MarkerState, emitter: &mut ChangeEventEmitter) {
        let Some(bound) = &self.bound else {
            return;
        };
        if !self.popup.exists() {
            return;
        }
        if state.open {
            if let Some(map) = bound.placed_on {
                self.popup.show(map, bound.handle.token());
            }
        } else {
            self.popup.hide();
        }
        emitter.emit("open", MarkerValue::Open(state.open).to_json());
    }

    // ── Inbound ──────────────────────────────────────────────────────

    /// Handle one event from the marker or its popup.
    pub fn dispatch(
        &mut self,
        event: MarkerInbound,
        state: &mut MarkerState,
        pending: &mut PendingChanges<MarkerProperty>,
    ) {
        if !self.connected {
            tracing::trace!(?event, "event for detached marker ignored");
            return;
        }
        let Some(bound) = &mut self.bound else {
            tracing::trace!(?event, "event for unbound marker ignored");
            return;
        };

        match event {
            MarkerInbound::Marker(MarkerEvent::Click) => {
                if self.popup.listens_to_click() {
                    request(state, pending, MarkerValue::Open(true));
                }
            }
            MarkerInbound::InfoWindow(InfoWindowEvent::CloseClick) => {
                if self.popup.listens_to_close() {
                    request(state, pending, MarkerValue::Open(false));
                }
            }
            MarkerInbound::Marker(event) if !bound.listens(event) => {
                tracing::trace!(event = event.name(), "event without listener ignored");
            }
            MarkerInbound::Marker(MarkerEvent::DragStart) => self.gate.on_drag_start(),
            MarkerInbound::Marker(MarkerEvent::Idle) => {
                if !self.gate.on_idle().is_empty() {
                    bound.handle.set_position(state.position());
                }
            }
            MarkerInbound::Marker(MarkerEvent::PositionChanged) => {
                let position = bound.handle.position();
                absorb(state, pending, MarkerValue::Latitude(position.lat()));
                absorb(state, pending, MarkerValue::Longitude(position.lng()));
            }
        }
    }
}

impl Default for MarkerSyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkerSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerSyncController")
            .field("phase", &self.phase())
            .field("connected", &self.connected)
            .field("placed_on", &self.placed_on())
            .field("popup", &self.popup)
            .finish()
    }
}

/// A user action on the widget that the element must carry out.
fn request(
    state: &mut MarkerState,
    pending: &mut PendingChanges<MarkerProperty>,
    value: MarkerValue,
) {
    let property = value.property();
    if let Ok(true) = state.set(value) {
        pending.record(property, Origin::Declarative);
    }
}

/// A value read back from the widget, which already shows it.
fn absorb(
    state: &mut MarkerState,
    pending: &mut PendingChanges<MarkerProperty>,
    value: MarkerValue,
) {
    let property = value.property();
    match state.set(value) {
        Ok(true) => pending.record(property, Origin::Absorbed),
        Ok(false) => {}
        Err(error) => tracing::warn!(%error, "ignoring position reported by marker"),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
