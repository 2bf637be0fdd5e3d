//! MarkerElement: a child marker component.
//!
//! Owns a [`MarkerState`], the batch of pending changes, and a
//! [`MarkerSyncController`]. Its lifecycle is independent of the map: it is
//! bound to the map's external instance only through the [`MapBinding`] the
//! parent hands it.

use crate::capability::api::{MapBinding, MapToken, MarkerHandle, MarkerToken};
use crate::config::MarkerConfig;
use crate::error::PropertyError;
use crate::event::change::ChangeEvent;
use crate::event::emitter::ChangeEventEmitter;
use crate::event::external::MarkerInbound;
use crate::geometry::LatLng;
use crate::state::marker::{MarkerProperty, MarkerState, MarkerValue};
use crate::state::pending::{Origin, PendingChanges};
use crate::sync::marker::{MarkerPhase, MarkerSyncController};
use crate::sync::popup::PopupPhase;

/// A marker component.
#[derive(Debug)]
pub struct MarkerElement {
    state: MarkerState,
    pending: PendingChanges<MarkerProperty>,
    controller: MarkerSyncController,
    emitter: ChangeEventEmitter,
}

impl MarkerElement {
    /// Create a detached marker with the given initial values.
    pub fn new(config: MarkerConfig) -> Result<Self, PropertyError> {
        Ok(Self::from_state(MarkerState::from_config(&config)?))
    }

    fn from_state(state: MarkerState) -> Self {
        Self {
            state,
            pending: PendingChanges::new(),
            controller: MarkerSyncController::new(),
            emitter: ChangeEventEmitter::new(),
        }
    }

    /// Current property values.
    pub fn state(&self) -> &MarkerState {
        &self.state
    }

    /// Whether the external marker has been constructed.
    pub fn phase(&self) -> MarkerPhase {
        self.controller.phase()
    }

    /// Phase of the info popup.
    pub fn popup_phase(&self) -> PopupPhase {
        self.controller.popup_phase()
    }

    /// Whether the element is attached.
    pub fn is_connected(&self) -> bool {
        self.controller.is_connected()
    }

    /// The map the external marker is placed on, if any.
    pub fn placed_on(&self) -> Option<MapToken> {
        self.controller.placed_on()
    }

    /// Identity of the external marker, once bound.
    pub fn handle_token(&self) -> Option<MarkerToken> {
        self.controller.handle().map(|h| h.token())
    }

    /// Whether the marker accepts position writes (not mid-drag).
    pub fn is_idle(&self) -> bool {
        self.controller.can_apply()
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Write a property. The change reaches the marker on the next
    /// [`update`](Self::update).
    pub fn set(&mut self, value: MarkerValue) -> Result<(), PropertyError> {
        let property = value.property();
        if self.state.set(value)? {
            self.pending.record(property, Origin::Declarative);
        }
        Ok(())
    }

    /// Move the marker. Both coordinates are validated before either is
    /// written.
    pub fn set_position(&mut self, latitude: f64, longitude: f64) -> Result<(), PropertyError> {
        let position = LatLng::new(latitude, longitude)?;
        self.set(MarkerValue::Latitude(position.lat()))?;
        self.set(MarkerValue::Longitude(position.lng()))
    }

    /// Set the hover title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_infallible(MarkerValue::Title(title.into()));
    }

    /// Set or clear the marker label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.set_infallible(MarkerValue::Label(label));
    }

    /// Set the popup HTML. `None` or an empty string removes the popup.
    pub fn set_info(&mut self, html: Option<String>) {
        self.set_infallible(MarkerValue::Info(html));
    }

    /// Allow or forbid dragging the marker.
    pub fn set_draggable(&mut self, draggable: bool) {
        self.set_infallible(MarkerValue::Draggable(draggable));
    }

    /// Show or hide the info popup. Has no effect without `info`.
    pub fn set_open(&mut self, open: bool) {
        self.set_infallible(MarkerValue::Open(open));
    }

    /// Hide the marker without taking it off the map.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.set_infallible(MarkerValue::Hidden(hidden));
    }

    fn set_infallible(&mut self, value: MarkerValue) {
        let property = value.property();
        if let Ok(true) = self.state.set(value) {
            self.pending.record(property, Origin::Declarative);
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// The element was attached: listen again and return to the map.
    pub fn connected(&mut self) {
        self.controller.connect(&self.state);
    }

    /// The element was detached: sever listeners and leave the map.
    pub fn disconnected(&mut self) {
        self.controller.disconnect();
    }

    /// Receive the parent's live map, or `None` when removed from it.
    pub fn set_map(&mut self, map: Option<MapBinding>) {
        self.controller.set_map(map, &self.state);
    }

    /// Whether property writes are waiting for the next cycle.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run one update cycle. Returns `false` if there was nothing to do.
    pub fn update(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let batch = self.pending.take();
        self.controller.apply(&self.state, &batch, &mut self.emitter);
        true
    }

    /// Deliver an event from the external marker or its popup.
    pub fn dispatch(&mut self, event: impl Into<MarkerInbound>) {
        self.controller
            .dispatch(event.into(), &mut self.state, &mut self.pending);
    }

    /// Drain outbound change notifications.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        self.emitter.drain()
    }
}

impl Default for MarkerElement {
    fn default() -> Self {
        Self::from_state(MarkerState::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
