//! Inbound widget events as typed records.
//!
//! The external widget notifies by event name. Instead of registering
//! closures that capture the component, the host turns each notification into
//! one of these records and hands it to the owning element's dispatch method.

/// Events fired by the external map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEvent {
    Idle,
    CenterChanged,
    ZoomChanged,
    BoundsChanged,
    DragStart,
    MapTypeIdChanged,
}

impl MapEvent {
    /// Every map event the controller subscribes to, in subscription order.
    pub const ALL: [MapEvent; 6] = [
        MapEvent::Idle,
        MapEvent::CenterChanged,
        MapEvent::ZoomChanged,
        MapEvent::BoundsChanged,
        MapEvent::DragStart,
        MapEvent::MapTypeIdChanged,
    ];

    /// The library's event name.
    /// Event name as registered with the widget.
    pub fn name(self) -> &'static str {
        match self {
            MapEvent::Idle => "idle",
            MapEvent::CenterChanged => "center_changed",
            MapEvent::ZoomChanged => "zoom_changed",
            MapEvent::BoundsChanged => "bounds_changed",
            MapEvent::DragStart => "dragstart",
            MapEvent::MapTypeIdChanged => "maptypeid_changed",
        }
    }
}

/// Events fired by an external marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerEvent {
    DragStart,
    Idle,
    PositionChanged,
    /// Only subscribed while the marker has an info popup.
    Click,
}

impl MarkerEvent {
    /// The events a bound marker always listens to.
    pub const CORE: [MarkerEvent; 3] = [
        MarkerEvent::DragStart,
        MarkerEvent::Idle,
        MarkerEvent::PositionChanged,
    ];

    /// Event name as registered with the widget.
    pub fn name(self) -> &'static str {
        match self {
            MarkerEvent::DragStart => "dragstart",
            MarkerEvent::Idle => "idle",
            MarkerEvent::PositionChanged => "position_changed",
            MarkerEvent::Click => "click",
        }
    }
}

/// Events fired by an external info popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoWindowEvent {
    CloseClick,
}

impl InfoWindowEvent {
    /// Event name as registered with the widget.
    pub fn name(self) -> &'static str {
        match self {
            InfoWindowEvent::CloseClick => "closeclick",
        }
    }
}

/// Anything a marker element can receive: events from its marker or from its
/// info popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerInbound {
    Marker(MarkerEvent),
    InfoWindow(InfoWindowEvent),
}

impl From<MarkerEvent> for MarkerInbound {
    fn from(event: MarkerEvent) -> Self {
        MarkerInbound::Marker(event)
    }
}

impl From<InfoWindowEvent> for MarkerInbound {
    fn from(event: InfoWindowEvent) -> Self {
        MarkerInbound::InfoWindow(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_event_names() {
        let names: Vec<_> = MapEvent::ALL.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "idle",
                "center_changed",
                "zoom_changed",
                "bounds_changed",
                "dragstart",
                "maptypeid_changed"
            ]
        );
        assert_eq!(MarkerEvent::PositionChanged.name(), "position_changed");
        assert_eq!(InfoWindowEvent::CloseClick.name(), "closeclick");
    }

    #[test]
    fn inbound_from_impls() {
        assert_eq!(
            MarkerInbound::from(MarkerEvent::Click),
            MarkerInbound::Marker(MarkerEvent::Click)
        );
        assert_eq!(
            MarkerInbound::from(InfoWindowEvent::CloseClick),
            MarkerInbound::InfoWindow(InfoWindowEvent::CloseClick)
        );
    }
}
