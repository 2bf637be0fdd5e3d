//! OptionsDiffBuilder: minimal `setOptions` patches from a change batch.
//!
//! A [`MapOptions`] is an ordered set of [`MapOption`]s, at most one per
//! option key. The builder reads every value from the current [`MapState`];
//! it never computes deltas. `latitude` and `longitude` always fold into a
//! single `center` entry, and properties with no widget setter (`apiKey`) are
//! dropped.

use serde_json::{Map, Value};

use crate::geometry::LatLng;
use crate::state::map::{MapProperty, MapState, MapValue};

// ---------------------------------------------------------------------------
// MapOption
// ---------------------------------------------------------------------------

/// One entry of a map options object.
#[derive(Debug, Clone, PartialEq)]
pub enum MapOption {
    Center(LatLng),
    Zoom(f64),
    MinZoom(Option<f64>),
    MaxZoom(Option<f64>),
    Heading(f64),
    Tilt(f64),
    DisableDefaultUi(bool),
    ZoomControl(Option<bool>),
    MapTypeId(String),
    MapTypeControl(Option<bool>),
    ScaleControl(Option<bool>),
    StreetViewControl(Option<bool>),
    RotateControl(Option<bool>),
    FullscreenControl(Option<bool>),
    GestureHandling(String),
    Styles(Vec<Value>),
}

impl MapOption {
    /// The widget's option key.
    pub fn key(&self) -> &'static str {
        match self {
            MapOption::Center(_) => "center",
            MapOption::Zoom(_) => "zoom",
            MapOption::MinZoom(_) => "minZoom",
            MapOption::MaxZoom(_) => "maxZoom",
            MapOption::Heading(_) => "heading",
            MapOption::Tilt(_) => "tilt",
            MapOption::DisableDefaultUi(_) => "disableDefaultUI",
            MapOption::ZoomControl(_) => "zoomControl",
            MapOption::MapTypeId(_) => "mapTypeId",
            MapOption::MapTypeControl(_) => "mapTypeControl",
            MapOption::ScaleControl(_) => "scaleControl",
            MapOption::StreetViewControl(_) => "streetViewControl",
            MapOption::RotateControl(_) => "rotateControl",
            MapOption::FullscreenControl(_) => "fullscreenControl",
            MapOption::GestureHandling(_) => "gestureHandling",
            MapOption::Styles(_) => "styles",
        }
    }

    /// JSON value of this option.
    pub fn to_json(&self) -> Value {
        match self {
            MapOption::Center(c) => c.to_json(),
            MapOption::Zoom(v) | MapOption::Heading(v) | MapOption::Tilt(v) => Value::from(*v),
            MapOption::MinZoom(v) | MapOption::MaxZoom(v) => v.map_or(Value::Null, Value::from),
            MapOption::DisableDefaultUi(v) => Value::Bool(*v),
            MapOption::ZoomControl(v)
            | MapOption::MapTypeControl(v)
            | MapOption::ScaleControl(v)
            | MapOption::StreetViewControl(v)
            | MapOption::RotateControl(v)
            | MapOption::FullscreenControl(v) => v.map_or(Value::Null, Value::Bool),
            MapOption::MapTypeId(v) | MapOption::GestureHandling(v) => Value::String(v.clone()),
            MapOption::Styles(v) => Value::Array(v.clone()),
        }
    }

    /// Translate a property value that maps 1:1 onto an option.
    ///
    /// Returns `None` for `apiKey` (no setter) and for the coordinate halves,
    /// which only travel as [`MapOption::Center`].
    fn from_value(value: MapValue) -> Option<MapOption> {
        Some(match value {
            MapValue::ApiKey(_) | MapValue::Latitude(_) | MapValue::Longitude(_) => return None,
            MapValue::Zoom(v) => MapOption::Zoom(v),
            MapValue::MinZoom(v) => MapOption::MinZoom(v),
            MapValue::MaxZoom(v) => MapOption::MaxZoom(v),
            MapValue::Heading(v) => MapOption::Heading(v),
            MapValue::Tilt(v) => MapOption::Tilt(v),
            MapValue::DisableDefaultUi(v) => MapOption::DisableDefaultUi(v),
            MapValue::ZoomControl(v) => MapOption::ZoomControl(v),
            MapValue::MapTypeId(v) => MapOption::MapTypeId(v),
            MapValue::MapTypeControl(v) => MapOption::MapTypeControl(v),
            MapValue::ScaleControl(v) => MapOption::ScaleControl(v),
            MapValue::StreetViewControl(v) => MapOption::StreetViewControl(v),
            MapValue::RotateControl(v) => MapOption::RotateControl(v),
            MapValue::FullscreenControl(v) => MapOption::FullscreenControl(v),
            MapValue::GestureHandling(v) => MapOption::GestureHandling(v),
            MapValue::Styles(v) => MapOption::Styles(v),
        })
    }
}

// ---------------------------------------------------------------------------
// MapOptions
// ---------------------------------------------------------------------------

/// An options object: the full construction options or a partial patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapOptions {
    entries: Vec<MapOption>,
}

impl MapOptions {
    /// Create an empty options object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any earlier entry with the same key.
    pub fn insert(&mut self, option: MapOption) {
        match self.entries.iter_mut().find(|e| e.key() == option.key()) {
            Some(slot) => *slot = option,
            None => self.entries.push(option),
        }
    }

    /// Look up an entry by option key.
    pub fn get(&self, key: &str) -> Option<&MapOption> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Whether an entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The `center` entry, if present.
    pub fn center(&self) -> Option<LatLng> {
        match self.get("center") {
            Some(MapOption::Center(c)) => Some(*c),
            _ => None,
        }
    }

    /// The `zoom` entry, if present.
    pub fn zoom(&self) -> Option<f64> {
        match self.get("zoom") {
            Some(MapOption::Zoom(z)) => Some(*z),
            _ => None,
        }
    }

    /// Option keys in insertion order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(MapOption::key).collect()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MapOption> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the patch has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object form, as passed to the widget.
    /// JSON value of this option.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.key().to_owned(), e.to_json()))
            .collect();
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// OptionsDiffBuilder
// ---------------------------------------------------------------------------

/// Builds construction options and per-cycle patches from a [`MapState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsDiffBuilder;

impl OptionsDiffBuilder {
    /// Full options for constructing the widget.
    pub fn full(state: &MapState) -> MapOptions {
        let mut options = MapOptions::new();
        options.insert(MapOption::Center(state.center()));
        for property in MapProperty::ALL {
            if let Some(option) = MapOption::from_value(state.get(property)) {
                options.insert(option);
            }
        }
        options
    }

    /// Patch covering exactly the options touched by `changed`.
    pub fn build(changed: impl IntoIterator<Item = MapProperty>, state: &MapState) -> MapOptions {
        let mut options = MapOptions::new();
        for property in changed {
            match property {
                MapProperty::Latitude | MapProperty::Longitude => {
                    options.insert(MapOption::Center(state.center()));
                }
                other => {
                    if let Some(option) = MapOption::from_value(state.get(other)) {
                        options.insert(option);
                    }
                }
            }
        }
        options
    }
}

// ===========================================================================
// Tests
// ===========================================================================
