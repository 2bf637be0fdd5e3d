//! Map state: the declarative mirror of the external map's configurable surface.
//!
//! [`MapState`] holds one field per map attribute. Writes go through
//! [`MapState::set`] with a typed [`MapValue`]; the return value tells the
//! caller whether anything changed, so unchanged writes never enter a batch.

use serde_json::{json, Value};

use crate::config::MapConfig;
use crate::error::PropertyError;
use crate::geometry::{validate_latitude, validate_longitude, LatLng};

// ---------------------------------------------------------------------------
// MapProperty
// ---------------------------------------------------------------------------

/// Every attribute of the map element, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapProperty {
    ApiKey,
    Zoom,
    MinZoom,
    MaxZoom,
    Latitude,
    Longitude,
    Heading,
    Tilt,
    DisableDefaultUi,
    ZoomControl,
    MapTypeId,
    MapTypeControl,
    ScaleControl,
    StreetViewControl,
    RotateControl,
    FullscreenControl,
    GestureHandling,
    Styles,
}

impl MapProperty {
    /// All properties, in declaration order.
    pub const ALL: [MapProperty; 18] = [
        MapProperty::ApiKey,
        MapProperty::Zoom,
        MapProperty::MinZoom,
        MapProperty::MaxZoom,
        MapProperty::Latitude,
        MapProperty::Longitude,
        MapProperty::Heading,
        MapProperty::Tilt,
        MapProperty::DisableDefaultUi,
        MapProperty::ZoomControl,
        MapProperty::MapTypeId,
        MapProperty::MapTypeControl,
        MapProperty::ScaleControl,
        MapProperty::StreetViewControl,
        MapProperty::RotateControl,
        MapProperty::FullscreenControl,
        MapProperty::GestureHandling,
        MapProperty::Styles,
    ];

    /// The camelCase property name.
    pub fn name(self) -> &'static str {
        match self {
            MapProperty::ApiKey => "apiKey",
            MapProperty::Zoom => "zoom",
            MapProperty::MinZoom => "minZoom",
            MapProperty::MaxZoom => "maxZoom",
            MapProperty::Latitude => "latitude",
            MapProperty::Longitude => "longitude",
            MapProperty::Heading => "heading",
            MapProperty::Tilt => "tilt",
            MapProperty::DisableDefaultUi => "disableDefaultUI",
            MapProperty::ZoomControl => "zoomControl",
            MapProperty::MapTypeId => "mapTypeId",
            MapProperty::MapTypeControl => "mapTypeControl",
            MapProperty::ScaleControl => "scaleControl",
            MapProperty::StreetViewControl => "streetViewControl",
            MapProperty::RotateControl => "rotateControl",
            MapProperty::FullscreenControl => "fullscreenControl",
            MapProperty::GestureHandling => "gestureHandling",
            MapProperty::Styles => "styles",
        }
    }
}

// ---------------------------------------------------------------------------
// MapValue
// ---------------------------------------------------------------------------

/// A typed value for one map property.
#[derive(Debug, Clone, PartialEq)]
pub enum MapValue {
    ApiKey(Option<String>),
    Zoom(f64),
    MinZoom(Option<f64>),
    MaxZoom(Option<f64>),
    Latitude(f64),
    Longitude(f64),
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

impl MapValue {
    /// The property this value belongs to.
    pub fn property(&self) -> MapProperty {
        match self {
            MapValue::ApiKey(_) => MapProperty::ApiKey,
            MapValue::Zoom(_) => MapProperty::Zoom,
            MapValue::MinZoom(_) => MapProperty::MinZoom,
            MapValue::MaxZoom(_) => MapProperty::MaxZoom,
            MapValue::Latitude(_) => MapProperty::Latitude,
            MapValue::Longitude(_) => MapProperty::Longitude,
            MapValue::Heading(_) => MapProperty::Heading,
            MapValue::Tilt(_) => MapProperty::Tilt,
            MapValue::DisableDefaultUi(_) => MapProperty::DisableDefaultUi,
            MapValue::ZoomControl(_) => MapProperty::ZoomControl,
            MapValue::MapTypeId(_) => MapProperty::MapTypeId,
            MapValue::MapTypeControl(_) => MapProperty::MapTypeControl,
            MapValue::ScaleControl(_) => MapProperty::ScaleControl,
            MapValue::StreetViewControl(_) => MapProperty::StreetViewControl,
            MapValue::RotateControl(_) => MapProperty::RotateControl,
            MapValue::FullscreenControl(_) => MapProperty::FullscreenControl,
            MapValue::GestureHandling(_) => MapProperty::GestureHandling,
            MapValue::Styles(_) => MapProperty::Styles,
        }
    }

    /// JSON form used in change notification payloads.
    pub fn to_json(&self) -> Value {
        match self {
            MapValue::ApiKey(v) => json!(v),
            MapValue::MinZoom(v) | MapValue::MaxZoom(v) => json!(v),
            MapValue::Zoom(v)
            | MapValue::Latitude(v)
            | MapValue::Longitude(v)
            | MapValue::Heading(v)
            | MapValue::Tilt(v) => json!(v),
            MapValue::DisableDefaultUi(v) => json!(v),
            MapValue::ZoomControl(v)
            | MapValue::MapTypeControl(v)
            | MapValue::ScaleControl(v)
            | MapValue::StreetViewControl(v)
            | MapValue::RotateControl(v)
            | MapValue::FullscreenControl(v) => json!(v),
            MapValue::MapTypeId(v) | MapValue::GestureHandling(v) => json!(v),
            MapValue::Styles(v) => Value::Array(v.clone()),
        }
    }
}

fn finite(property: &'static str, value: f64) -> Result<f64, PropertyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PropertyError::NotFinite { property, value })
    }
}

fn finite_opt(property: &'static str, value: Option<f64>) -> Result<Option<f64>, PropertyError> {
    value.map(|v| finite(property, v)).transpose()
}

/// Assign `value` to `slot`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

// ---------------------------------------------------------------------------
// UiOptions
// ---------------------------------------------------------------------------

/// Control visibility and gesture settings. `None` means "library default".
#[derive(Debug, Clone, PartialEq)]
pub struct UiOptions {
    pub disable_default_ui: bool,
    pub zoom_control: Option<bool>,
    pub map_type_control: Option<bool>,
    pub scale_control: Option<bool>,
    pub street_view_control: Option<bool>,
    pub rotate_control: Option<bool>,
    pub fullscreen_control: Option<bool>,
    pub gesture_handling: String,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            disable_default_ui: false,
            zoom_control: None,
            map_type_control: None,
            scale_control: None,
            street_view_control: None,
            rotate_control: None,
            fullscreen_control: None,
            gesture_handling: "auto".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// MapState
// ---------------------------------------------------------------------------

/// The declarative map state owned by a map element.
///
/// Latitude and longitude are stored separately (they are separate
/// attributes) but are only ever accepted as valid coordinates, so
/// [`center`](Self::center) never yields NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub api_key: Option<String>,
    latitude: f64,
    longitude: f64,
    pub zoom: f64,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub heading: f64,
    pub tilt: f64,
    pub ui: UiOptions,
    pub map_type_id: String,
    pub styles: Vec<Value>,
}

impl MapState {
    /// Build the initial state from a config, validating every value.
    pub fn from_config(config: &MapConfig) -> Result<Self, PropertyError> {
        Ok(Self {
            api_key: config.api_key.clone(),
            latitude: validate_latitude(config.latitude)?,
            longitude: validate_longitude(config.longitude)?,
            zoom: finite("zoom", config.zoom)?,
            min_zoom: finite_opt("minZoom", config.min_zoom)?,
            max_zoom: finite_opt("maxZoom", config.max_zoom)?,
            heading: finite("heading", config.heading)?,
            tilt: finite("tilt", config.tilt)?,
            ui: UiOptions {
                disable_default_ui: config.disable_default_ui,
                zoom_control: config.zoom_control,
                map_type_control: config.map_type_control,
                scale_control: config.scale_control,
                street_view_control: config.street_view_control,
                rotate_control: config.rotate_control,
                fullscreen_control: config.fullscreen_control,
                gesture_handling: config.gesture_handling.clone(),
            },
            map_type_id: config.map_type_id.clone(),
            styles: config.styles.clone(),
        })
    }

    /// Latest accepted latitude.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Latest accepted longitude.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// The center derived from the latest accepted (latitude, longitude) pair.
    pub fn center(&self) -> LatLng {
        // Both halves were validated on the way in.
        LatLng::new(self.latitude, self.longitude).unwrap_or_default()
    }

    /// Write one property. Returns `Ok(true)` if the stored value changed.
    ///
    /// Invalid values are rejected and the previous value is kept.
    pub fn set(&mut self, value: MapValue) -> Result<bool, PropertyError> {
        let changed = match value {
            MapValue::ApiKey(v) => replace(&mut self.api_key, v),
            MapValue::Zoom(v) => replace(&mut self.zoom, finite("zoom", v)?),
            MapValue::MinZoom(v) => replace(&mut self.min_zoom, finite_opt("minZoom", v)?),
            MapValue::MaxZoom(v) => replace(&mut self.max_zoom, finite_opt("maxZoom", v)?),
            MapValue::Latitude(v) => replace(&mut self.latitude, validate_latitude(v)?),
            MapValue::Longitude(v) => replace(&mut self.longitude, validate_longitude(v)?),
            MapValue::Heading(v) => replace(&mut self.heading, finite("heading", v)?),
            MapValue::Tilt(v) => replace(&mut self.tilt, finite("tilt", v)?),
            MapValue::DisableDefaultUi(v) => replace(&mut self.ui.disable_default_ui, v),
            MapValue::ZoomControl(v) => replace(&mut self.ui.zoom_control, v),
            MapValue::MapTypeId(v) => replace(&mut self.map_type_id, v),
            MapValue::MapTypeControl(v) => replace(&mut self.ui.map_type_control, v),
            MapValue::ScaleControl(v) => replace(&mut self.ui.scale_control, v),
            MapValue::StreetViewControl(v) => replace(&mut self.ui.street_view_control, v),
            MapValue::RotateControl(v) => replace(&mut self.ui.rotate_control, v),
            MapValue::FullscreenControl(v) => replace(&mut self.ui.fullscreen_control, v),
            MapValue::GestureHandling(v) => replace(&mut self.ui.gesture_handling, v),
            MapValue::Styles(v) => replace(&mut self.styles, v),
        };
        Ok(changed)
    }

    /// Read one property.
    pub fn get(&self, property: MapProperty) -> MapValue {
        match property {
            MapProperty::ApiKey => MapValue::ApiKey(self.api_key.clone()),
            MapProperty::Zoom => MapValue::Zoom(self.zoom),
            MapProperty::MinZoom => MapValue::MinZoom(self.min_zoom),
            MapProperty::MaxZoom => MapValue::MaxZoom(self.max_zoom),
            MapProperty::Latitude => MapValue::Latitude(self.latitude),
            MapProperty::Longitude => MapValue::Longitude(self.longitude),
            MapProperty::Heading => MapValue::Heading(self.heading),
            MapProperty::Tilt => MapValue::Tilt(self.tilt),
            MapProperty::DisableDefaultUi => MapValue::DisableDefaultUi(self.ui.disable_default_ui),
            MapProperty::ZoomControl => MapValue::ZoomControl(self.ui.zoom_control),
            MapProperty::MapTypeId => MapValue::MapTypeId(self.map_type_id.clone()),
            MapProperty::MapTypeControl => MapValue::MapTypeControl(self.ui.map_type_control),
            MapProperty::ScaleControl => MapValue::ScaleControl(self.ui.scale_control),
            MapProperty::StreetViewControl => {
                MapValue::StreetViewControl(self.ui.street_view_control)
            }
            MapProperty::RotateControl => MapValue::RotateControl(self.ui.rotate_control),
            MapProperty::FullscreenControl => {
                MapValue::FullscreenControl(self.ui.fullscreen_control)
            }
            MapProperty::GestureHandling => MapValue::GestureHandling(self.ui.gesture_handling.clone()),
            MapProperty::Styles => MapValue::Styles(self.styles.clone()),
        }
    }
}

impl Default for MapState {
    fn default() -> Self {
        let config = MapConfig::default();
        Self {
            api_key: None,
            latitude: config.latitude,
            longitude: config.longitude,
            zoom: config.zoom,
            min_zoom: None,
            max_zoom: None,
            heading: 0.0,
            tilt: 0.0,
            ui: UiOptions::default(),
            map_type_id: config.map_type_id,
            styles: Vec::new(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
