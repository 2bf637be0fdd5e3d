//! Marker state: one per child marker element.

use serde_json::{json, Value};

use crate::config::MarkerConfig;
use crate::error::PropertyError;
use crate::geometry::{validate_latitude, validate_longitude, LatLng};

/// Every attribute of the marker element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerProperty {
    Latitude,
    Longitude,
    Title,
    Label,
    Info,
    Draggable,
    Open,
    Hidden,
}

impl MarkerProperty {
    /// The camelCase property name.
    pub fn name(self) -> &'static str {
        match self {
            MarkerProperty::Latitude => "latitude",
            MarkerProperty::Longitude => "longitude",
            MarkerProperty::Title => "title",
            MarkerProperty::Label => "label",
            MarkerProperty::Info => "info",
            MarkerProperty::Draggable => "draggable",
            MarkerProperty::Open => "open",
            MarkerProperty::Hidden => "hidden",
        }
    }
}

/// A typed value for one marker property.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerValue {
    Latitude(f64),
    Longitude(f64),
    Title(String),
    Label(Option<String>),
    Info(Option<String>),
    Draggable(bool),
    Open(bool),
    Hidden(bool),
}

impl MarkerValue {
    /// The property this value belongs to.
    pub fn property(&self) -> MarkerProperty {
        match self {
            MarkerValue::Latitude(_) => MarkerProperty::Latitude,
            MarkerValue::Longitude(_) => MarkerProperty::Longitude,
            MarkerValue::Title(_) => MarkerProperty::Title,
            MarkerValue::Label(_) => MarkerProperty::Label,
            MarkerValue::Info(_) => MarkerProperty::Info,
            MarkerValue::Draggable(_) => MarkerProperty::Draggable,
            MarkerValue::Open(_) => MarkerProperty::Open,
            MarkerValue::Hidden(_) => MarkerProperty::Hidden,
        }
    }

    /// JSON form used in change notification payloads.
    pub fn to_json(&self) -> Value {
        match self {
            MarkerValue::Latitude(v) | MarkerValue::Longitude(v) => json!(v),
            MarkerValue::Title(v) => json!(v),
            MarkerValue::Label(v) | MarkerValue::Info(v) => json!(v),
            MarkerValue::Draggable(v) | MarkerValue::Open(v) | MarkerValue::Hidden(v) => json!(v),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// The declarative state of one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub title: String,
    pub label: Option<String>,
    /// HTML content of the info popup. Empty and `None` both mean "no popup".
    pub info: Option<String>,
    latitude: f64,
    longitude: f64,
    pub draggable: bool,
    pub hidden: bool,
    /// Info popup visibility.
    pub open: bool,
}

impl MarkerState {
    /// Build the initial state from a config.
    pub fn from_config(config: &MarkerConfig) -> Result<Self, PropertyError> {
        Ok(Self {
            title: config.title.clone(),
            label: config.label.clone(),
            info: config.info.clone(),
            latitude: validate_latitude(config.latitude)?,
            longitude: validate_longitude(config.longitude)?,
            draggable: config.draggable,
            hidden: config.hidden,
            open: config.open,
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

    /// The marker position derived from the latest accepted pair.
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude).unwrap_or_default()
    }

    /// The popup content, if there is any to show.
    pub fn info_content(&self) -> Option<&str> {
        self.info.as_deref().filter(|html| !html.is_empty())
    }

    /// Write one property. Returns `Ok(true)` if the stored value changed.
    pub fn set(&mut self, value: MarkerValue) -> Result<bool, PropertyError> {
        let changed = match value {
            MarkerValue::Latitude(v) => replace(&mut self.latitude, validate_latitude(v)?),
            MarkerValue::Longitude(v) => replace(&mut self.longitude, validate_longitude(v)?),
            MarkerValue::Title(v) => replace(&mut self.title, v),
            MarkerValue::Label(v) => replace(&mut self.label, v),
            MarkerValue::Info(v) => replace(&mut self.info, v),
            MarkerValue::Draggable(v) => replace(&mut self.draggable, v),
            MarkerValue::Open(v) => replace(&mut self.open, v),
            MarkerValue::Hidden(v) => replace(&mut self.hidden, v),
        };
        Ok(changed)
    }

    /// Read one property.
    pub fn get(&self, property: MarkerProperty) -> MarkerValue {
        match property {
            MarkerProperty::Latitude => MarkerValue::Latitude(self.latitude),
            MarkerProperty::Longitude => MarkerValue::Longitude(self.longitude),
            MarkerProperty::Title => MarkerValue::Title(self.title.clone()),
            MarkerProperty::Label => MarkerValue::Label(self.label.clone()),
            MarkerProperty::Info => MarkerValue::Info(self.info.clone()),
            MarkerProperty::Draggable => MarkerValue::Draggable(self.draggable),
            MarkerProperty::Open => MarkerValue::Open(self.open),
            MarkerProperty::Hidden => MarkerValue::Hidden(self.hidden),
        }
    }
}

impl Default for MarkerState {
    fn default() -> Self {
        let config = MarkerConfig::default();
        Self {
            title: config.title,
            label: None,
            info: None,
            latitude: config.latitude,
            longitude: config.longitude,
            draggable: false,
            hidden: false,
            open: false,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
