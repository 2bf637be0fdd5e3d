//! Initial property values for map and marker elements.
//!
//! [`MapConfig`] and [`MarkerConfig`] carry the values an element starts with.
//! They can be built in code with the `with_*` builder methods or deserialized
//! from JSON using the same camelCase keys as the element attributes.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::geometry::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

// ---------------------------------------------------------------------------
// MapConfig
// ---------------------------------------------------------------------------

/// Initial values for a [`MapElement`](crate::element::MapElement).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    pub api_key: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub heading: f64,
    pub tilt: f64,
    #[serde(rename = "disableDefaultUI")]
    pub disable_default_ui: bool,
    pub zoom_control: Option<bool>,
    pub map_type_control: Option<bool>,
    pub scale_control: Option<bool>,
    pub street_view_control: Option<bool>,
    pub rotate_control: Option<bool>,
    pub fullscreen_control: Option<bool>,
    pub map_type_id: String,
    pub gesture_handling: String,
    pub styles: Vec<serde_json::Value>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            zoom: 10.0,
            min_zoom: None,
            max_zoom: None,
            heading: 0.0,
            tilt: 0.0,
            disable_default_ui: false,
            zoom_control: None,
            map_type_control: None,
            scale_control: None,
            street_view_control: None,
            rotate_control: None,
            fullscreen_control: None,
            map_type_id: "roadmap".to_owned(),
            gesture_handling: "auto".to_owned(),
            styles: Vec::new(),
        }
    }
}

impl MapConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON object. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the API key (builder).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the initial center (builder).
    pub fn with_center(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Set the initial zoom level (builder).
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the map type id (builder).
    pub fn with_map_type_id(mut self, id: impl Into<String>) -> Self {
        self.map_type_id = id.into();
        self
    }

    /// Set the style rules (builder).
    pub fn with_styles(mut self, styles: Vec<serde_json::Value>) -> Self {
        self.styles = styles;
        self
    }
}

// ---------------------------------------------------------------------------
// MarkerConfig
// ---------------------------------------------------------------------------

/// Initial values for a [`MarkerElement`](crate::element::MarkerElement).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerConfig {
    pub title: String,
    pub label: Option<String>,
    pub info: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub draggable: bool,
    pub open: bool,
    pub hidden: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            label: None,
            info: None,
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            draggable: false,
            open: false,
            hidden: false,
        }
    }
}

impl MarkerConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON object. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the marker position (builder).
    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Set the hover title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the info popup HTML (builder).
    pub fn with_info(mut self, html: impl Into<String>) -> Self {
        self.info = Some(html.into());
        self
    }

    /// Make the marker draggable (builder).
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
