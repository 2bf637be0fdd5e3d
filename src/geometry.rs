//! Core geographic types: LatLng, LatLngBounds.
//!
//! These are the coordinate types exchanged with the external map widget. A
//! [`LatLng`] can only be built from a valid (finite, in-range) pair, so any
//! center or position handed to the widget is never NaN.

use serde::Serialize;

use crate::error::PropertyError;

/// Default center used by a freshly constructed element (Amsterdam).
pub const DEFAULT_LATITUDE: f64 = 52.3680;
/// See [`DEFAULT_LATITUDE`].
pub const DEFAULT_LONGITUDE: f64 = 4.9036;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that `value` is a usable latitude in degrees.
pub fn validate_latitude(value: f64) -> Result<f64, PropertyError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(value)
    } else {
        Err(PropertyError::InvalidLatitude(value))
    }
}

/// Check that `value` is a usable longitude in degrees.
pub fn validate_longitude(value: f64) -> Result<f64, PropertyError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(value)
    } else {
        Err(PropertyError::InvalidLongitude(value))
    }
}

// ---------------------------------------------------------------------------
// LatLng
// ---------------------------------------------------------------------------

/// A validated geographic point in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, PropertyError> {
        Ok(Self {
            lat: validate_latitude(lat)?,
            lng: validate_longitude(lng)?,
        })
    }

    /// Latitude in degrees.
    #[inline]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[inline]
    pub const fn lng(self) -> f64 {
        self.lng
    }

    /// JSON form `{ "lat": .., "lng": .. }` as the widget expects it.
    pub fn to_json(self) -> serde_json::Value {
        serde_json::json!({ "lat": self.lat, "lng": self.lng })
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self {
            lat: DEFAULT_LATITUDE,
            lng: DEFAULT_LONGITUDE,
        }
    }
}

// ---------------------------------------------------------------------------
// LatLngBounds
// ---------------------------------------------------------------------------

/// The visible viewport of the map, as reported by the widget.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Create bounds from two corners.
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// JSON form with `south`, `west`, `north`, `east` keys.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "south": self.south_west.lat(),
            "west": self.south_west.lng(),
            "north": self.north_east.lat(),
            "east": self.north_east.lng(),
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
