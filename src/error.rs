//! Error types for property writes, configuration and script loading.

/// Errors from writing a property value.
///
/// A rejected write leaves the previous value in place and records no change.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("latitude {0} is not a finite value in [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is not a finite value in [-180, 180]")]
    InvalidLongitude(f64),

    #[error("'{property}' must be a finite number, got {value}")]
    NotFinite { property: &'static str, value: f64 },
}

/// Errors from loading an element configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid initial value: {0}")]
    Property(#[from] PropertyError),
}

/// Errors from the script bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("invalid script url: {0}")]
    Url(#[from] url::ParseError),

    #[error("loader was dropped before the maps library became available")]
    Closed,
}
