//! Dashboard error types.
//!
//! `ResolveError`'s display text is exactly what the user sees.

use solarfeed_geo::{GeocodeError, LocationError};
use solarfeed_services::PredictionError;
use thiserror::Error;

pub const FEED_FALLBACK_MESSAGE: &str = "API call failed.";
pub const RESOLVER_FALLBACK_MESSAGE: &str = "Failed to get prediction.";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("At least one feed location is required")]
    NoLocations,

    #[error("Feed interval must be greater than zero")]
    ZeroInterval,
}

/// Why a user-location resolution attempt failed.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("City and Country are required for manual prediction.")]
    MissingFields,

    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    #[error("Unable to retrieve your location. Please try the manual form.")]
    DeviceLocation(#[source] LocationError),

    #[error("Location not found. Please check your spelling.")]
    NotFound,

    #[error("Geocoding failed: {0}")]
    Geocoding(#[from] GeocodeError),

    #[error("{}", .0.display_message(RESOLVER_FALLBACK_MESSAGE))]
    Prediction(#[from] PredictionError),

    /// A newer attempt started before this one finished.
    #[error("Superseded by a newer request")]
    Superseded,
}
