//! Location services for SolarFeed
//!
//! Forward geocoding via Nominatim and device position sources.

pub mod geocode;
pub mod location;
pub mod types;

pub use geocode::{address_query, Geocoder};
pub use location::{locate_with_timeout, DeviceLocator, FixedLocator};
pub use types::*;
