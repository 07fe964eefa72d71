use serde::{Deserialize, Serialize};
use solarfeed_core::NetworkError;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One forward-geocoding match. Nominatim sends coordinates as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl GeocodeMatch {
    /// Parse the string coordinates.
    pub fn coordinates(&self) -> Result<Coordinates, GeocodeError> {
        let latitude = self
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidCoordinates(self.lat.clone()))?;
        let longitude = self
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidCoordinates(self.lon.clone()))?;
        Ok(Coordinates::new(latitude, longitude))
    }
}

/// Device location errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// The user or platform refused to share the position.
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
}

/// Geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("{0}")]
    Network(#[from] NetworkError),
    #[error("geocoding service returned {0}")]
    Status(u16),
    #[error("invalid coordinate in response: {0}")]
    InvalidCoordinates(String),
    #[error("invalid geocoding URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        use solarfeed_core::ReqwestErrorExt;
        GeocodeError::Network(e.into_network_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_coordinates_parse() {
        let m = GeocodeMatch {
            lat: "33.4484367".into(),
            lon: "-112.0741410".into(),
            display_name: "Phoenix, Maricopa County, Arizona, United States".into(),
        };
        let c = m.coordinates().unwrap();
        assert_eq!(c.latitude, 33.4484367);
        assert_eq!(c.longitude, -112.074141);
    }

    #[test]
    fn test_match_coordinates_invalid() {
        let m = GeocodeMatch {
            lat: "north".into(),
            lon: "0".into(),
            display_name: "Nowhere".into(),
        };
        assert!(matches!(m.coordinates(), Err(GeocodeError::InvalidCoordinates(s)) if s == "north"));
    }

    #[test]
    fn test_location_error_display() {
        assert_eq!(LocationError::Timeout.to_string(), "Location request timed out");
        assert!(LocationError::PermissionDenied.to_string().contains("denied"));
    }
}
