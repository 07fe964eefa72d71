//! Fixed sampling points for the live feed.

use serde::{Deserialize, Serialize};

/// A geographic sampling point with the orientation of its panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name (e.g. "Phoenix, AZ, USA")
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Panel tilt in degrees from horizontal
    pub tilt: f64,
    /// Panel azimuth in degrees (180 = facing south)
    pub azimuth: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, tilt: f64, azimuth: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            tilt,
            azimuth,
        }
    }

    /// True if latitude and longitude are within their valid ranges.
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The five sunny sites the feed rotates through by default.
pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new("Phoenix, AZ, USA", 33.4484, -112.0740, 33.0, 180.0),
        Location::new("Dubai, UAE", 25.2048, 55.2708, 25.0, 180.0),
        Location::new("Jodhpur, India", 26.2389, 73.0243, 26.0, 180.0),
        Location::new("Atacama Desert, Chile", -24.5000, -69.2500, 24.0, 0.0),
        Location::new("Alice Springs, Australia", -23.6980, 133.8807, 23.0, 0.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locations() {
        let locations = default_locations();
        assert_eq!(locations.len(), 5);
        assert_eq!(locations[0].name, "Phoenix, AZ, USA");
        assert!(locations.iter().all(Location::has_valid_coordinates));
    }

    #[test]
    fn test_southern_sites_face_north() {
        for loc in default_locations() {
            if loc.latitude < 0.0 {
                assert_eq!(loc.azimuth, 0.0, "{} should face north", loc.name);
            } else {
                assert_eq!(loc.azimuth, 180.0, "{} should face south", loc.name);
            }
        }
    }

    #[test]
    fn test_invalid_coordinates() {
        let loc = Location::new("Nowhere", 91.0, 0.0, 0.0, 180.0);
        assert!(!loc.has_valid_coordinates());
    }
}
