//! Wire types for the prediction API.

use serde::{Deserialize, Serialize};
use solarfeed_core::Location;

/// Request body for `/predict/live` and `/predict/forecast`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub tilt_angle: f64,
    pub azimuth_angle: f64,
    /// IANA timezone name (e.g. "America/Phoenix")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl PredictionRequest {
    /// Build a request from a configured site, using its own panel orientation.
    pub fn from_location(location: &Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            tilt_angle: location.tilt,
            azimuth_angle: location.azimuth,
            timezone: None,
        }
    }

    /// Build a request for arbitrary coordinates.
    ///
    /// Tilt is the latitude magnitude rounded to whole degrees; panels face
    /// the equator (south in the northern hemisphere, north in the southern).
    pub fn for_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            tilt_angle: latitude.abs().round(),
            azimuth_angle: if latitude >= 0.0 { 180.0 } else { 0.0 },
            timezone: None,
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// Response from `/predict/live`.
///
/// Only the power value is interpreted; anything else the service sends is
/// kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub predicted_power_watts: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One hour of a daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPrediction {
    /// ISO-8601 timestamp with offset
    pub hour: String,
    pub predicted_power_watts: f64,
}

/// Response from `/predict/forecast`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub hourly_forecast: Vec<HourlyPrediction>,
    pub total_kwh_predicted: f64,
}

impl ForecastResponse {
    /// Hour with the highest predicted output, if any.
    pub fn peak_hour(&self) -> Option<&HourlyPrediction> {
        self.hourly_forecast
            .iter()
            .max_by(|a, b| a.predicted_power_watts.total_cmp(&b.predicted_power_watts))
    }
}

/// Body returned by the health endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
}

/// Error body returned by the API on failure. `detail` is a string for
/// application errors and a list for request validation errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn detail_message(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_location() {
        let loc = Location::new("Phoenix, AZ, USA", 33.4484, -112.074, 33.0, 180.0);
        let req = PredictionRequest::from_location(&loc);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "latitude": 33.4484,
                "longitude": -112.074,
                "tilt_angle": 33.0,
                "azimuth_angle": 180.0
            })
        );
    }

    #[test]
    fn test_coordinate_heuristic_northern() {
        let req = PredictionRequest::for_coordinates(47.6062, -122.3321);
        assert_eq!(req.tilt_angle, 48.0);
        assert_eq!(req.azimuth_angle, 180.0);
    }

    #[test]
    fn test_coordinate_heuristic_southern() {
        let req = PredictionRequest::for_coordinates(-33.8688, 151.2093);
        assert_eq!(req.tilt_angle, 34.0);
        assert_eq!(req.azimuth_angle, 0.0);
    }

    #[test]
    fn test_equator_faces_south() {
        let req = PredictionRequest::for_coordinates(0.0, 10.0);
        assert_eq!(req.tilt_angle, 0.0);
        assert_eq!(req.azimuth_angle, 180.0);
    }

    #[test]
    fn test_timezone_serialized_when_set() {
        let req = PredictionRequest::for_coordinates(26.2, 73.0).with_timezone("Asia/Kolkata");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"timezone\":\"Asia/Kolkata\""));
    }

    #[test]
    fn test_raw_prediction_keeps_extra_fields() {
        let raw: RawPrediction = serde_json::from_value(serde_json::json!({
            "predicted_power_watts": 542.17,
            "model_version": "v2"
        }))
        .unwrap();
        assert_eq!(raw.predicted_power_watts, 542.17);
        assert_eq!(raw.extra.get("model_version"), Some(&serde_json::json!("v2")));
    }

    #[test]
    fn test_error_body_detail_variants() {
        let body: ErrorBody =
            serde_json::from_value(serde_json::json!({"detail": "Weather API down"})).unwrap();
        assert_eq!(body.detail_message().as_deref(), Some("Weather API down"));

        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "detail": [{"loc": ["body", "latitude"], "msg": "field required"}]
        }))
        .unwrap();
        assert!(body.detail_message().is_none());

        let body: ErrorBody = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(body.detail_message().is_none());
    }

    #[test]
    fn test_forecast_peak_hour() {
        let forecast = ForecastResponse {
            hourly_forecast: vec![
                HourlyPrediction { hour: "2025-09-14T11:00:00+05:30".into(), predicted_power_watts: 300.0 },
                HourlyPrediction { hour: "2025-09-14T13:00:00+05:30".into(), predicted_power_watts: 410.5 },
                HourlyPrediction { hour: "2025-09-14T15:00:00+05:30".into(), predicted_power_watts: 280.0 },
            ],
            total_kwh_predicted: 4.5,
        };
        assert_eq!(forecast.peak_hour().map(|h| h.hour.as_str()), Some("2025-09-14T13:00:00+05:30"));
    }
}
