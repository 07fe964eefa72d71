//! One-off predictions for the user's own location.
//!
//! Two entry points: the device's position, or a manually entered address
//! that is geocoded first. Both end in the same prediction call and share a
//! single result/error slot, which every new attempt clears.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use solarfeed_core::UserAddressConfig;
use solarfeed_geo::{address_query, locate_with_timeout, DeviceLocator, FixedLocator, Geocoder};
use solarfeed_services::{PredictionClient, PredictionRequest, RawPrediction};

use crate::error::ResolveError;

pub const DEVICE_LOCATION_LABEL: &str = "Your Location";
const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverResult {
    pub name: String,
    pub predicted_power_watts: f64,
    pub prediction: RawPrediction,
}

/// Manual address form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualAddress {
    /// Optional label; the geocoder's name is used when blank
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl ManualAddress {
    pub fn new(city: impl Into<String>, state: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn has_required_fields(&self) -> bool {
        !self.city.trim().is_empty() && !self.country.trim().is_empty()
    }
}

impl From<&UserAddressConfig> for ManualAddress {
    fn from(config: &UserAddressConfig) -> Self {
        Self {
            name: config.name.clone(),
            city: config.city.clone(),
            state: config.state.clone(),
            country: config.country.clone(),
        }
    }
}

/// Point-in-time copy of the resolver's read surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverSnapshot {
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<ResolverResult>,
}

#[derive(Debug, Default)]
struct ResolverState {
    loading: bool,
    error: Option<String>,
    result: Option<ResolverResult>,
    latest_attempt: u64,
}

pub struct UserLocationResolver<L = FixedLocator> {
    prediction: PredictionClient,
    geocoder: Geocoder,
    locator: Option<Arc<L>>,
    locate_timeout: Duration,
    state: Arc<Mutex<ResolverState>>,
}

impl<L> Clone for UserLocationResolver<L> {
    fn clone(&self) -> Self {
        Self {
            prediction: self.prediction.clone(),
            geocoder: self.geocoder.clone(),
            locator: self.locator.clone(),
            locate_timeout: self.locate_timeout,
            state: self.state.clone(),
        }
    }
}

impl<L> std::fmt::Debug for UserLocationResolver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLocationResolver")
            .field("has_locator", &self.locator.is_some())
            .field("locate_timeout", &self.locate_timeout)
            .finish()
    }
}

impl UserLocationResolver<FixedLocator> {
    /// Resolver on a host with no geolocation capability.
    pub fn without_device(prediction: PredictionClient, geocoder: Geocoder) -> Self {
        Self::new(prediction, geocoder, None)
    }
}

impl<L: DeviceLocator> UserLocationResolver<L> {
    pub fn new(prediction: PredictionClient, geocoder: Geocoder, locator: Option<L>) -> Self {
        Self {
            prediction,
            geocoder,
            locator: locator.map(Arc::new),
            locate_timeout: DEFAULT_LOCATE_TIMEOUT,
            state: Arc::new(Mutex::new(ResolverState::default())),
        }
    }

    /// How long to wait for the device position.
    pub fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    pub fn supports_device_location(&self) -> bool {
        self.locator.is_some()
    }

    /// Predict for the device's current position.
    pub async fn use_device_location(&self) -> Result<ResolverResult, ResolveError> {
        let Some(locator) = self.locator.clone() else {
            let attempt = self.begin_attempt(false);
            return self.finish(attempt, Err(ResolveError::Unsupported));
        };

        let attempt = self.begin_attempt(true);
        let position = match locate_with_timeout(locator.as_ref(), self.locate_timeout).await {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Device location failed: {}", e);
                return self.finish(attempt, Err(ResolveError::DeviceLocation(e)));
            }
        };

        self.predict_for(attempt, position.latitude, position.longitude, DEVICE_LOCATION_LABEL)
            .await
    }

    /// Geocode `address` and predict for the best match.
    pub async fn use_manual_address(
        &self,
        address: &ManualAddress,
    ) -> Result<ResolverResult, ResolveError> {
        let attempt = self.begin_attempt(true);

        if !address.has_required_fields() {
            return self.finish(attempt, Err(ResolveError::MissingFields));
        }

        let query = address_query(&address.city, &address.state, &address.country);
        let matches = match self.geocoder.search(&query, 1).await {
            Ok(matches) => matches,
            Err(e) => return self.finish(attempt, Err(e.into())),
        };

        let Some(best) = matches.into_iter().next() else {
            return self.finish(attempt, Err(ResolveError::NotFound));
        };
        let position = match best.coordinates() {
            Ok(position) => position,
            Err(e) => return self.finish(attempt, Err(e.into())),
        };

        let name = match address.name.trim() {
            "" => best.display_name,
            name => name.to_string(),
        };

        self.predict_for(attempt, position.latitude, position.longitude, &name)
            .await
    }

    /// Predict for explicit coordinates as a new attempt.
    pub async fn resolve_and_predict(
        &self,
        latitude: f64,
        longitude: f64,
        name: &str,
    ) -> Result<ResolverResult, ResolveError> {
        let attempt = self.begin_attempt(true);
        self.predict_for(attempt, latitude, longitude, name).await
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        let state = self.state.lock();
        ResolverSnapshot {
            loading: state.loading,
            error: state.error.clone(),
            result: state.result.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn result(&self) -> Option<ResolverResult> {
        self.state.lock().result.clone()
    }

    async fn predict_for(
        &self,
        attempt: u64,
        latitude: f64,
        longitude: f64,
        name: &str,
    ) -> Result<ResolverResult, ResolveError> {
        if self.is_superseded(attempt) {
            return Err(ResolveError::Superseded);
        }

        let request = PredictionRequest::for_coordinates(latitude, longitude);
        tracing::debug!(
            "Predicting for {} at ({}, {}), tilt {}, azimuth {}",
            name,
            latitude,
            longitude,
            request.tilt_angle,
            request.azimuth_angle
        );

        let outcome = self
            .prediction
            .predict_live(&request)
            .await
            .map(|prediction| ResolverResult {
                name: name.to_string(),
                predicted_power_watts: prediction.predicted_power_watts,
                prediction,
            })
            .map_err(ResolveError::from);

        self.finish(attempt, outcome)
    }

    /// Start a new attempt: clear result and error, and invalidate any
    /// attempt still in flight.
    fn begin_attempt(&self, loading: bool) -> u64 {
        let mut state = self.state.lock();
        state.latest_attempt += 1;
        state.loading = loading;
        state.error = None;
        state.result = None;
        state.latest_attempt
    }

    fn is_superseded(&self, attempt: u64) -> bool {
        self.state.lock().latest_attempt != attempt
    }

    /// Record the outcome of `attempt` unless a newer one has started.
    fn finish(
        &self,
        attempt: u64,
        outcome: Result<ResolverResult, ResolveError>,
    ) -> Result<ResolverResult, ResolveError> {
        let mut state = self.state.lock();
        if state.latest_attempt != attempt {
            tracing::debug!("Discarding superseded resolution attempt {}", attempt);
            return Err(ResolveError::Superseded);
        }

        state.loading = false;
        match &outcome {
            Ok(result) => {
                tracing::info!(
                    "Prediction for {}: {:.2} W",
                    result.name,
                    result.predicted_power_watts
                );
                state.result = Some(result.clone());
            }
            Err(e) => {
                tracing::warn!("Resolution failed: {}", e);
                state.error = Some(e.to_string());
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        assert!(ManualAddress::new("Phoenix", "", "USA").has_required_fields());
        assert!(!ManualAddress::new("", "AZ", "USA").has_required_fields());
        assert!(!ManualAddress::new("Phoenix", "AZ", "   ").has_required_fields());
    }

    #[test]
    fn test_from_config() {
        let config = UserAddressConfig {
            name: "My Home".into(),
            city: "Dubai".into(),
            state: String::new(),
            country: "UAE".into(),
        };
        let address = ManualAddress::from(&config);
        assert_eq!(address, ManualAddress::new("Dubai", "", "UAE").named("My Home"));
    }
}
