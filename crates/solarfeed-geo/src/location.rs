//! Device location sources.
//!
//! A host that cannot report its position simply has no `DeviceLocator`;
//! callers hold an `Option` and treat `None` as "not supported".

use std::future::Future;
use std::time::Duration;

use solarfeed_core::DeviceConfig;

use crate::types::{Coordinates, LocationError};

/// Something that can report where this device is.
pub trait DeviceLocator: Send + Sync {
    /// Request the current position. May wait on the user or hardware.
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Reports a fixed position, optionally after a delay.
#[derive(Debug, Clone)]
pub struct FixedLocator {
    coordinates: Coordinates,
    delay: Option<Duration>,
}

impl FixedLocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            delay: None,
        }
    }

    /// Wait `delay` before answering, like a GPS fix would.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Locator for the `[device]` config section, or `None` when no
    /// coordinates are configured.
    pub fn from_config(config: &DeviceConfig) -> Option<Self> {
        config
            .coordinates()
            .map(|(lat, lon)| Self::new(Coordinates::new(lat, lon)))
    }
}

impl DeviceLocator for FixedLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.coordinates)
    }
}

/// Query `locator`, giving up after `timeout`.
pub async fn locate_with_timeout<L: DeviceLocator>(
    locator: &L,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    match tokio::time::timeout(timeout, locator.current_position()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!("Device location timed out after {:?}", timeout);
            Err(LocationError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_both_coordinates() {
        let mut config = DeviceConfig::default();
        assert!(FixedLocator::from_config(&config).is_none());

        config.latitude = Some(47.6062);
        assert!(FixedLocator::from_config(&config).is_none());

        config.longitude = Some(-122.3321);
        assert!(FixedLocator::from_config(&config).is_some());
    }

    #[tokio::test]
    async fn test_fixed_locator_reports_position() {
        let locator = FixedLocator::new(Coordinates::new(47.6062, -122.3321));
        let pos = locator.current_position().await.unwrap();
        assert_eq!(pos, Coordinates::new(47.6062, -122.3321));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_elapses() {
        let locator = FixedLocator::new(Coordinates::new(0.0, 0.0)).with_delay(Duration::from_secs(30));
        let result = locate_with_timeout(&locator, Duration::from_secs(10)).await;
        assert!(matches!(result, Err(LocationError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fix_within_timeout() {
        let locator = FixedLocator::new(Coordinates::new(-23.698, 133.8807)).with_delay(Duration::from_secs(2));
        let result = locate_with_timeout(&locator, Duration::from_secs(10)).await;
        assert_eq!(result.unwrap().latitude, -23.698);
    }
}
