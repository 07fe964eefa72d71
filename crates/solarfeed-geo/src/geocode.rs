//! Forward geocoding: turn a free-text address into coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required, but a
//! User-Agent identifying the application is mandatory.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use solarfeed_core::ServiceConfig;
use tracing::instrument;
use url::Url;

use crate::types::{GeocodeError, GeocodeMatch};

/// Forward geocoding client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Geocoder {
    search_url: Url,
    client: Arc<Client>,
}

impl Geocoder {
    /// Geocoder from the `[services]` config section.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, GeocodeError> {
        Self::with_options(
            &config.geocoding_url,
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_options(
        search_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            search_url: Url::parse(search_url)?,
            client: Arc::new(client),
        })
    }

    /// Search for `query`, returning at most `limit` matches, best first.
    /// An empty list means nothing matched.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("format", "json"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Geocode search returned status {}", response.status());
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let matches: Vec<GeocodeMatch> = response.json().await?;

        match matches.first() {
            Some(first) => tracing::info!("Geocoded '{}' to: {}", query, first.display_name),
            None => tracing::info!("No geocoding match for '{}'", query),
        }
        Ok(matches)
    }
}

/// Free-text query for a city/state/country triple. An empty state is kept
/// as an empty segment; Nominatim ignores it.
pub fn address_query(city: &str, state: &str, country: &str) -> String {
    format!("{}, {}, {}", city.trim(), state.trim(), country.trim())
}
