//! Solar power prediction API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client};
use solarfeed_core::{NetworkError, ServiceConfig};
use tracing::instrument;
use url::Url;

use crate::error::PredictionError;
use crate::types::{
    ErrorBody, ForecastResponse, HealthResponse, PredictionRequest, RawPrediction,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("SolarFeed/", env!("CARGO_PKG_VERSION"));

/// Client for the prediction API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: Url,
    client: Arc<Client>,
}

impl PredictionClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://127.0.0.1:8000/api/v1`).
    pub fn new(base_url: &str) -> Result<Self, PredictionError> {
        Self::with_options(base_url, USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client from the `[services]` config section.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, PredictionError> {
        Self::with_options(
            &config.prediction_api_url,
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, PredictionError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url: normalize_base(base_url)?,
            client: Arc::new(client),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Instantaneous power prediction for one site.
    #[instrument(skip(self), level = "debug")]
    pub async fn predict_live(
        &self,
        request: &PredictionRequest,
    ) -> Result<RawPrediction, PredictionError> {
        let url = self.base_url.join("predict/live")?;

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let prediction: RawPrediction = self.handle_response(response).await?;
        tracing::debug!(
            "Live prediction for ({}, {}): {} W",
            request.latitude,
            request.longitude,
            prediction.predicted_power_watts
        );
        Ok(prediction)
    }

    /// Hour-by-hour forecast for the next day.
    #[instrument(skip(self), level = "debug")]
    pub async fn predict_forecast(
        &self,
        request: &PredictionRequest,
    ) -> Result<ForecastResponse, PredictionError> {
        let url = self.base_url.join("predict/forecast")?;

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let forecast: ForecastResponse = self.handle_response(response).await?;
        tracing::info!(
            "Fetched {}-hour forecast ({:.2} kWh)",
            forecast.hourly_forecast.len(),
            forecast.total_kwh_predicted
        );
        Ok(forecast)
    }

    /// Check that the service is up. The health endpoint lives at the
    /// server root, not under the API prefix.
    #[instrument(skip(self), level = "debug")]
    pub async fn health_check(&self) -> Result<bool, PredictionError> {
        let url = self.base_url.join("/")?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::warn!("Prediction service health check returned {}", response.status());
            return Ok(false);
        }

        match response.json::<HealthResponse>().await {
            Ok(body) => tracing::debug!("Health check: {}", body.message),
            Err(e) => tracing::debug!("Health check body not understood: {}", e),
        }
        Ok(true)
    }

    /// Decode a success body, or turn a failure status into `Upstream`.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PredictionError> {
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| {
                PredictionError::Transport(NetworkError::InvalidResponse(e.to_string()))
            });
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::detail_message);

        tracing::warn!("Prediction API returned {}: {}", status, text);
        Err(PredictionError::Upstream {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Parse the base URL and make sure it ends with `/` so relative joins
/// append to the API prefix instead of replacing its last segment.
fn normalize_base(base_url: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
