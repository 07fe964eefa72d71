//! Prediction client error types.

use solarfeed_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

/// Shown when a failure carries no usable message of its own
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Error, Debug)]
pub enum PredictionError {
    /// The service answered with a non-success status.
    #[error("Prediction API error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Upstream { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Transport(#[from] NetworkError),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for PredictionError {
    fn from(e: reqwest::Error) -> Self {
        PredictionError::Transport(e.into_network_error())
    }
}

impl PredictionError {
    /// Message for display: the service's own `detail` when it sent one,
    /// `fallback` for other upstream failures, a generic message otherwise.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Upstream {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Upstream { detail: None, .. } => fallback.to_string(),
            Self::Transport(_) | Self::InvalidUrl(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }

    /// HTTP status of an upstream failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_preferred() {
        let err = PredictionError::Upstream {
            status: 500,
            detail: Some("OpenWeather API key not configured on server.".into()),
        };
        assert_eq!(
            err.display_message("API call failed."),
            "OpenWeather API key not configured on server."
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_fallback_without_detail() {
        let err = PredictionError::Upstream {
            status: 502,
            detail: None,
        };
        assert_eq!(err.display_message("API call failed."), "API call failed.");
    }

    #[test]
    fn test_transport_is_generic() {
        let err = PredictionError::Transport(NetworkError::Timeout);
        assert_eq!(err.display_message("API call failed."), UNKNOWN_ERROR_MESSAGE);
        assert!(err.status().is_none());
    }
}
