//! Centralized error types for SolarFeed.
//!
//! Component crates define their own errors (`PredictionError`,
//! `GeocodeError`, ...) and build on the shared `NetworkError` for
//! transport failures. `AppError` is what the binary reports.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for display.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by component crates, carried as their display text.
    #[error("Service error: {0}")]
    Service(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::Load(_) => "Unable to read the configuration file.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let err: AppError = NetworkError::Timeout.into();
        assert!(matches!(err, AppError::Network(NetworkError::Timeout)));
    }

    #[test]
    fn test_user_message_propagation() {
        let err = AppError::Config(ConfigError::Invalid("feed.interval_secs".into()));
        assert_eq!(err.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_network_user_messages() {
        let err = AppError::from(NetworkError::ConnectionFailed("refused".into()));
        assert_eq!(
            err.user_message(),
            "Unable to connect. Check your internet connection."
        );
        assert_eq!(
            NetworkError::Timeout.user_message(),
            "The request timed out. Please try again."
        );
    }

    #[test]
    fn test_io_and_load_errors() {
        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "signal"));
        assert!(matches!(io, AppError::Io(_)));

        let load = AppError::from(ConfigError::Load("bad toml".into()));
        assert_eq!(load.user_message(), "Unable to read the configuration file.");
        assert!(load.to_string().contains("bad toml"));
    }

    #[test]
    fn test_display_includes_detail() {
        let err = NetworkError::InvalidResponse("expected value at line 1".into());
        assert!(err.to_string().contains("expected value"));
    }
}
