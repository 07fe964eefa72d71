//! Prediction API client for SolarFeed.

pub mod error;
pub mod prediction;
pub mod types;

pub use error::{PredictionError, UNKNOWN_ERROR_MESSAGE};
pub use prediction::PredictionClient;
pub use types::{
    ForecastResponse, HealthResponse, HourlyPrediction, PredictionRequest, RawPrediction,
};
