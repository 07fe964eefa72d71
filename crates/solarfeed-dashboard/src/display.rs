//! Presentation metadata attached to each feed prediction.
//!
//! Trend, description and confidence are drawn at random; they decorate the
//! feed and say nothing about the model.

use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use solarfeed_services::RawPrediction;

pub const CONFIDENCE_MIN: f64 = 70.0;
pub const CONFIDENCE_MAX: f64 = 99.8;

/// Trend label shown next to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Volatile,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Up, Trend::Down, Trend::Volatile];

    /// Pick a trend uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Up => "Positive trend detected",
            Self::Down => "Breakout pattern forming",
            Self::Volatile => "High volatility expected",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Up => "↗",
            Self::Down => "↘",
            Self::Volatile => "∼",
        }
    }
}

/// Confidence percentage in `[CONFIDENCE_MIN, CONFIDENCE_MAX]`, one decimal.
pub fn random_confidence<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw = rng.gen_range(CONFIDENCE_MIN..=CONFIDENCE_MAX);
    ((raw * 10.0).round() / 10.0).clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// A feed entry: the service's prediction plus display metadata.
/// Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPrediction {
    /// Creation order across the feed's lifetime; survives eviction.
    pub sequence: u64,
    pub location_name: String,
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,
    pub trend: Trend,
    pub description: String,
    pub confidence: f64,
    pub prediction: RawPrediction,
}

impl DisplayPrediction {
    pub fn augment<R: Rng + ?Sized>(
        prediction: RawPrediction,
        location_name: &str,
        sequence: u64,
        at: DateTime<Local>,
        rng: &mut R,
    ) -> Self {
        let trend = Trend::random(rng);
        Self {
            sequence,
            location_name: location_name.to_string(),
            time: at.format("%H:%M:%S").to_string(),
            trend,
            description: trend.description().to_string(),
            confidence: random_confidence(rng),
            prediction,
        }
    }

    pub fn power_watts(&self) -> f64 {
        self.prediction.predicted_power_watts
    }
}
