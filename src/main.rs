use std::time::Duration;

use anyhow::Result;
use solarfeed_core::{AppError, Config, ConfigError};
use solarfeed_dashboard::{Dashboard, LiveFeedController, ManualAddress, UserLocationResolver};
use solarfeed_geo::{FixedLocator, GeocodeError, Geocoder};
use solarfeed_services::{PredictionClient, PredictionError};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    solarfeed_core::init()?;

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }

    Ok(())
}

async fn run() -> Result<(), AppError> {
    let config = load_config()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let client = PredictionClient::from_config(&config.services).map_err(prediction_error)?;

    match client.health_check().await {
        Ok(true) => tracing::info!("Prediction service at {} is up", client.base_url()),
        Ok(false) => tracing::warn!("Prediction service at {} is unhealthy", client.base_url()),
        Err(e) => tracing::warn!("Prediction service unreachable: {}", e),
    }

    let dashboard = Dashboard::mount(client.clone(), &config.feed)
        .map_err(|e| AppError::Service(e.to_string()))?;
    let logger = tokio::spawn(log_feed(dashboard.feed().clone()));

    let geocoder = Geocoder::from_config(&config.services).map_err(geocode_error)?;
    let resolver = UserLocationResolver::new(
        client,
        geocoder,
        FixedLocator::from_config(&config.device),
    )
    .with_locate_timeout(Duration::from_secs(config.device.timeout_secs));
    tokio::spawn(resolve_user_location(resolver, config.user.clone()));

    println!("SolarFeed - live solar power predictions");
    println!("Press Ctrl-C to stop.");

    let signal = tokio::signal::ctrl_c().await;

    // Graceful shutdown
    dashboard.unmount().await;
    if let Err(e) = logger.await {
        tracing::warn!("Feed logger ended abnormally: {}", e);
    }
    signal?;
    tracing::info!("SolarFeed stopped");

    Ok(())
}

fn load_config() -> Result<Config, AppError> {
    let config = Config::load().map_err(|e| ConfigError::Load(format!("{:#}", e)))?;
    let validation = config.validate();

    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()).into());
    }

    Ok(config)
}

fn prediction_error(e: PredictionError) -> AppError {
    match e {
        PredictionError::Transport(e) => AppError::Network(e),
        PredictionError::InvalidUrl(e) => {
            ConfigError::Invalid(format!("services.prediction_api_url: {}", e)).into()
        }
        other => AppError::Service(other.to_string()),
    }
}

fn geocode_error(e: GeocodeError) -> AppError {
    match e {
        GeocodeError::Network(e) => AppError::Network(e),
        GeocodeError::InvalidUrl(e) => {
            ConfigError::Invalid(format!("services.geocoding_url: {}", e)).into()
        }
        other => AppError::Service(other.to_string()),
    }
}

/// Log each new history entry and every error change until the feed
/// shuts down.
async fn log_feed(feed: LiveFeedController) {
    let mut updates = feed.subscribe();
    let mut last_sequence = 0;
    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            _ = feed.closed() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let snapshot = feed.snapshot();

        if let Some(latest) = snapshot.history.last() {
            if latest.sequence > last_sequence {
                last_sequence = latest.sequence;
                println!(
                    "[{}] {:<28} {:>9.2} W  {} {} ({:.1}% confidence)",
                    latest.time,
                    latest.location_name,
                    latest.power_watts(),
                    latest.trend.icon(),
                    latest.description,
                    latest.confidence
                );
            }
        }

        if snapshot.error != last_error {
            if let Some(error) = &snapshot.error {
                println!("Feed error: {}", error);
            }
            last_error = snapshot.error;
        }
    }
}

/// Device position if one is configured, otherwise the configured address.
async fn resolve_user_location(
    resolver: UserLocationResolver,
    address: Option<solarfeed_core::UserAddressConfig>,
) {
    let outcome = if resolver.supports_device_location() {
        resolver.use_device_location().await
    } else if let Some(address) = address {
        resolver.use_manual_address(&ManualAddress::from(&address)).await
    } else {
        tracing::debug!("No device location or address configured");
        return;
    };

    match outcome {
        Ok(result) => println!(
            "Your prediction for {}: {:.2} W",
            result.name, result.predicted_power_watts
        ),
        Err(e) => println!("Your prediction failed: {}", e),
    }
}
