pub mod config;
pub mod error;
pub mod location;

pub use config::{
    Config, DeviceConfig, FeedConfig, ServiceConfig, UserAddressConfig, ValidationResult,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};
pub use location::{default_locations, Location};

use anyhow::Result;

/// Initialize logging. Safe to call more than once.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("SolarFeed core initialized");
    Ok(())
}
