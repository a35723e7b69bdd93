pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, MeasurementUnit, ValidationResult, WeatherConfig};
pub use error::{
    AppError, ConfigError, ConversionError, FetchError, LocationError, StorageError,
};

use anyhow::Result;

/// Initialize the core library
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skycast core initialized");
    Ok(())
}
