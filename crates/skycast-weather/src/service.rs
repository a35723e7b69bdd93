//! Fetch-then-convert pipeline.

use std::sync::Arc;

use skycast_core::MeasurementUnit;

use crate::client::WeatherClient;
use crate::convert::convert;
use crate::location::{Coordinates, LocationProvider};
use crate::types::{FetchState, WeatherForecast};

/// Orchestrates one forecast lookup: resolve a position, fetch, convert.
///
/// Stateless between calls; safe to share behind an `Arc`.
pub struct WeatherService {
    client: WeatherClient,
    location: Option<Arc<dyn LocationProvider>>,
}

impl WeatherService {
    pub fn new(client: WeatherClient) -> Self {
        Self {
            client,
            location: None,
        }
    }

    /// Use a device location provider; lookups prefer it over the city name.
    pub fn with_location_provider(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(provider);
        self
    }

    /// Fetch the forecast for the device location when available, falling
    /// back to `city`, converted for display in `unit`.
    ///
    /// One attempt, no retry. Conversion always starts from the SI payload,
    /// never from the server's rendering of the units hint.
    pub async fn forecast(
        &self,
        city: &str,
        unit: MeasurementUnit,
    ) -> FetchState<WeatherForecast> {
        let fetched = match self.locate().await {
            Some(position) => {
                self.client
                    .fetch_by_coordinates(position.latitude, position.longitude)
                    .await
            }
            None => self.client.fetch_by_city(city, unit).await,
        };

        let forecast = match fetched {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("Forecast fetch failed: {}", e);
                return FetchState::Failed(e.into());
            }
        };

        match convert(&forecast, unit) {
            Ok(converted) => FetchState::Ready(converted),
            Err(e) => {
                tracing::warn!("Forecast for {} has no entries", forecast.city.name);
                FetchState::Failed(e.into())
            }
        }
    }

    /// Fetch and convert the forecast for a named city, ignoring any
    /// location provider. Used for favorite-city lookups.
    pub async fn city_forecast(
        &self,
        city: &str,
        unit: MeasurementUnit,
    ) -> FetchState<WeatherForecast> {
        let forecast = match self.client.fetch_by_city(city, unit).await {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("Forecast fetch for {} failed: {}", city, e);
                return FetchState::Failed(e.into());
            }
        };

        match convert(&forecast, unit) {
            Ok(converted) => FetchState::Ready(converted),
            Err(e) => FetchState::Failed(e.into()),
        }
    }

    async fn locate(&self) -> Option<Coordinates> {
        let provider = self.location.as_ref()?;
        match provider.current_location().await {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::debug!("Location unavailable ({}), using city lookup", e);
                None
            }
        }
    }
}
