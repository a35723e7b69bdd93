//! Forecast API client.
//!
//! Wraps the daily-forecast REST endpoint. Payload values are treated as SI
//! (Kelvin, m/s) regardless of the `units` query hint, which the server only
//! uses for cosmetic rounding of its own rendering.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use skycast_core::error::{FetchError, ReqwestErrorExt};
use skycast_core::MeasurementUnit;

use crate::types::{City, ForecastEntry, Temperature, WeatherForecast};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const FORECAST_PATH: &str = "/data/2.5/forecast/daily";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FORECAST_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    forecast_days: u32,
}

impl WeatherClient {
    /// Client against the production endpoint.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client against a non-default endpoint (mock servers, proxies).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| e.into_fetch_error())?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            forecast_days: DEFAULT_FORECAST_DAYS,
        })
    }

    /// Number of daily entries to request (the API serves up to 16).
    pub fn forecast_days(mut self, days: u32) -> Self {
        self.forecast_days = days;
        self
    }

    /// Fetch the daily forecast for a named city.
    ///
    /// `unit_hint` is forwarded as the `units` query parameter for parity
    /// with the provider's documented interface; the returned forecast must
    /// still be treated as SI and converted locally.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_city(
        &self,
        city: &str,
        unit_hint: MeasurementUnit,
    ) -> Result<WeatherForecast, FetchError> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);
        let days = self.forecast_days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("cnt", days.as_str()),
                ("units", unit_hint.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.into_fetch_error())?;

        self.handle_response(response).await
    }

    /// Fetch the daily forecast for coordinates.
    ///
    /// No units hint is sent on this path; the payload is always SI.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherForecast, FetchError> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);
        let days = self.forecast_days.to_string();
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("cnt", days.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.into_fetch_error())?;

        self.handle_response(response).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<WeatherForecast, FetchError> {
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Forecast request returned status {}", status);
            return Err(FetchError::Http(status.as_u16()));
        }

        let body: ApiForecastResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(body.into_forecast())
    }
}

// Wire schema of the daily-forecast payload. Owned by the provider; only the
// fields the domain model needs are decoded.

#[derive(Debug, Deserialize)]
struct ApiForecastResponse {
    city: ApiCity,
    #[serde(default)]
    list: Vec<ApiEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    dt: i64,
    sunrise: i64,
    sunset: i64,
    temp: Temperature,
    feels_like: ApiFeelsLike,
    pressure: i64,
    humidity: i64,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiFeelsLike {
    day: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ApiCondition {
    main: String,
    description: String,
    icon: String,
}

impl ApiForecastResponse {
    fn into_forecast(self) -> WeatherForecast {
        WeatherForecast {
            city: City {
                name: self.city.name,
                country: self.city.country,
            },
            entries: self.list.into_iter().map(ApiEntry::into_entry).collect(),
        }
    }
}

impl ApiEntry {
    fn into_entry(self) -> ForecastEntry {
        let condition = self.weather.into_iter().next().unwrap_or_default();

        ForecastEntry {
            timestamp: self.dt,
            temperature: self.temp,
            feels_like_day: self.feels_like.day,
            pressure: self.pressure,
            humidity_percent: self.humidity,
            wind_speed: self.speed,
            sunrise: self.sunrise,
            sunset: self.sunset,
            condition_main: condition.main,
            condition_description: condition.description,
            condition_icon: condition.icon,
        }
    }
}
