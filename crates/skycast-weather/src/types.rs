use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skycast_core::AppError;
pub use skycast_core::MeasurementUnit;

/// Identifies the queried location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
}

/// Temperatures for the periods of one forecast day.
///
/// The source API does not guarantee `min <= day <= max`; nothing here
/// assumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One forecast day.
///
/// Temperature and wind fields are in SI units (Kelvin, m/s) on a freshly
/// fetched forecast; `convert` produces display values. Condition strings
/// come straight from the API and are only meaningful to the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Epoch seconds of the forecast day
    pub timestamp: i64,
    pub temperature: Temperature,
    pub feels_like_day: f64,
    pub pressure: i64,
    pub humidity_percent: i64,
    pub wind_speed: f64,
    /// Epoch seconds
    pub sunrise: i64,
    /// Epoch seconds
    pub sunset: i64,
    pub condition_main: String,
    pub condition_description: String,
    pub condition_icon: String,
}

impl ForecastEntry {
    /// UTC time of the forecast day, if the timestamp is representable.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Short weekday label for list rows, e.g. "Tue, Aug 4".
    pub fn day_label(&self) -> String {
        self.date()
            .map(|d| d.format("%a, %b %-d").to_string())
            .unwrap_or_default()
    }

    /// Sunrise as a clock label, e.g. "6:59 AM".
    pub fn sunrise_label(&self) -> String {
        Self::clock_label(self.sunrise)
    }

    /// Sunset as a clock label, e.g. "8:14 PM".
    pub fn sunset_label(&self) -> String {
        Self::clock_label(self.sunset)
    }

    fn clock_label(epoch_seconds: i64) -> String {
        DateTime::from_timestamp(epoch_seconds, 0)
            .map(|d| d.format("%-I:%M %p").to_string())
            .unwrap_or_default()
    }
}

/// A multi-day forecast for one city.
///
/// Entries are chronological; index 0 is today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub city: City,
    pub entries: Vec<ForecastEntry>,
}

impl WeatherForecast {
    /// Today's entry, when the forecast has one.
    pub fn today(&self) -> Option<&ForecastEntry> {
        self.entries.first()
    }
}

/// Result container handed to the presentation layer.
///
/// A lookup is `Loading` until the single fetch attempt resolves into
/// `Ready` or `Failed`; the caller decides the user-visible fallback.
#[derive(Debug)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(AppError),
}

impl<T> FetchState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn entry(timestamp: i64) -> ForecastEntry {
        ForecastEntry {
            timestamp,
            temperature: Temperature {
                day: 293.15,
                min: 288.15,
                max: 296.15,
                night: 289.15,
                eve: 294.15,
                morn: 288.65,
            },
            feels_like_day: 292.15,
            pressure: 1014,
            humidity_percent: 56,
            wind_speed: 4.2,
            sunrise: 1722938340,
            sunset: 1722990840,
            condition_main: "Clouds".to_string(),
            condition_description: "scattered clouds".to_string(),
            condition_icon: "03d".to_string(),
        }
    }

    #[test]
    fn test_day_label() {
        // 2024-08-06 12:00:00 UTC, a Tuesday
        let e = entry(1722945600);
        assert_eq!(e.day_label(), "Tue, Aug 6");
    }

    #[test]
    fn test_clock_labels() {
        let e = entry(1722945600);
        assert_eq!(e.sunrise_label(), "9:59 AM");
        assert_eq!(e.sunset_label(), "12:34 AM");
    }

    #[test]
    fn test_today_is_first_entry() {
        let forecast = WeatherForecast {
            city: City { name: "Toronto".to_string(), country: "CA".to_string() },
            entries: vec![entry(1722945600), entry(1723032000)],
        };
        assert_eq!(forecast.today().unwrap().timestamp, 1722945600);

        let empty = WeatherForecast {
            city: City { name: "Toronto".to_string(), country: "CA".to_string() },
            entries: vec![],
        };
        assert!(empty.today().is_none());
    }

    #[test]
    fn test_fetch_state_accessors() {
        let ready: FetchState<i32> = FetchState::Ready(7);
        assert!(ready.is_ready());
        assert_eq!(ready.data(), Some(&7));
        assert!(ready.error().is_none());

        let failed: FetchState<i32> =
            FetchState::Failed(skycast_core::FetchError::Http(404).into());
        assert!(!failed.is_ready());
        assert!(failed.data().is_none());
        assert!(failed.error().is_some());
    }
}
