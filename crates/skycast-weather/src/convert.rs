//! Unit conversion for display.
//!
//! Forecasts arrive in SI units (Kelvin, m/s). Conversion is pure and
//! per-entry; it never mutates its input and never touches storage. Always
//! convert from the freshly fetched SI forecast — feeding an already
//! converted forecast back in produces garbage values.

use skycast_core::{ConversionError, MeasurementUnit};

use crate::types::{ForecastEntry, Temperature, WeatherForecast};

const KELVIN_OFFSET: f64 = 273.15;
const MS_TO_KMH: f64 = 3.6;
const MS_TO_MPH: f64 = 2.236_94;

/// Convert an SI-unit forecast into display values for `unit`.
///
/// Metric yields Celsius and km/h, Imperial yields Fahrenheit and mph.
/// Wind speed is rounded to the nearest whole number (half away from zero);
/// temperatures are left unrounded for the display layer to format.
///
/// # Errors
///
/// Returns `ConversionError::EmptyForecast` when there are no entries, so
/// the caller renders an empty state instead of stale data.
pub fn convert(
    forecast: &WeatherForecast,
    unit: MeasurementUnit,
) -> Result<WeatherForecast, ConversionError> {
    if forecast.entries.is_empty() {
        return Err(ConversionError::EmptyForecast);
    }

    let entries = forecast
        .entries
        .iter()
        .map(|entry| convert_entry(entry, unit))
        .collect();

    Ok(WeatherForecast {
        city: forecast.city.clone(),
        entries,
    })
}

fn convert_entry(entry: &ForecastEntry, unit: MeasurementUnit) -> ForecastEntry {
    ForecastEntry {
        temperature: Temperature {
            day: convert_temperature(entry.temperature.day, unit),
            min: convert_temperature(entry.temperature.min, unit),
            max: convert_temperature(entry.temperature.max, unit),
            night: convert_temperature(entry.temperature.night, unit),
            eve: convert_temperature(entry.temperature.eve, unit),
            morn: convert_temperature(entry.temperature.morn, unit),
        },
        feels_like_day: convert_temperature(entry.feels_like_day, unit),
        wind_speed: convert_wind_speed(entry.wind_speed, unit),
        ..entry.clone()
    }
}

fn convert_temperature(kelvin: f64, unit: MeasurementUnit) -> f64 {
    let celsius = kelvin - KELVIN_OFFSET;
    match unit {
        MeasurementUnit::Metric => celsius,
        MeasurementUnit::Imperial => celsius * 9.0 / 5.0 + 32.0,
    }
}

fn convert_wind_speed(meters_per_second: f64, unit: MeasurementUnit) -> f64 {
    let factor = match unit {
        MeasurementUnit::Metric => MS_TO_KMH,
        MeasurementUnit::Imperial => MS_TO_MPH,
    };
    (meters_per_second * factor).round()
}
