//! Weather data model, unit conversion, and forecast retrieval for Skycast.
//!
//! Forecasts are ingested in SI units (Kelvin, m/s) and converted to the
//! user's measurement system at display time.

pub mod client;
pub mod convert;
pub mod location;
pub mod service;
pub mod types;

pub use client::WeatherClient;
pub use convert::convert;
pub use location::{Coordinates, FixedLocation, LocationProvider, NoLocation};
pub use service::WeatherService;
pub use types::*;
