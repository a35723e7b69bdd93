//! Centralized error types for the Skycast library suite.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// All errors in the Skycast crates should be convertible to this type.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.user_message(),
            AppError::Conversion(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Errors from the remote weather API boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: status {0}")]
    Http(u16),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Unable to connect. Check your internet connection.",
            FetchError::Http(status) if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            FetchError::Http(404) => "City not found. Check the name and try again.",
            FetchError::Http(401) => "Weather API key is invalid. Check settings.",
            FetchError::Http(_) => "The weather request failed. Please try again.",
            FetchError::Decode(_) => "Received an unexpected response. Please try again.",
        }
    }
}

/// Errors from the unit conversion engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("forecast has no entries")]
    EmptyForecast,
}

impl ConversionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConversionError::EmptyForecast => "No forecast data available yet.",
        }
    }
}

/// Local storage errors (SQLite favorites/settings tables).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage open failed: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Open(_) => "Unable to access local data. Try restarting the app.",
            StorageError::Query(_) => "A data operation failed. Please try again.",
            StorageError::Constraint(_) => "Saved data conflicts with this change.",
        }
    }
}

/// Device location capability errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service unavailable")]
    ServiceUnavailable,

    #[error("Location request timed out")]
    Timeout,
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Location permission is required for local weather.",
            LocationError::ServiceUnavailable => "Location is unavailable. Showing your city instead.",
            LocationError::Timeout => "Finding your location took too long. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_fetch_error(self) -> FetchError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_fetch_error(self) -> FetchError {
        if self.is_decode() {
            FetchError::Decode(self.to_string())
        } else if let Some(status) = self.status() {
            FetchError::Http(status.as_u16())
        } else {
            FetchError::Network(self.to_string())
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_storage_error(self) -> StorageError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_storage_error(self) -> StorageError {
        match &self {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Constraint(self.to_string())
            }
            _ => StorageError::Query(self.to_string()),
        }
    }
}
