//! Device location capability.
//!
//! Platform integrations (GPS, geolocation portals) implement
//! `LocationProvider` in the presentation layer. The library never blocks on
//! a missing capability: any error means "fall back to city lookup."

use async_trait::async_trait;

use skycast_core::LocationError;

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Capability for resolving the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// Provider returning a fixed position. Useful for tests and kiosk setups.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Provider for platforms without a location service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_fixed_location_yields_coordinates() {
        let provider = FixedLocation(Coordinates { latitude: 43.65, longitude: -79.38 });
        let position = provider.current_location().await.unwrap();
        assert_eq!(position.latitude, 43.65);
        assert_eq!(position.longitude, -79.38);
    }

    #[tokio::test]
    async fn test_no_location_is_unavailable() {
        let provider = NoLocation;
        assert_eq!(
            provider.current_location().await.unwrap_err(),
            LocationError::ServiceUnavailable
        );
    }
}
