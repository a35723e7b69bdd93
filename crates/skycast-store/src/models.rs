use serde::{Deserialize, Serialize};

use skycast_core::MeasurementUnit;

/// A city saved by the user for quick lookup.
///
/// `city` is the unique key; re-adding an existing city replaces its row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub city: String,
    pub country: String,
}

impl FavoriteLocation {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }
}

/// The active measurement system.
///
/// At most one logical row is persisted; writes replace rather than merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPreference {
    pub unit: MeasurementUnit,
}

impl From<MeasurementUnit> for UnitPreference {
    fn from(unit: MeasurementUnit) -> Self {
        Self { unit }
    }
}
