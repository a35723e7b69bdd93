//! Local persistence for Skycast: favorite cities and the measurement-unit
//! preference, with live-updating reads for the presentation layer.

pub mod models;
pub mod store;

pub use models::{FavoriteLocation, UnitPreference};
pub use store::{default_db_path, PreferenceStore};
