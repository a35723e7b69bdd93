//! SQLite-backed preference storage with reactive reads.
//!
//! Two tables: `favorite` (city-keyed) and `settings` (single logical row
//! holding the measurement unit). Every mutation commits first, then
//! publishes the complete post-write snapshot on a `tokio::sync::watch`
//! channel; snapshots identical to the previous emission are suppressed.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::watch;

use skycast_core::error::{RusqliteErrorExt, StorageError};
use skycast_core::MeasurementUnit;

use crate::models::{FavoriteLocation, UnitPreference};

/// Durable store for favorite cities and the unit preference.
///
/// Reads come in two forms: point-in-time snapshots (`favorites`,
/// `unit_preference`) and live subscriptions (`subscribe_favorites`,
/// `subscribe_unit`). Each subscription is an independent
/// `watch::Receiver`; dropping it cancels delivery and releases the
/// underlying watch slot.
pub struct PreferenceStore {
    conn: Mutex<Connection>,
    favorites_tx: watch::Sender<Vec<FavoriteLocation>>,
    unit_tx: watch::Sender<UnitPreference>,
}

impl PreferenceStore {
    /// Open or create the database at the given path.
    ///
    /// # Errors
    ///
    /// Fails with `StorageError::Open` when the file cannot be opened or the
    /// schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn =
            Connection::open(path).map_err(|e| StorageError::Open(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Open the database at the platform-default location.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = default_db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Open(e.to_string()))?;
        }
        Self::open(path)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Open(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        Self::init_schema(&conn)?;

        let favorites = Self::read_favorites(&conn)?;
        let unit = Self::read_unit(&conn)?;
        let (favorites_tx, _) = watch::channel(favorites);
        let (unit_tx, _) = watch::channel(unit);

        Ok(Self {
            conn: Mutex::new(conn),
            favorites_tx,
            unit_tx,
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorite (
                city TEXT PRIMARY KEY,
                country TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                unit TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StorageError::Open(e.to_string()))
    }

    // =========== Favorites ===========

    /// Current favorites, in insertion order.
    pub fn favorites(&self) -> Result<Vec<FavoriteLocation>, StorageError> {
        let conn = self.conn.lock();
        Self::read_favorites(&conn)
    }

    /// Live favorites snapshots.
    ///
    /// The receiver starts at the current snapshot; each subsequent change
    /// delivers the full post-write set. Consecutive identical snapshots
    /// are not re-delivered.
    pub fn subscribe_favorites(&self) -> watch::Receiver<Vec<FavoriteLocation>> {
        self.favorites_tx.subscribe()
    }

    /// Save a favorite, replacing any existing row with the same city.
    pub fn add_favorite(&self, favorite: &FavoriteLocation) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO favorite (city, country) VALUES (?1, ?2)
             ON CONFLICT(city) DO UPDATE SET country = excluded.country",
            params![favorite.city, favorite.country],
        )
        .map_err(|e| e.into_storage_error())?;

        tracing::debug!("Saved favorite: {}", favorite.city);
        self.publish_favorites(&conn)
    }

    /// Delete a favorite by city key. Deleting a missing key is success.
    pub fn remove_favorite(&self, city: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        let removed = conn
            .execute("DELETE FROM favorite WHERE city = ?1", params![city])
            .map_err(|e| e.into_storage_error())?;

        if removed > 0 {
            tracing::debug!("Removed favorite: {}", city);
        }
        self.publish_favorites(&conn)
    }

    /// Delete all favorites.
    pub fn remove_all_favorites(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM favorite", [])
            .map_err(|e| e.into_storage_error())?;

        tracing::debug!("Cleared favorites");
        self.publish_favorites(&conn)
    }

    // =========== Unit preference ===========

    /// Current unit preference; Metric when none has been stored yet.
    pub fn unit_preference(&self) -> Result<UnitPreference, StorageError> {
        let conn = self.conn.lock();
        Self::read_unit(&conn)
    }

    /// Live unit-preference values, with the same snapshot-and-suppression
    /// contract as `subscribe_favorites`.
    pub fn subscribe_unit(&self) -> watch::Receiver<UnitPreference> {
        self.unit_tx.subscribe()
    }

    /// Replace the stored preference.
    ///
    /// Any existing row is cleared in the same transaction as the insert,
    /// keeping "at most one logical preference" true under failure.
    pub fn set_unit_preference(&self, unit: MeasurementUnit) -> Result<(), StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| e.into_storage_error())?;
        tx.execute("DELETE FROM settings", [])
            .map_err(|e| e.into_storage_error())?;
        tx.execute(
            "INSERT INTO settings (id, unit) VALUES (1, ?1)",
            params![unit.as_str()],
        )
        .map_err(|e| e.into_storage_error())?;
        tx.commit().map_err(|e| e.into_storage_error())?;

        tracing::debug!("Unit preference set to {}", unit);
        self.publish_unit(&conn)
    }

    // =========== Internals ===========

    fn read_favorites(conn: &Connection) -> Result<Vec<FavoriteLocation>, StorageError> {
        let mut stmt = conn
            .prepare("SELECT city, country FROM favorite ORDER BY rowid")
            .map_err(|e| e.into_storage_error())?;

        let rows = stmt
            .query_map([], |row| {
                Ok(FavoriteLocation {
                    city: row.get(0)?,
                    country: row.get(1)?,
                })
            })
            .map_err(|e| e.into_storage_error())?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.into_storage_error())
    }

    fn read_unit(conn: &Connection) -> Result<UnitPreference, StorageError> {
        let stored: Option<String> = conn
            .query_row("SELECT unit FROM settings WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(|e| e.into_storage_error())?;

        let unit = match stored.as_deref() {
            None | Some("metric") => MeasurementUnit::Metric,
            Some("imperial") => MeasurementUnit::Imperial,
            Some(other) => {
                tracing::warn!("Unknown unit '{}' in settings, defaulting to metric", other);
                MeasurementUnit::Metric
            }
        };

        Ok(UnitPreference { unit })
    }

    // Snapshots are read and published while still holding the connection
    // lock, so emissions arrive in write order and never expose a torn state.

    fn publish_favorites(&self, conn: &Connection) -> Result<(), StorageError> {
        let snapshot = Self::read_favorites(conn)?;
        self.favorites_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        Ok(())
    }

    fn publish_unit(&self, conn: &Connection) -> Result<(), StorageError> {
        let snapshot = Self::read_unit(conn)?;
        self.unit_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        Ok(())
    }

    /// Number of rows in the settings table.
    #[cfg(test)]
    fn settings_rows(&self) -> usize {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM settings", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .unwrap_or(0)
    }
}

/// Default database path following platform conventions.
pub fn default_db_path() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("skycast")
        .join("preferences.db")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn create_test_store() -> PreferenceStore {
        PreferenceStore::in_memory().expect("Failed to create in-memory store")
    }

    fn paris() -> FavoriteLocation {
        FavoriteLocation::new("Paris", "France")
    }

    #[test]
    fn test_add_and_list_favorite() {
        let store = create_test_store();

        store.add_favorite(&paris()).unwrap();
        let favorites = store.favorites().unwrap();

        assert_eq!(favorites, vec![paris()]);
    }

    #[test]
    fn test_add_favorite_upserts_by_city() {
        let store = create_test_store();

        store.add_favorite(&paris()).unwrap();
        store
            .add_favorite(&FavoriteLocation::new("Paris", "FR"))
            .unwrap();

        let favorites = store.favorites().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].country, "FR");
    }

    #[test]
    fn test_favorites_keep_insertion_order() {
        let store = create_test_store();

        store.add_favorite(&FavoriteLocation::new("Oslo", "NO")).unwrap();
        store.add_favorite(&FavoriteLocation::new("Lima", "PE")).unwrap();
        store.add_favorite(&FavoriteLocation::new("Accra", "GH")).unwrap();

        let cities: Vec<_> = store
            .favorites()
            .unwrap()
            .into_iter()
            .map(|f| f.city)
            .collect();
        assert_eq!(cities, vec!["Oslo", "Lima", "Accra"]);
    }

    #[test]
    fn test_remove_favorite() {
        let store = create_test_store();

        store.add_favorite(&paris()).unwrap();
        store.add_favorite(&FavoriteLocation::new("Oslo", "NO")).unwrap();

        store.remove_favorite("Paris").unwrap();
        let favorites = store.favorites().unwrap();

        assert_eq!(favorites, vec![FavoriteLocation::new("Oslo", "NO")]);
    }

    #[test]
    fn test_remove_missing_favorite_is_success() {
        let store = create_test_store();
        store.add_favorite(&paris()).unwrap();

        let mut rx = store.subscribe_favorites();
        rx.borrow_and_update();

        store.remove_favorite("Atlantis").unwrap();

        assert_eq!(store.favorites().unwrap(), vec![paris()]);
        // No change, no emission.
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_remove_all_favorites() {
        let store = create_test_store();

        store.add_favorite(&paris()).unwrap();
        store.add_favorite(&FavoriteLocation::new("Oslo", "NO")).unwrap();
        store.remove_all_favorites().unwrap();

        assert!(store.favorites().unwrap().is_empty());
    }

    #[test]
    fn test_subscription_sees_post_write_snapshot() {
        let store = create_test_store();
        let mut rx = store.subscribe_favorites();

        assert!(rx.borrow_and_update().is_empty());

        store.add_favorite(&paris()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), vec![paris()]);

        store.remove_favorite("Paris").unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_identical_snapshot_is_suppressed() {
        let store = create_test_store();
        store.add_favorite(&paris()).unwrap();

        let mut rx = store.subscribe_favorites();
        rx.borrow_and_update();

        // Upsert of an identical row leaves the snapshot unchanged.
        store.add_favorite(&paris()).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_subscribers_are_independent() {
        let store = create_test_store();
        let mut first = store.subscribe_favorites();
        let mut second = store.subscribe_favorites();
        first.borrow_and_update();
        second.borrow_and_update();

        store.add_favorite(&paris()).unwrap();

        assert!(first.has_changed().unwrap());
        assert!(second.has_changed().unwrap());

        // One subscriber consuming the update does not affect the other.
        first.borrow_and_update();
        assert!(!first.has_changed().unwrap());
        assert!(second.has_changed().unwrap());
    }

    #[test]
    fn test_dropped_subscriber_does_not_block_writes() {
        let store = create_test_store();
        let rx = store.subscribe_favorites();
        drop(rx);

        store.add_favorite(&paris()).unwrap();
        assert_eq!(store.favorites().unwrap(), vec![paris()]);
    }

    #[test]
    fn test_unit_defaults_to_metric() {
        let store = create_test_store();
        assert_eq!(
            store.unit_preference().unwrap().unit,
            MeasurementUnit::Metric
        );
    }

    #[test]
    fn test_set_unit_replaces_single_row() {
        let store = create_test_store();

        store.set_unit_preference(MeasurementUnit::Metric).unwrap();
        store.set_unit_preference(MeasurementUnit::Imperial).unwrap();

        assert_eq!(
            store.unit_preference().unwrap().unit,
            MeasurementUnit::Imperial
        );
        assert_eq!(store.settings_rows(), 1);
    }

    #[test]
    fn test_unit_subscription_and_suppression() {
        let store = create_test_store();
        let mut rx = store.subscribe_unit();
        rx.borrow_and_update();

        store.set_unit_preference(MeasurementUnit::Imperial).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().unit, MeasurementUnit::Imperial);

        // Re-writing the same value is not re-delivered.
        store.set_unit_preference(MeasurementUnit::Imperial).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.db");

        {
            let store = PreferenceStore::open(&path).unwrap();
            store.add_favorite(&paris()).unwrap();
            store.set_unit_preference(MeasurementUnit::Imperial).unwrap();
        }

        let store = PreferenceStore::open(&path).unwrap();
        assert_eq!(store.favorites().unwrap(), vec![paris()]);
        assert_eq!(
            store.unit_preference().unwrap().unit,
            MeasurementUnit::Imperial
        );

        // A fresh subscription starts at the persisted snapshot.
        let rx = store.subscribe_favorites();
        assert_eq!(*rx.borrow(), vec![paris()]);
    }
}
