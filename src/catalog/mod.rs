//! Location catalog
//!
//! A small SQLite-backed set of curated coordinates. It is written once,
//! by [`LocationCatalog::seed`] during startup, and only read afterwards,
//! so SQLite's own locking is all the coordination it needs.

use std::path::Path;

use rand::RngExt;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info, instrument, trace};

use crate::GeoScanError;
use crate::models::{Coordinate, LocationRecord, NewLocation};

pub mod curated;

pub use curated::{curated_locations, load_seed_file};

const SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS places (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lat REAL NOT NULL,
    lng REAL NOT NULL,
    description TEXT
)"#;

/// What a call to [`LocationCatalog::seed`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The catalog was empty and this many records were inserted
    Seeded(u64),
    /// The catalog already held this many records; nothing was written
    AlreadyPopulated(u64),
}

/// Handle to the catalog store. Cheap to clone.
#[derive(Clone, Debug)]
pub struct LocationCatalog {
    pool: SqlitePool,
}

impl LocationCatalog {
    /// Open (creating if needed) the catalog database file
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, GeoScanError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// A private in-memory catalog, gone when the handle is dropped
    pub async fn in_memory() -> Result<Self, GeoScanError> {
        // every sqlite::memory: connection is its own database, so the
        // pool must keep exactly one connection alive
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, making sure the schema exists
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, GeoScanError> {
        trace!("Ensuring catalog schema");
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Insert `records` as one batch if, and only if, the catalog is empty.
    ///
    /// Seeding a populated catalog is a no-op, so this is safe to run on
    /// every start.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn seed(&self, records: &[NewLocation]) -> Result<SeedOutcome, GeoScanError> {
        for record in records {
            Coordinate::new(record.latitude, record.longitude)?;
        }

        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM places")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            debug!(existing, "Catalog already populated, skipping seed");
            return Ok(SeedOutcome::AlreadyPopulated(existing.unsigned_abs()));
        }

        let mut inserted = 0;
        for record in records {
            inserted += sqlx::query("INSERT INTO places (lat, lng, description) VALUES (?, ?, ?)")
                .bind(record.latitude)
                .bind(record.longitude)
                .bind(&record.description)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        info!("Catalog initialized with {inserted} curated locations");
        Ok(SeedOutcome::Seeded(inserted))
    }

    /// Pick one record uniformly at random, `None` if the catalog is empty.
    ///
    /// Draws a row index in `0..count` and reads that row in id order, both
    /// inside one transaction, so every stored record has the same chance
    /// no matter how its id was assigned.
    pub async fn pick_random(&self) -> Result<Option<LocationRecord>, GeoScanError> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM places")
            .fetch_one(&mut *tx)
            .await?;
        if count == 0 {
            return Ok(None);
        }

        let offset = rand::rng().random_range(0..count);
        let record = sqlx::query_as::<_, LocationRecord>(
            "SELECT id, lat, lng, description FROM places ORDER BY id LIMIT 1 OFFSET ?",
        )
        .bind(offset)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(record)
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<i64, GeoScanError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM places")
            .fetch_one(&self.pool)
            .await?)
    }

    /// All records in id order
    #[cfg(test)]
    pub async fn list(&self) -> Result<Vec<LocationRecord>, GeoScanError> {
        Ok(sqlx::query_as::<_, LocationRecord>(
            "SELECT id, lat, lng, description FROM places ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
