//! Address and zipcode geocoding
//!
//! Zipcode lookups consult the `zipcodes` centroid table first and only fall
//! back to the external provider on a miss. The table is filled by the
//! `seed-zipcodes` binary; provider results are never written back.

use async_trait::async_trait;
use shared::{Coordinate, ZipcodeEntry};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::error::AppResult;

/// Failure of the external geocoding provider
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no geocoder results for {query:?}")]
    NoResults { query: String },

    #[error("geocoder returned HTTP {status}")]
    Provider { status: u16 },

    #[error("geocoder request failed: {0}")]
    Transport(reqwest::Error),
}

// Request URLs carry the api key in their query string
impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Transport(err.without_url())
    }
}

/// Address components sent to the provider; any of them may be blank
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressQuery {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl AddressQuery {
    pub fn new(street: &str, city: &str, state: &str, zipcode: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zipcode: zipcode.to_string(),
        }
    }

    /// A query carrying only a postal code
    pub fn zipcode_only(zipcode: &str) -> Self {
        Self::new("", "", "", zipcode)
    }
}

impl std::fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state, &self.zipcode]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// External address → coordinate lookup
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Best match for `query`; zero matches is `GeocodeError::NoResults`
    async fn geocode(&self, query: &AddressQuery) -> Result<Coordinate, GeocodeError>;
}

/// Precomputed zipcode centroids
#[async_trait]
pub trait ZipcodeCache: Send + Sync {
    /// Exact-match lookup
    async fn lookup(&self, zipcode: &str) -> AppResult<Option<Coordinate>>;
}

/// Resolves addresses and zipcodes to coordinates
#[derive(Clone)]
pub struct Geocoder {
    provider: Arc<dyn GeocodingProvider>,
    cache: Arc<dyn ZipcodeCache>,
}

impl Geocoder {
    pub fn new(provider: Arc<dyn GeocodingProvider>, cache: Arc<dyn ZipcodeCache>) -> Self {
        Self { provider, cache }
    }

    /// Geocode a street address through the external provider
    pub async fn resolve_address(
        &self,
        street: &str,
        city: &str,
        state: &str,
        zipcode: &str,
    ) -> AppResult<Coordinate> {
        let query = AddressQuery::new(street, city, state, zipcode);
        let coordinate = self.provider.geocode(&query).await?;
        tracing::debug!(query = %query, %coordinate, "Geocoded address");
        Ok(coordinate)
    }

    /// Centroid of `zipcode`, from the cache when possible
    pub async fn resolve_zipcode(&self, zipcode: &str) -> AppResult<Coordinate> {
        if let Some(coordinate) = self.cache.lookup(zipcode).await? {
            return Ok(coordinate);
        }

        tracing::info!(zipcode, "Zipcode not cached, geocoding");
        self.resolve_address("", "", "", zipcode).await
    }
}

/// `zipcodes` table backed cache
#[derive(Clone)]
pub struct PgZipcodeCache {
    db: PgPool,
}

impl PgZipcodeCache {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert or replace a centroid. Used by the seeding tool only.
    pub async fn upsert(&self, entry: &ZipcodeEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO zipcodes (zipcode, lat, lng)
            VALUES ($1, $2, $3)
            ON CONFLICT (zipcode) DO UPDATE SET lat = EXCLUDED.lat, lng = EXCLUDED.lng
            "#,
        )
        .bind(&entry.zipcode)
        .bind(entry.lat)
        .bind(entry.lng)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM zipcodes")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl ZipcodeCache for PgZipcodeCache {
    async fn lookup(&self, zipcode: &str) -> AppResult<Option<Coordinate>> {
        let row = sqlx::query_as::<_, (f64, f64)>("SELECT lat, lng FROM zipcodes WHERE zipcode = $1")
            .bind(zipcode)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|(lat, lng)| Coordinate::new(lat, lng)))
    }
}
