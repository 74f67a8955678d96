//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fixed search radius for proximity queries: 30 miles in meters
pub const SEARCH_RADIUS_METERS: f64 = 48_280.32;

/// Mean earth radius used for great-circle distances
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A geocoded latitude/longitude pair (WGS 84)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Failure to read a coordinate back from its stored text form
#[derive(Debug, Error, PartialEq)]
pub enum WktError {
    #[error("expected a POINT, got {0:?}")]
    NotAPoint(String),

    #[error("expected two ordinates in {0:?}")]
    Arity(String),

    #[error("invalid ordinate {0:?}")]
    Ordinate(String),
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Well-known text for this coordinate. WKT is x/y ordered, so longitude comes first.
    ///
    /// `f64`'s `Display` emits the shortest representation that parses back to
    /// the same bits, so `from_wkt(to_wkt())` is lossless.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.lng, self.lat)
    }

    /// Parse `POINT(lng lat)` as read back from the store. An EWKT `SRID=...;` prefix is tolerated.
    pub fn from_wkt(text: &str) -> Result<Self, WktError> {
        let text = text.trim();
        let text = match text.split_once(';') {
            Some((srid, rest)) if srid.trim_start().to_ascii_uppercase().starts_with("SRID=") => {
                rest.trim()
            }
            _ => text,
        };

        let body = text
            .strip_prefix("POINT")
            .or_else(|| text.strip_prefix("point"))
            .map(str::trim)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| WktError::NotAPoint(text.to_string()))?;

        let mut ordinates = body.split_whitespace();
        let (lng, lat) = match (ordinates.next(), ordinates.next(), ordinates.next()) {
            (Some(lng), Some(lat), None) => (lng, lat),
            _ => return Err(WktError::Arity(body.to_string())),
        };

        let lng = lng
            .parse::<f64>()
            .map_err(|_| WktError::Ordinate(lng.to_string()))?;
        let lat = lat
            .parse::<f64>()
            .map_err(|_| WktError::Ordinate(lat.to_string()))?;

        Ok(Self { lat, lng })
    }

    /// Great-circle (haversine) distance in meters
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }

    /// Whether `other` falls inside the directory's search radius
    pub fn within_search_radius(&self, other: &Coordinate) -> bool {
        self.distance_meters(other) <= SEARCH_RADIUS_METERS
    }

    /// Both ordinates finite and inside WGS 84 bounds
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}
