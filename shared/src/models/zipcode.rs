//! Zipcode centroid cache entries

use serde::{Deserialize, Serialize};

use crate::types::Coordinate;

/// Precomputed centroid of a postal code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZipcodeEntry {
    pub zipcode: String,
    pub lat: f64,
    pub lng: f64,
}

impl ZipcodeEntry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}
