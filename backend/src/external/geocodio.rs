//! Geocodio API client
//!
//! Forward geocoding of US addresses and postal codes.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::Coordinate;

use crate::services::geocoder::{AddressQuery, GeocodeError, GeocodingProvider};

/// Geocodio API client
#[derive(Clone)]
pub struct GeocodioClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Geocodio response for `/geocode`
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    location: GeocodeLocation,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    accuracy: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

impl GeocodioClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.geocod.io/v1.4".to_string())
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Best match of a decoded response; results come ordered by accuracy
    fn best_match(response: GeocodeResponse, query: &AddressQuery) -> Result<Coordinate, GeocodeError> {
        let best = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults {
                query: query.to_string(),
            })?;

        tracing::debug!(
            formatted_address = best.formatted_address.as_deref().unwrap_or(""),
            accuracy = best.accuracy.unwrap_or_default(),
            "Geocodio match"
        );

        Ok(Coordinate::new(best.location.lat, best.location.lng))
    }
}

#[async_trait]
impl GeocodingProvider for GeocodioClient {
    async fn geocode(&self, query: &AddressQuery) -> Result<Coordinate, GeocodeError> {
        let response = self
            .client
            .get(format!("{}/geocode", self.base_url))
            .query(&[
                ("street", query.street.as_str()),
                ("city", query.city.as_str()),
                ("state", query.state.as_str()),
                ("postal_code", query.zipcode.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        // Geocodio answers 422 for addresses it cannot parse at all
        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(GeocodeError::NoResults {
                query: query.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(GeocodeError::Provider {
                status: response.status().as_u16(),
            });
        }

        let data: GeocodeResponse = response.json().await?;
        Self::best_match(data, query)
    }
}
