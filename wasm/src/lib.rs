//! WebAssembly bindings for the Open For Takeout web client
//!
//! Provides client-side checks that mirror the API:
//! - Submission and correction form validation
//! - Which fields a correction would change
//! - Distance to a listing and whether it falls inside the search radius

use serde_json::Value;
use shared::{changed_fields, Business, Coordinate, Correction};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

const METERS_PER_MILE: f64 = 1_609.344;

fn parse_json(json: &str, what: &str) -> Result<Value, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn failures(
    json: &str,
    validate: fn(&Value) -> Result<(), ValidationErrors>,
) -> Result<Vec<&'static str>, String> {
    let payload = parse_json(json, "form")?;
    Ok(match validate(&payload) {
        Ok(()) => Vec::new(),
        Err(errors) => failed_fields(&errors),
    })
}

fn correction_change_names(
    business_json: &str,
    correction_json: &str,
) -> Result<Vec<&'static str>, String> {
    let business: Business = serde_json::from_str(business_json)
        .map_err(|e| format!("Invalid business JSON: {}", e))?;
    let correction: Correction = serde_json::from_str(correction_json)
        .map_err(|e| format!("Invalid correction JSON: {}", e))?;

    Ok(changed_fields(&business, &correction)
        .into_iter()
        .map(|field| field.name())
        .collect())
}

fn to_array(names: Vec<&'static str>) -> js_sys::Array {
    names.into_iter().map(JsValue::from_str).collect()
}

/// Names of the submission fields that fail validation; empty when the form is valid
#[wasm_bindgen]
pub fn failed_business_fields(form_json: &str) -> Result<js_sys::Array, JsValue> {
    failures(form_json, validate_business)
        .map(to_array)
        .map_err(|e| JsValue::from_str(&e))
}

/// Names of the correction fields that fail validation
#[wasm_bindgen]
pub fn failed_correction_fields(form_json: &str) -> Result<js_sys::Array, JsValue> {
    failures(form_json, validate_correction)
        .map(to_array)
        .map_err(|e| JsValue::from_str(&e))
}

/// Fields a correction would change on the listing, for the review preview
#[wasm_bindgen]
pub fn correction_changes(
    business_json: &str,
    correction_json: &str,
) -> Result<js_sys::Array, JsValue> {
    correction_change_names(business_json, correction_json)
        .map(to_array)
        .map_err(|e| JsValue::from_str(&e))
}

/// Great-circle distance between two points in miles
#[wasm_bindgen]
pub fn distance_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    Coordinate::new(lat1, lng1).distance_meters(&Coordinate::new(lat2, lng2)) / METERS_PER_MILE
}

/// Whether a listing at (lat2, lng2) would be found by a search centered on (lat1, lng1)
#[wasm_bindgen]
pub fn within_search_radius(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> bool {
    Coordinate::new(lat1, lng1).within_search_radius(&Coordinate::new(lat2, lng2))
}
