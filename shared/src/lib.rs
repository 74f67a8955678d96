//! Shared types and models for the Open For Takeout directory
//!
//! This crate contains the listing and correction models, coordinate handling
//! and submission validation shared between the backend and the browser
//! (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
