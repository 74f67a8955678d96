//! Domain models for the takeout directory

pub mod admin;
pub mod business;
pub mod correction;
pub mod zipcode;

pub use admin::*;
pub use business::*;
pub use correction::*;
pub use zipcode::*;
