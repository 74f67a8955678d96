//! Request middleware

pub mod auth;

pub use auth::{admin_middleware, AdminUser, CurrentAdmin, IdentityVerifier, JwtIdentityVerifier};
