//! Business logic services for the takeout directory

pub mod admin;
pub mod approval;
pub mod business;
pub mod correction;
#[cfg(test)]
pub mod fakes;
pub mod geocoder;
pub mod notifier;

pub use admin::{AdminRepository, PgAdminRepository};
pub use approval::{ApprovalOutcome, ApprovalService};
pub use business::{BusinessRepository, BusinessService, PgBusinessRepository};
pub use correction::{CorrectionRepository, CorrectionService, PgCorrectionRepository};
pub use geocoder::{Geocoder, GeocodingProvider, PgZipcodeCache, ZipcodeCache};
pub use notifier::{LogNotifier, Notification, Notifier};
