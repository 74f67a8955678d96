//! External API integrations

pub mod geocodio;
pub mod slack;

pub use geocodio::GeocodioClient;
pub use slack::SlackWebhookClient;
