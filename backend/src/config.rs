//! Configuration management for the takeout directory API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with OFT_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Log output format: "pretty" or "json"
    pub log_format: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Geocodio API configuration
    pub geocodio: GeocodioConfig,

    /// Slack notification and approval configuration
    pub slack: SlackConfig,

    /// Admin identity token configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL (with PostGIS) connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodioConfig {
    /// Geocodio API key
    pub api_key: String,

    /// API base URL, overridable for testing
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    /// Incoming webhook that receives submission notifications
    pub webhook_url: String,

    /// Signing secret for interactive action callbacks
    pub signing_secret: String,

    /// Only accept actions from this team, when set
    pub team_id: Option<String>,

    /// Only accept actions from this channel, when set
    pub channel_id: Option<String>,

    /// Maximum accepted age of a signed request, in seconds
    pub max_request_age_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret used to verify identity tokens
    pub jwt_secret: String,

    /// Expected token issuer, when set
    pub issuer: Option<String>,

    /// Expected token audience, when set
    pub audience: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("OFT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("log_format", "pretty")?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("geocodio.base_url", "https://api.geocod.io/v1.4")?
            .set_default("slack.max_request_age_secs", 300)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (OFT_ prefix)
            .add_source(
                Environment::with_prefix("OFT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
