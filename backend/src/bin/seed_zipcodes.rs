//! Load zipcode centroids into the geocoding cache
//!
//! Usage: `seed-zipcodes <file.csv>` where the CSV has a `zipcode,lat,lng` header.

use anyhow::Context;
use shared::ZipcodeEntry;
use sqlx::postgres::PgPoolOptions;

use openfortakeout_api::{services::PgZipcodeCache, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_zipcodes=info,sqlx=warn".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: seed-zipcodes <file.csv>")?;
    let config = Config::load()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    let cache = PgZipcodeCache::new(db_pool);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("failed to open {}", path))?;

    let mut loaded = 0usize;
    for (line, record) in reader.deserialize::<ZipcodeEntry>().enumerate() {
        let entry = record.with_context(|| format!("invalid row {} in {}", line + 2, path))?;
        if !entry.coordinate().is_valid() {
            tracing::warn!(zipcode = %entry.zipcode, "Skipping out-of-range centroid");
            continue;
        }
        cache.upsert(&entry).await?;
        loaded += 1;
    }

    tracing::info!(loaded, total = cache.count().await?, "Zipcode cache seeded");
    Ok(())
}
