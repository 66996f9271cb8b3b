/// Worker configuration from environment variables
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `CREDENTIAL_KEY`: 64 hex chars; AES-256 key for integration
///   credentials (required, same key as the API server)
/// - `BILLING_POLL_INTERVAL_SECONDS`: How often to scan for due
///   subscriptions (default: 3600)
/// - `BILLING_BATCH_SIZE`: Max subscriptions charged per cycle
///   (default: 100)

use std::env;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Credential encryption key (64 hex chars)
    pub credential_key: String,

    /// Seconds between billing scans
    pub poll_interval_seconds: u64,

    /// Max due subscriptions processed per cycle
    pub batch_size: i64,
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let credential_key = env::var("CREDENTIAL_KEY")
            .map_err(|_| anyhow::anyhow!("CREDENTIAL_KEY environment variable is required"))?;

        if credential_key.len() != 64 {
            anyhow::bail!("CREDENTIAL_KEY must be 64 hex characters (32 bytes)");
        }

        let poll_interval_seconds = env::var("BILLING_POLL_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()?;

        let batch_size = env::var("BILLING_BATCH_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<i64>()?;

        Ok(Self {
            database_url,
            credential_key,
            poll_interval_seconds,
            batch_size,
        })
    }
}
