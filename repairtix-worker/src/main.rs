//! # RepairTix Billing Worker
//!
//! Entry point: loads configuration, connects to PostgreSQL, runs
//! migrations, and drives the billing scheduler until SIGINT.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p repairtix-worker
//! ```

use repairtix_shared::crypto::CredentialCipher;
use repairtix_shared::db::{migrations::run_migrations, pool};
use repairtix_worker::{config::WorkerConfig, scheduler::BillingScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repairtix_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "RepairTix Billing Worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = WorkerConfig::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database_url.clone(),
        ..Default::default()
    })
    .await?;

    // The worker can come up first in a fresh environment, so it runs
    // migrations too; sqlx makes this idempotent across both binaries
    run_migrations(&db).await?;

    let cipher = CredentialCipher::from_hex_key(&config.credential_key)
        .map_err(|e| anyhow::anyhow!("Invalid CREDENTIAL_KEY: {}", e))?;

    let scheduler = BillingScheduler::with_config(
        db,
        cipher,
        repairtix_worker::scheduler::SchedulerConfig {
            poll_interval_secs: config.poll_interval_seconds,
            batch_size: config.batch_size,
            ..Default::default()
        },
    );

    let shutdown_token = scheduler.shutdown_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received, exiting...");
        shutdown_token.cancel();
    });

    scheduler.run().await?;

    Ok(())
}
