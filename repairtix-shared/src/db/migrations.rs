/// Database migration runner
///
/// Migrations are plain SQL files in the `migrations/` directory of this
/// crate, named `{version}_{name}.sql`, and are applied sequentially at
/// startup by both the API server and the billing worker.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// sqlx tracks applied versions in the `_sqlx_migrations` table, so calling
/// this on every startup is idempotent.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or a migration fails
/// to execute. A failed migration is rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
