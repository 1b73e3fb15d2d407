/// Database migration runner
///
/// Runs the SQL migrations embedded from this crate's `migrations/`
/// directory using sqlx's migration system. Migrations are applied once and
/// recorded in the `_sqlx_migrations` table; re-running is a no-op.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration file is malformed, a migration fails to
/// execute, or the connection is lost mid-run. Failed migrations are rolled
/// back where Postgres allows it.
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

/// Creates the database if it doesn't exist
///
/// Useful for development and testing; in production the database should
/// already exist.
///
/// # Errors
///
/// Returns an error if the server is unreachable or the caller lacks the
/// privilege to create databases.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
