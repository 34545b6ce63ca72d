//! Postgres pool construction and startup migrations.
//!
//! The pool only serves the read paths (listing queries and the health
//! probe); submission dispatch never touches the database. Listing rows
//! are written out of band by the inventory tooling, so the migrations
//! here own the schema but not the data.

use anyhow::{Context, Result};
use carbazar_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

/// Connect the listings pool and bring the schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = connect_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_seconds()))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_seconds()))
        .connect(config.database_url())
        .await
        .context("Failed to connect to the listings database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        acquire_timeout_s = config.db_timeout_seconds(),
        idle_timeout_s = config.db_idle_timeout_seconds(),
        "Listings database connected"
    );
    Ok(pool)
}

/// Apply pending migrations from the workspace-level migrations/ directory
/// (currently the car_listings schema).
async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;

    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(
        known_migrations = migrator.migrations.len(),
        "Schema migrations applied"
    );
    Ok(())
}
