//! PostgreSQL access for the BookBase catalog.
//!
//! Pool setup, migrations, the `books` row model, the repository that renders
//! query descriptors into bound SQL, and the [`store::PgBookStore`] adapter
//! used by the CSV importer.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
///
/// `acquire_timeout` bounds how long a request waits for a free connection
/// before failing with [`sqlx::Error::PoolTimedOut`].
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
