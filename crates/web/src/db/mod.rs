//! Database operations for the Pur Beurre `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `app_user` - Site accounts (username, email)
//! - `user_password` - Argon2id password hashes, one per account
//! - `product` - Food products imported from the product catalogue
//! - `favorite` - (user, product) bookmarks, unique per pair
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/`, embedded in the binary
//! through [`MIGRATOR`] and applied at startup unless
//! `PURBEURRE_RUN_MIGRATIONS=false`.

pub mod favorites;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use favorites::FavoriteRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options()
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool that only connects on first use.
///
/// Used by tests that exercise routes which never reach the database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options()
        .min_connections(0)
        .connect_lazy(database_url.expose_secret())
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history diverges.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
///
/// The conflict message is the name of the violated constraint so callers
/// can tell, say, a taken username from a taken email.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(db_err.constraint().unwrap_or("unique").to_owned());
    }
    RepositoryError::Database(e)
}
