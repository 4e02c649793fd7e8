//! Read access to published catalog data and order placement.
//!
//! The storefront shares the `commerce` schema with the dashboard but only
//! ever sees a shop through its slug, and only published products of it.
//! Migrations are owned by the dashboard crate.

pub mod storefront;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use storefront::StorefrontRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Fewer units in stock than requested.
    #[error("insufficient stock for {product}: {available} available")]
    InsufficientStock {
        /// Product name
        product: String,
        /// Units currently in stock
        available: i32,
    },

    /// Order total does not fit the `NUMERIC(12, 2)` amount columns.
    #[error("order total exceeds the largest storable amount")]
    TotalTooLarge,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { index, source } => {
                Self::DataCorruption(format!("column {index}: {source}"))
            }
            sqlx::Error::Decode(source) => Self::DataCorruption(source.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
