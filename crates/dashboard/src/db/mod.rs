//! Database operations for the merchant dashboard.
//!
//! # Schema: `commerce`
//!
//! ## Tables
//!
//! - `merchant_user` - Merchant accounts (email + argon2 password hash)
//! - `shop` - One shop per merchant; settings, theme and pixel id
//! - `category` - Product categories
//! - `product` / `product_image` - Catalog and gallery images
//! - `customer_order` / `order_item` - Cash-on-delivery orders
//! - `team_member` - Team invitations
//! - `subscription` / `billing_event` - Plan and billing history
//!
//! Every query that reads or writes tenant data takes a [`ShopId`] resolved
//! from the session, so one merchant can never address another shop's rows.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p converty-cli -- migrate
//! ```
//!
//! [`ShopId`]: converty_core::ShopId

pub mod billing;
pub mod categories;
pub mod orders;
pub mod products;
pub mod shops;
pub mod team;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use billing::BillingRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use shops::ShopRepository;
pub use team::TeamRepository;
pub use users::{NewMerchant, UserRepository};

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Not enough stock to fulfil an order line.
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
            // A stored value no longer satisfies its domain type's rules.
            sqlx::Error::ColumnDecode { index, source } => {
                Self::DataCorruption(format!("column {index}: {source}"))
            }
            sqlx::Error::Decode(source) => Self::DataCorruption(source.to_string()),
            other => Self::Database(other),
        }
    }
}

impl RepositoryError {
    /// Map a unique-constraint violation to [`RepositoryError::Conflict`].
    ///
    /// Any other error is passed through as [`RepositoryError::Database`].
    pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_string());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_data_corruption() {
        let err = RepositoryError::from(sqlx::Error::ColumnDecode {
            index: "email".to_string(),
            source: "invalid email: missing @".into(),
        });
        assert!(matches!(err, RepositoryError::DataCorruption(msg) if msg.contains("email")));

        let err = RepositoryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[test]
    fn test_conflict_passes_through_other_errors() {
        let err = RepositoryError::conflict_on_unique(sqlx::Error::PoolTimedOut, "dup");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::PoolTimedOut)));
    }
}
