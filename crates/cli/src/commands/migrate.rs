//! Database migration command.
//!
//! Migrations live in `crates/dashboard/migrations/` and are embedded in
//! the dashboard library; both binaries share the resulting schema.

use super::{CommandError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    converty_dashboard::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
