//! Subcommand implementations.

pub mod merchant;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use converty_dashboard::db::{self, RepositoryError};
use converty_dashboard::services::AuthError;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Bad command-line input.
    #[error("{0}")]
    Invalid(String),
}

/// Connect to the dashboard database named by the environment.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DASHBOARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DASHBOARD_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
