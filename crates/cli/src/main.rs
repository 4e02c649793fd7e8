//! Converty CLI - database migrations and merchant management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! converty migrate
//!
//! # Create a merchant and their shop
//! converty merchant create -e owner@example.com -p 'secret123' -s "Corner Shop"
//!
//! # Reset a merchant's password
//! converty merchant set-password -e owner@example.com -p 'new-secret'
//!
//! # Create the demo merchants with catalog and orders
//! converty seed
//! ```
//!
//! All commands read `DASHBOARD_DATABASE_URL`, falling back to `DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "converty")]
#[command(author, version, about = "Converty CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage merchant accounts
    Merchant {
        #[command(subcommand)]
        action: MerchantAction,
    },
    /// Create demo merchants, catalogs and orders (safe to re-run)
    Seed,
}

#[derive(Subcommand)]
enum MerchantAction {
    /// Create a merchant with their shop and a free subscription
    Create {
        /// Merchant email address
        #[arg(short, long)]
        email: String,

        /// Initial password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Shop display name
        #[arg(short, long)]
        shop: String,

        /// Shop URL slug (derived from the shop name when omitted)
        #[arg(long)]
        slug: Option<String>,
    },
    /// Replace a merchant's password
    SetPassword {
        /// Merchant email address
        #[arg(short, long)]
        email: String,

        /// New password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "converty=info,converty_dashboard=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Merchant { action } => match action {
            MerchantAction::Create {
                email,
                password,
                shop,
                slug,
            } => {
                commands::merchant::create(&email, &password, &shop, slug.as_deref()).await?;
            }
            MerchantAction::SetPassword { email, password } => {
                commands::merchant::set_password(&email, &password).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
