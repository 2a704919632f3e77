//! Fleetup CLI - Fleet management API server
//!
//! Runs the multi-tenant API server against a PostgreSQL (or SQLite)
//! database, with schema migrations applied on demand.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleetup_api::{ApiServer, ApiServerConfig};

/// Fleetup - Multi-tenant fleet management backend
#[derive(Parser, Debug)]
#[command(name = "fleetup")]
#[command(about = "Fleetup - Multi-tenant fleet management backend")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the API server
    #[command(long_about = r#"
Run the Fleetup API server.

EXAMPLES:
  # Local development against SQLite
  fleetup serve --database-url "sqlite://fleetup.db?mode=rwc" \
    --jwt-secret dev-secret --allow-signup

  # Production
  fleetup serve --bind 0.0.0.0:8080 \
    --database-url $DATABASE_URL \
    --jwt-secret $FLEETUP_JWT_SECRET \
    --secure-cookies

ENVIRONMENT VARIABLES:
  FLEETUP_BIND          Address to bind
  FLEETUP_DATABASE_URL  Database connection URL
  FLEETUP_JWT_SECRET    HS256 secret for session tokens
    "#)]
    Serve {
        /// Address to bind the API server
        #[arg(long, env = "FLEETUP_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Database connection URL
        #[arg(long, env = "FLEETUP_DATABASE_URL")]
        database_url: String,

        /// HS256 secret for session and impersonation tokens
        #[arg(long, env = "FLEETUP_JWT_SECRET")]
        jwt_secret: String,

        /// Enable self-service signup
        #[arg(long)]
        allow_signup: bool,

        /// Mark cookies Secure (serve behind TLS)
        #[arg(long)]
        secure_cookies: bool,

        /// Disable CORS (enabled by default for development)
        #[arg(long)]
        no_cors: bool,

        /// Skip running migrations on startup
        #[arg(long)]
        skip_migrations: bool,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Database connection URL
        #[arg(long, env = "FLEETUP_DATABASE_URL")]
        database_url: String,
    },
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            bind,
            database_url,
            jwt_secret,
            allow_signup,
            secure_cookies,
            no_cors,
            skip_migrations,
        } => {
            let db = fleetup_db::connect(&database_url)
                .await
                .context("Failed to connect to database")?;

            if skip_migrations {
                info!("Skipping migrations");
            } else {
                fleetup_db::migrate(&db)
                    .await
                    .context("Failed to run migrations")?;
                info!("Migrations applied");
            }

            let config = ApiServerConfig {
                bind_addr: bind,
                enable_cors: !no_cors,
                jwt_secret,
                allow_signup,
                secure_cookies,
            };

            ApiServer::new(config, db).start().await
        }

        Commands::Migrate { database_url } => {
            let db = fleetup_db::connect(&database_url)
                .await
                .context("Failed to connect to database")?;

            fleetup_db::migrate(&db)
                .await
                .context("Failed to run migrations")?;

            info!("Migrations applied");
            Ok(())
        }
    }
}
