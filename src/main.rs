//! Agro Matchmaker — HTTP service binary.
//!
//! ## Environment variables
//!
//! | Variable              | Required | Description                              |
//! |------------------------|----------|-------------------------------------------|
//! | `DATABASE_URL`         | Yes      | PostgreSQL connection string               |
//! | `JWT_SIGNING_SECRET`   | Prod     | HS256 secret used to verify bearer tokens  |
//! | `BIND_ADDRESS`         | No       | Listen address (default: `0.0.0.0:8080`)   |
//! | `RUN_MODE`             | No       | `development` (default) or `production`    |

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use agro_matchmaker::config::ServiceConfig;
use agro_matchmaker::state::AppState;
use agro_matchmaker::{api, db};

#[derive(Parser, Debug)]
#[command(name = "agro-matchmaker", about = "Agro Matchmaker decision-support service")]
struct CliArgs {
    /// PostgreSQL connection URL (overrides DATABASE_URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Bind address (overrides BIND_ADDRESS)
    #[arg(long)]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,agro_matchmaker=debug")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = ServiceConfig::from_env()?;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    if let Some(bind_address) = args.bind_address {
        config.bind_address = bind_address;
    }

    info!(bind = %config.bind_address, "Starting Agro Matchmaker");

    let pool = db::create_pool(&config.database_url).await?;

    let state = Arc::new(AppState { db: pool, config });

    let app = api::build_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&state.config.bind_address).await?;
    info!(address = %state.config.bind_address, "Agro Matchmaker listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Agro Matchmaker shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
