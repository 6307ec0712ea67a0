use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use job_tracker_api::app::{app, AppState};
use job_tracker_api::config::{self, StorageBackend};
use job_tracker_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use job_tracker_api::is_production;

#[derive(Parser)]
#[command(name = "job-tracker-api")]
#[command(about = "Job application tracker backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Override the configured port")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_filter)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            info!("Migrations applied");
            Ok(())
        }
        Commands::Serve { port } => serve(port).await,
    }
}

async fn serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Job Tracker API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let store: Arc<dyn Store> = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            if is_production!() {
                warn!("Using the in-memory store in production; data is lost on restart");
            }
            Arc::new(MemoryStore::new())
        }
    };

    let router = app(AppState::from_config(store, config));

    let port = port_override.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("Job Tracker API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
