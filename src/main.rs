use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledger_api::config::{AppConfig, DEVELOPMENT_JWT_SECRET};
use ledger_api::database::{migrations, DatabaseManager, Repositories};
use ledger_api::{router, AppState};

#[derive(Parser)]
#[command(name = "ledger-server")]
#[command(about = "Ledger API server - personal income and expense tracking")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<ServerCommand>,
}

#[derive(Subcommand)]
enum ServerCommand {
    #[command(about = "Run the HTTP server (default)")]
    Serve,
    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ledger_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;

    match args.command.unwrap_or(ServerCommand::Serve) {
        ServerCommand::Serve => serve(config).await,
        ServerCommand::Migrate => migrate(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Ledger API in {:?} mode", config.environment);

    if config.security.jwt_secret == DEVELOPMENT_JWT_SECRET {
        tracing::warn!("Using the built-in development JWT secret; set JWT_SECRET for real deployments");
    }

    let repositories = match &config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                migrations::run_migrations(&pool).await?;
            }
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data is kept in memory and lost on exit");
            Repositories::in_memory()
        }
    };

    let bind_addr = config.bind_address();
    let state = AppState::new(config, repositories.clone())?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Ledger API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    repositories.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set to run migrations");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    migrations::run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
