//! syncsrv entry point
//!
//! Loads configuration, initializes logging and the configuration store,
//! then serves the sync API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use common::sqlite::SqliteClient;
use syncsrv::app_state::AppState;
use syncsrv::config::SyncSrvConfig;
use syncsrv::erp::HttpErpClient;
use syncsrv::error::{Result, SyncSrvError};
use syncsrv::routes::create_router;
use syncsrv::store::ConfigStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "syncsrv - ERP sync configuration service")]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and connectivity, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = SyncSrvConfig::load(args.config.as_deref())?;

    common::logging::init(&config.log.level)
        .map_err(|e| SyncSrvError::ConfigError(format!("logging init failed: {}", e)))?;

    match args.command {
        Some(Commands::Check) => check(config).await,
        None => run(config).await,
    }
}

/// Validate configuration and database access without serving
async fn check(config: SyncSrvConfig) -> Result<()> {
    match config.validate() {
        Ok(()) => info!("Configuration valid"),
        Err(e) => {
            warn!("Configuration problem: {}", e);
            return Err(e);
        }
    }

    let sqlite = SqliteClient::new(&config.database.path)
        .await
        .map_err(|e| SyncSrvError::DatabaseError(e.to_string()));
    match sqlite {
        Ok(client) => {
            client
                .ping()
                .await
                .map_err(|e| SyncSrvError::DatabaseError(e.to_string()))?;
            info!("Database reachable at {}", client.path());
        }
        Err(e) => return Err(e),
    }

    info!("Check passed");
    Ok(())
}

/// Run the service
async fn run(config: SyncSrvConfig) -> Result<()> {
    info!("Starting syncsrv v{}", env!("CARGO_PKG_VERSION"));

    // Credential problems surface here at startup rather than on the first
    // scan request
    if let Err(e) = config.validate() {
        warn!("{} - scans will fail until configuration is fixed", e);
    }

    let sqlite_client = SqliteClient::new(&config.database.path)
        .await
        .map_err(|e| SyncSrvError::DatabaseError(e.to_string()))?;

    ConfigStore::new(sqlite_client.pool().clone())
        .init_schema()
        .await?;

    let erp = Arc::new(
        HttpErpClient::new(&config.erp)
            .map_err(|e| SyncSrvError::ConfigError(e.to_string()))?,
    );

    let config = Arc::new(config);
    let state = Arc::new(AppState::new(Arc::clone(&config), sqlite_client, erp));
    let app = create_router(state);

    let addr = format!("{}:{}", config.api.host, config.api.port);
    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| SyncSrvError::InternalError(format!("server error: {}", e)))?;

    Ok(())
}
