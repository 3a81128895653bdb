//! Keyq Broker - Main Entry Point
//! Composition root: config, logging, backend selection, JSON-RPC gateway

mod settings;
mod telemetry;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

// Import workspace crates
use settings::{Backend, DaemonConfig, LogFormat};
use keyq_api_rpc::{RpcServer, RpcServerConfig};
use keyq_core::port::Broker;
use keyq_core::QueueStore;
use keyq_infra_sqlite::{create_pool, run_migrations, sqlite_queue_store};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(config: &DaemonConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("keyq=info"))
        .context("Failed to create env filter")?;

    let otel = telemetry::otel_layer::<Registry>(&config.name)?;

    match config.log_format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(otel)
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(otel)
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Directory that must exist before SQLite can create the database file
fn database_dir(database_url: &str) -> Option<&Path> {
    if database_url.contains(":memory:") {
        return None;
    }

    let file = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let file = file.split('?').next().unwrap_or(file);

    Path::new(file)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

async fn build_broker(config: &DaemonConfig) -> Result<Arc<dyn Broker>> {
    match config.backend {
        Backend::Memory => {
            info!("Using in-memory backend (nothing survives a restart)");
            Ok(Arc::new(QueueStore::in_memory()))
        }
        Backend::Sqlite => {
            info!(database_url = %config.database_url, "Initializing database...");

            if let Some(parent) = database_dir(&config.database_url) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            let pool = create_pool(&config.database_url)
                .await
                .context("DB pool creation failed")?;
            run_migrations(&pool).await.context("Migration failed")?;

            Ok(Arc::new(sqlite_queue_store(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::load().context("Failed to load configuration")?;

    // 2. Initialize logging
    init_logging(&config)?;
    telemetry::report_status();

    info!(name = %config.name, "Keyq broker v{} starting...", VERSION);

    // 3. Storage backend + queue store
    let broker = build_broker(&config).await?;
    broker.ping().await.context("Storage health check failed")?;

    // 4. Start JSON-RPC gateway
    let rpc_config = RpcServerConfig {
        host: config.host.clone(),
        port: config.port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, broker)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
