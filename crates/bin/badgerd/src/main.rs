//! # badgerd: badger event action daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and the remote API client
//! - Build the base executor and the event action engine
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use badger_adapter_http_axum::state::AppState;
use badger_adapter_storage_sqlite_sqlx::SqliteDatabaseRunner;
use badger_app::engine::EventActionEngine;
use badger_app::executor::Executor;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = badger_adapter_storage_sqlite_sqlx::Config {
        max_connections: config.database.max_connections,
        ..badger_adapter_storage_sqlite_sqlx::Config::new(config.database_url())
    }
    .build()
    .await?;
    let runner = SqliteDatabaseRunner::new(db.pool().clone())
        .with_commands(config.database.commands.clone());

    // Remote API
    let api = badger_adapter_http_reqwest::Config {
        base_url: config.api.base_url.clone(),
        api_key: config.api.api_key.clone(),
        timeout: config.api_timeout(),
    }
    .build()?;

    let bind_addr = config.bind_addr();

    // Engine
    let executor = Executor::new(runner, api);
    tracing::info!(
        rules = config.rules.len(),
        platform = %executor.platform(),
        "event actions loaded"
    );
    let engine = EventActionEngine::new(config.rules, executor);

    // HTTP
    let app = badger_adapter_http_axum::router::build(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "badgerd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("badgerd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
