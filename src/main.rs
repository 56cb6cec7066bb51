pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::{Config, StoreKind};
use repository::{MemoryTodoRepository, SledTodoRepository, TodoRepository, UnavailableRepository};
use routes::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` is optional
    dotenvy::dotenv().ok();

    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let state = AppState::new(open_repository(&config));
    let app = routes::router(state);

    // the listener comes up even when the store did not
    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {}", addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("received error from running server")?;
    Ok(())
}

fn open_repository(config: &Config) -> Arc<dyn TodoRepository> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, todos are lost on exit");
            Arc::new(MemoryTodoRepository::default())
        }
        StoreKind::Sled => match connect(config) {
            Ok(repo) => {
                tracing::info!("store connected");
                Arc::new(repo)
            }
            Err(err) => {
                tracing::error!("store connection failed: {:#}", err);
                Arc::new(UnavailableRepository::new(format!("{:#}", err)))
            }
        },
    }
}

fn connect(config: &Config) -> Result<SledTodoRepository> {
    let path = config
        .database_path
        .as_ref()
        .context("DATABASE_PATH is not set")?;
    SledTodoRepository::open(path)
}

// dropping the router on shutdown lets sled flush before exit
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        // never resolve, keep serving
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
