mod app;
mod config;
mod db_migrations;
mod db_sqlx;
mod routes;
mod state;
mod store;

extern crate self as sqlx;
pub use crate::db_sqlx::{PgPool, postgres, query, query_as, query_scalar};

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;
use crate::store::{MemoryStore, PostgresStore, VisitStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let template_path = config::index_template_path();
    let index_template = match tokio::fs::read_to_string(&template_path).await {
        Ok(template) => template,
        Err(e) => {
            tracing::error!(error = %e, path = %template_path.display(), "failed to load index template");
            return;
        }
    };

    let Some(store) = connect_store().await else {
        return;
    };
    tracing::info!(backend = store.backend(), "Visit store ready");

    let state = AppState::new(store, index_template);
    let static_dir = config::static_dir();
    let app = app::build_app(state, &static_dir);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!(static_dir = %static_dir.display(), "World map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

/// Postgres when `DATABASE_URL` is set, otherwise the in-memory store.
async fn connect_store() -> Option<VisitStore> {
    let Some(database_url) = config::database_url() else {
        tracing::warn!("DATABASE_URL is not set; visits are kept in memory and lost on restart");
        return Some(VisitStore::Memory(MemoryStore::new()));
    };

    let db_max_connections = config::db_max_connections();
    tracing::info!(db_max_connections, "Connecting to PostgreSQL...");
    let db = match PgPoolOptions::new()
        .max_connections(db_max_connections)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to PostgreSQL");
            return None;
        }
    };
    if let Err(e) = db_migrations::run(&db).await {
        tracing::error!(error = %e, "failed to run migrations");
        return None;
    }
    tracing::info!("Database connected and migrations applied");

    Some(VisitStore::Postgres(PostgresStore::new(db)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
