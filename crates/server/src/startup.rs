use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::principal::CredentialHasher;
use service::userverify::LogCodeSender;

use crate::errors::StartupError;
use crate::routes;
use crate::session::AnonymousSessions;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Shared state from validated configuration. The database must already
/// be migrated.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    let hasher = CredentialHasher::from_config(&cfg.hashing)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    Ok(AppState {
        db,
        hasher,
        sessions: Arc::new(AnonymousSessions),
        code_sender: Arc::new(LogCodeSender),
        request_timeout: Duration::from_secs(cfg.server.request_timeout_secs),
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received, draining connections");
    }
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let state = build_state(&cfg).await?;

    let app: Router = routes::build_router(state, build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
