use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{middleware, routing::get, Json, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use common::types::Health;
use configs::AppConfig;
use service::tenant_service::{SeaOrmTenantRegistry, StaticTenantRegistry, TenantRegistry};

use crate::{forward, observability, tenant, GatewayState};

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// `/healthz` and `/metrics` are answered locally; everything else goes
/// through tenant resolution and is forwarded.
pub fn build_router(state: GatewayState) -> Router {
    let proxied = Router::new()
        .fallback(forward::forward)
        .layer(middleware::from_fn_with_state(state.clone(), tenant::resolve_tenant))
        .with_state(state);

    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(|| async { observability::encode_metrics() }))
        .fallback_service(proxied)
        .layer(
            TraceLayer::new_for_http()
                // 不记录请求头：其中包含租户配置
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

async fn build_registry(cfg: &AppConfig) -> anyhow::Result<Arc<dyn TenantRegistry>> {
    if !cfg.gateway.tenants.is_empty() {
        let registry = StaticTenantRegistry::from_config(&cfg.gateway.tenants)?;
        info!(tenants = registry.len(), "using static tenant registry");
        return Ok(Arc::new(registry));
    }
    let db = models::db::connect_with_config(&cfg.database).await?;
    info!("using database tenant registry");
    Ok(Arc::new(SeaOrmTenantRegistry { db }))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received, draining connections");
    }
}

/// Load configuration, build the registry and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate()?;
    let registry = build_registry(&cfg).await?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.gateway.upstream_timeout_secs))
        .build()?;
    let state = GatewayState { registry, client, upstream: Arc::from(cfg.gateway.upstream.as_str()) };

    let addr: SocketAddr = format!("{}:{}", cfg.gateway.host, cfg.gateway.port).parse()?;
    info!(%addr, upstream = %cfg.gateway.upstream, "gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
