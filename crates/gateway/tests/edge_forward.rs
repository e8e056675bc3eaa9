use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use gateway::{build_router, GatewayState};
use service::errors::ServiceError;
use service::tenant_config::{tenant_config_from_headers, TenantConfiguration, TENANT_CONFIG_HEADER};
use service::tenant_service::{StaticTenantRegistry, TenantRegistry};

// Backend stand-in: reports what it received.
async fn echo(headers: HeaderMap, uri: axum::http::Uri) -> Json<Value> {
    let cfg = tenant_config_from_headers(&headers).ok();
    Json(json!({
        "app_name": cfg.as_ref().map(|c| c.app_name.clone()),
        "api_key": cfg.as_ref().map(|c| c.api_key.clone()),
        "path": uri.to_string(),
        "forwarded_host": headers.get("x-forwarded-host").and_then(|v| v.to_str().ok()),
    }))
}

async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn demo_registry() -> Arc<dyn TenantRegistry> {
    let cfg = TenantConfiguration { app_name: "demo".into(), api_key: "k-demo".into(), ..Default::default() };
    Arc::new(StaticTenantRegistry::default().with_tenant("demo.example.com", cfg))
}

fn app(registry: Arc<dyn TenantRegistry>, upstream: &str) -> Router {
    build_router(GatewayState { registry, client: reqwest::Client::new(), upstream: Arc::from(upstream) })
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn forwards_with_tenant_config_attached() {
    let upstream = spawn_upstream().await;
    let req = Request::builder()
        .uri("/auth/login?x=1")
        .method("POST")
        .header("host", "Demo.Example.com:6188")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app(demo_registry(), &upstream).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["app_name"], "demo");
    assert_eq!(v["path"], "/auth/login?x=1");
    assert_eq!(v["forwarded_host"], "Demo.Example.com:6188");
}

#[tokio::test]
async fn client_supplied_config_header_is_replaced() {
    let upstream = spawn_upstream().await;
    let forged = TenantConfiguration { app_name: "forged".into(), api_key: "attacker".into(), ..Default::default() };
    let mut headers = HeaderMap::new();
    service::tenant_config::set_tenant_config(&mut headers, &forged).unwrap();

    let req = Request::builder()
        .uri("/")
        .header("host", "demo.example.com")
        .header(TENANT_CONFIG_HEADER, headers.get(TENANT_CONFIG_HEADER).unwrap().clone())
        .body(Body::empty())
        .unwrap();
    let resp = app(demo_registry(), &upstream).oneshot(req).await.unwrap();
    let v = body_json(resp).await;
    assert_eq!(v["app_name"], "demo");
    assert_eq!(v["api_key"], "k-demo");
}

#[tokio::test]
async fn unknown_domain_is_404() {
    let req = Request::builder().uri("/").header("host", "nope.example.com").body(Body::empty()).unwrap();
    let resp = app(demo_registry(), "http://127.0.0.1:1").oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["name"], "NotFound");
}

struct DownRegistry;

#[async_trait]
impl TenantRegistry for DownRegistry {
    async fn resolve_by_domain(&self, _domain: &str) -> Result<TenantConfiguration, ServiceError> {
        Err(ServiceError::StoreUnavailable("pool timed out".into()))
    }
}

#[tokio::test]
async fn registry_failure_is_503() {
    let req = Request::builder().uri("/").header("host", "demo.example.com").body(Body::empty()).unwrap();
    let resp = app(Arc::new(DownRegistry), "http://127.0.0.1:1").oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unreachable_upstream_is_502() {
    let req = Request::builder().uri("/").header("host", "demo.example.com").body(Body::empty()).unwrap();
    let resp = app(demo_registry(), "http://127.0.0.1:1").oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_and_metrics_skip_tenant_resolution() {
    let router = app(demo_registry(), "http://127.0.0.1:1");
    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");

    let resp = router.oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
