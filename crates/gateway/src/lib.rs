pub mod observability;
pub mod tenant;
pub mod forward;
pub mod bootstrap;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use service::tenant_service::TenantRegistry;

/// Shared state of the edge router.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<dyn TenantRegistry>,
    pub client: reqwest::Client,
    /// Backend base URL without a trailing slash.
    pub upstream: Arc<str>,
}

pub(crate) fn gateway_error(status: StatusCode, name: &str, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": { "name": name, "message": message } }))).into_response()
}

pub use bootstrap::{build_router, run};
