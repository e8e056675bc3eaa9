pub mod admin;
pub mod auth;
pub mod verify;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::authz::{deny_disabled_user, deny_no_access_key, require_authenticated, require_master_key, AllOf};
use service::errors::ServiceError;

use crate::access::{authorize, tenant_context};
use crate::errors::ApiError;
use crate::observability::encode_metrics;
use crate::state::AppState;

/// Body parse failures are reported like any other invalid argument.
pub(crate) fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError(ServiceError::invalid_argument(rejection.body_text()))
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    encode_metrics()
}

/// Any valid key: signup, login.
pub fn public_chain() -> AllOf {
    AllOf::new().with(deny_no_access_key)
}

/// Valid key plus an enabled, signed-in user.
pub fn user_chain() -> AllOf {
    AllOf::new()
        .with(deny_no_access_key)
        .with(require_authenticated)
        .with(deny_disabled_user)
}

pub fn master_chain() -> AllOf {
    AllOf::new().with(require_master_key)
}

fn guarded(path: &str, handler: MethodRouter<AppState>, chain: AllOf) -> Router<AppState> {
    Router::new()
        .route(path, handler)
        .route_layer(middleware::from_fn_with_state(Arc::new(chain), authorize))
}

/// Build the full application router: health and metrics plus tenant-scoped
/// routes, each behind its own policy chain.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics));

    // 租户路由：先解码租户配置并构建 AccessContext，再按路由执行策略链
    let tenant_scoped = Router::new()
        .merge(guarded("/auth/signup", post(auth::signup), public_chain()))
        .merge(guarded("/auth/login", post(auth::login), public_chain()))
        .merge(guarded("/auth/change_password", post(auth::change_password), user_chain()))
        .merge(guarded("/verify_request", post(verify::verify_request), user_chain()))
        .merge(guarded("/verify_request/test", post(verify::verify_request_test), master_chain()))
        .merge(guarded("/admin/principals/by_email", post(admin::principals_by_email), master_chain()))
        .layer(middleware::from_fn_with_state(state.clone(), tenant_context));

    public
        .merge(tenant_scoped)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                // 请求到达时打点
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
