use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, warn};

use common::utils::mask::mask_secret;
use service::authz::{enforce, AccessContext, AccessKeyClass, AllOf};
use service::errors::ServiceError;
use service::tenant_config::tenant_config_from_headers;

use crate::errors::ApiError;
use crate::observability::{POLICY_DENIALS_TOTAL, TENANT_DECODE_FAILURES_TOTAL};
use crate::state::{AppState, TenantContext};

/// Header carrying the client's API or master key.
pub const API_KEY_HEADER: &str = "x-gatekeep-api-key";

/// Decode the tenant configuration set by the gateway, classify the
/// presented key and resolve the session. Both results go into request
/// extensions for the policy layer and the handlers.
pub async fn tenant_context(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    let cfg = tenant_config_from_headers(req.headers()).map_err(|e| {
        TENANT_DECODE_FAILURES_TOTAL.inc();
        warn!(error = %e, "tenant_config_decode_failed");
        e
    })?;

    let presented = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let class = AccessKeyClass::classify(presented, &cfg);
    let masked = presented.map(mask_secret).unwrap_or_default();

    let (parts, body) = req.into_parts();
    let session = state.sessions.resolve(&parts, &cfg).await?;
    let mut ctx = AccessContext::new(class);
    if let Some(user) = session {
        ctx = ctx.with_user(user.user_id, user.disabled);
    }
    debug!(
        tenant_id = %cfg.tenant_id,
        access_key = ?class,
        presented = %masked,
        authenticated = ctx.is_authenticated(),
        "access_context_built"
    );

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(TenantContext(Arc::new(cfg)));
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

// Method, uri and headers only; policies never read extensions or body.
fn request_head(req: &Request) -> Parts {
    let mut head = Request::new(());
    *head.method_mut() = req.method().clone();
    *head.uri_mut() = req.uri().clone();
    *head.version_mut() = req.version();
    *head.headers_mut() = req.headers().clone();
    head.into_parts().0
}

/// Per-route policy layer: runs the rest of the stack only if `chain` passes.
pub async fn authorize(State(chain): State<Arc<AllOf>>, req: Request, next: Next) -> Result<Response, ApiError> {
    // a request that skipped tenant_context gets the most restrictive context
    let ctx = req.extensions().get::<AccessContext>().cloned().unwrap_or_default();
    let head = request_head(&req);

    let outcome = enforce(chain.as_ref(), &head, &ctx, || async move { Ok(next.run(req).await) }).await;
    if let Err(ServiceError::AuthorizationDenied(reason)) = &outcome {
        POLICY_DENIALS_TOTAL.inc();
        info!(path = %head.uri.path(), reason = %reason, "policy_denied");
    }
    Ok(outcome?)
}
