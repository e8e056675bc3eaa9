use axum::{
    extract::{Request, State},
    http::{header::HOST, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use service::errors::ServiceError;
use service::tenant_config::{set_tenant_config, TENANT_CONFIG_HEADER};

use crate::observability::{REGISTRY_ERRORS_TOTAL, REQUESTS_TOTAL, TENANT_MISSES_TOTAL};
use crate::{gateway_error, GatewayState};

/// Domain part of the `Host` header, lower-cased and without a port.
pub fn host_domain(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(HOST)?.to_str().ok()?.trim();
    let domain = match host.strip_prefix('[') {
        // IPv6 literal, e.g. [::1]:8080
        Some(rest) => rest.split(']').next().unwrap_or_default(),
        None => host.split(':').next().unwrap_or_default(),
    };
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

/// Resolve the tenant for the request's host and attach its encoded
/// configuration. Any client-supplied configuration header is discarded.
pub async fn resolve_tenant(State(state): State<GatewayState>, mut req: Request, next: Next) -> Response {
    REQUESTS_TOTAL.inc();
    req.headers_mut().remove(TENANT_CONFIG_HEADER);

    let Some(domain) = host_domain(req.headers()) else {
        TENANT_MISSES_TOTAL.inc();
        return gateway_error(StatusCode::NOT_FOUND, "NotFound", "unknown domain");
    };

    let cfg = match state.registry.resolve_by_domain(&domain).await {
        Ok(cfg) => cfg,
        Err(ServiceError::NotFound(_)) => {
            TENANT_MISSES_TOTAL.inc();
            debug!(%domain, "tenant_not_found");
            return gateway_error(StatusCode::NOT_FOUND, "NotFound", "unknown domain");
        }
        Err(e) => {
            REGISTRY_ERRORS_TOTAL.inc();
            warn!(%domain, error = %e, "tenant_lookup_failed");
            return gateway_error(StatusCode::SERVICE_UNAVAILABLE, "StoreUnavailable", "tenant registry unavailable");
        }
    };

    if let Err(e) = set_tenant_config(req.headers_mut(), &cfg) {
        error!(tenant_id = %cfg.tenant_id, error = %e, "tenant_config_encode_failed");
        return gateway_error(StatusCode::INTERNAL_SERVER_ERROR, "EncodingError", "tenant configuration encode failed");
    }
    debug!(tenant_id = %cfg.tenant_id, %domain, "tenant_resolved");
    next.run(req).await
}
