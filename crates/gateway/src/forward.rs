use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::Response,
};
use tracing::{debug, warn};

use crate::observability::{UPSTREAM_DURATION, UPSTREAM_ERRORS_TOTAL};
use crate::{gateway_error, GatewayState};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// Connection-scoped headers that must not cross the proxy.
const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// Send the request to the backend and relay its response.
pub async fn forward(State(state): State<GatewayState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let url = format!("{}{}", state.upstream, path);

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            debug!(error = %e, "request_body_rejected");
            return gateway_error(StatusCode::PAYLOAD_TOO_LARGE, "InvalidArgument", "request body too large");
        }
    };

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    if let Some(host) = headers.remove(header::HOST) {
        headers.insert("x-forwarded-host", host);
    }
    headers.remove(header::CONTENT_LENGTH);

    let started = Instant::now();
    let sent = state.client.request(parts.method, &url).headers(headers).body(body).send().await;
    UPSTREAM_DURATION.observe(started.elapsed().as_secs_f64());

    let upstream = match sent {
        Ok(r) => r,
        Err(e) => {
            UPSTREAM_ERRORS_TOTAL.inc();
            warn!(error = %e, "upstream_request_failed");
            return gateway_error(StatusCode::BAD_GATEWAY, "UpstreamUnavailable", "upstream request failed");
        }
    };

    let status = upstream.status();
    let mut resp_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut resp_headers);
    resp_headers.remove(header::CONTENT_LENGTH);
    let bytes = match upstream.bytes().await {
        Ok(b) => b,
        Err(e) => {
            UPSTREAM_ERRORS_TOTAL.inc();
            warn!(error = %e, "upstream_body_failed");
            return gateway_error(StatusCode::BAD_GATEWAY, "UpstreamUnavailable", "upstream response failed");
        }
    };
    debug!(%status, "upstream_responded");

    let mut resp = Response::new(Body::from(bytes));
    *resp.status_mut() = status;
    *resp.headers_mut() = resp_headers;
    resp
}
