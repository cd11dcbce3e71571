use axum::{
    extract::{MatchedPath, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info_span, Instrument};

/// Request span plus a completion log line carrying status and latency.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = header_value(request.headers(), "user-agent");
    let client_ip = header_value(request.headers(), "x-forwarded-for");
    let start_time = Instant::now();

    let span = info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        route = %route,
        request_id = %uuid::Uuid::now_v7(),
    );

    async move {
        let response = next.run(request).await;

        let latency_ms = start_time.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        if status >= 500 {
            tracing::error!(status, latency_ms, user_agent = ?user_agent, client_ip = ?client_ip, "request failed");
        } else {
            tracing::info!(status, latency_ms, user_agent = ?user_agent, client_ip = ?client_ip, "request completed");
        }

        response
    }
    .instrument(span)
    .await
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
