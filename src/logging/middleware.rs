use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::utils::header_utils::{extract_api_key, extract_client_ip};

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request ID wrapper for tracking requests through the system
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Settings the access log middleware needs per request
#[derive(Clone, Copy, Debug)]
pub struct AccessLogSettings {
    pub slow_request_threshold: Duration,
}

/// Middleware to generate unique request IDs for correlation
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// First 8 hex chars of the key's md5, so keys can be told apart without being logged
pub fn hash_api_key(key: &str) -> String {
    format!("{:x}", md5::compute(key.as_bytes()))
        .chars()
        .take(8)
        .collect()
}

/// Middleware to log every HTTP request to the access log
pub async fn access_log_middleware(
    State(settings): State<AccessLogSettings>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let client_ip = extract_client_ip(&req)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let api_key_hash = extract_api_key(req.headers()).map(|key| hash_api_key(&key));

    let response = next.run(req).await;

    let status = response.status();
    let duration = start.elapsed();

    tracing::info!(
        target: "access_log",
        request_id = %request_id,
        client_ip = %client_ip,
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        user_agent = %user_agent,
        api_key_hash = ?api_key_hash,
        "HTTP request completed"
    );

    if duration > settings.slow_request_threshold {
        tracing::warn!(
            request_id = %request_id,
            path = %path,
            duration_ms = duration.as_millis() as u64,
            threshold_ms = settings.slow_request_threshold.as_millis() as u64,
            "Slow request detected"
        );
    }

    response
}
