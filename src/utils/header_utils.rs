use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
};
use std::net::{IpAddr, SocketAddr};

/// Extract API key from HTTP headers
///
/// Checked in order: `X-API-Key`, `Authorization: Bearer <key>`, then
/// `X-Vapi-Secret` (the header the voice assistant sends its server secret in).
///
/// # Examples
///
/// ```
/// use axum::http::HeaderMap;
/// use intake_server::utils::header_utils::extract_api_key;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-api-key", "my-secret-key".parse().unwrap());
/// assert_eq!(extract_api_key(&headers), Some("my-secret-key".to_string()));
/// ```
pub fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get("x-api-key") {
        if let Ok(key_str) = key.to_str() {
            return Some(key_str.to_string());
        }
    }

    if let Some(auth) = headers.get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(stripped) = auth_str.strip_prefix("Bearer ") {
                return Some(stripped.to_string());
            }
        }
    }

    if let Some(secret) = headers.get("x-vapi-secret") {
        if let Ok(secret_str) = secret.to_str() {
            return Some(secret_str.to_string());
        }
    }

    None
}

/// Best-effort client address for access logs
///
/// Proxy headers win over the socket address, which is only present when the
/// server was started with connect info.
pub fn extract_client_ip(req: &Request) -> Option<IpAddr> {
    let headers = req.headers();

    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .and_then(|first| first.trim().parse().ok())
        {
            return Some(ip);
        }
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
    {
        return Some(ip);
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
