use axum::{
    body::Bytes,
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::auth::ApiKeys;
use crate::config::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{IntakeError, Result};
use crate::logging::{access_log_middleware, request_id_middleware, AccessLogSettings};
use crate::models::{HealthResponse, WebhookResponse};
use crate::services::intake::process_payload;
use crate::services::output_selection::OutputSelector;
use crate::sink::RowSink;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn RowSink>,
    pub api_keys: ApiKeys,
    pub selector: OutputSelector,
    pub request_timeout: Duration,
    pub slow_request_threshold: Duration,
    /// Rows appended since startup
    pub rows_appended: Arc<AtomicU64>,
}

impl AppState {
    /// State with auth disabled and default timeouts
    pub fn new(sink: Arc<dyn RowSink>, selector: OutputSelector) -> Self {
        Self {
            sink,
            api_keys: ApiKeys::empty(),
            selector,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            slow_request_threshold: Duration::from_secs(5),
            rows_appended: Arc::default(),
        }
    }

    pub fn with_api_keys(mut self, api_keys: ApiKeys) -> Self {
        self.api_keys = api_keys;
        self
    }
}

// HTTP Handlers

/// Normalize an end-of-call webhook and append it as one row
async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| IntakeError::InvalidPayload(e.to_string()))?;

    let row = process_payload(&payload, &state.selector)?;

    // Field lengths only; the values are caller contact data
    tracing::debug!(
        field_lengths = ?row.fields().map(str::len),
        "Normalized row"
    );

    state.sink.append(&row).await?;

    let total = state.rows_appended.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!(
        sink = %state.sink.describe(),
        rows_appended = total,
        "Appended intake row"
    );

    Ok(Json(WebhookResponse::success()))
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP server router
pub fn create_router(state: AppState) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let access_log = AccessLogSettings {
        slow_request_threshold: state.slow_request_threshold,
    };
    let request_timeout = state.request_timeout;
    let api_keys = state.api_keys.clone();

    let webhook_routes = Router::new()
        .route("/webhook", post(receive_webhook))
        .route_layer(middleware::from_fn_with_state(
            api_keys,
            crate::auth::auth_middleware,
        ));

    Router::new()
        .merge(webhook_routes)
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn_with_state(access_log, access_log_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}
