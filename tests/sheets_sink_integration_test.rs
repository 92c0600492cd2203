//! Google Sheets sink against a local stand-in for the OAuth and Sheets APIs

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use intake_server::config::{ServiceAccountCredentials, SheetsConfig};
use intake_server::error::IntakeError;
use intake_server::models::NormalizedRow;
use intake_server::server::{create_router, AppState};
use intake_server::services::output_selection::OutputSelector;
use intake_server::sink::{GoogleSheetsSink, RowSink};
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Clone, Default)]
struct MockGoogle {
    token_requests: Arc<AtomicUsize>,
    appends: Arc<Mutex<Vec<(String, String, HashMap<String, String>, Value)>>>,
    reject_appends: bool,
    reject_tokens: bool,
}

async fn token_endpoint(
    State(mock): State<MockGoogle>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    mock.token_requests.fetch_add(1, Ordering::SeqCst);

    if mock.reject_tokens {
        return (StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#).into_response();
    }

    assert_eq!(
        form.get("grant_type").map(String::as_str),
        Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
    );
    assert_eq!(form.get("assertion").map(|a| a.split('.').count()), Some(3));

    Json(json!({"access_token": "mock-token", "expires_in": 3600, "token_type": "Bearer"}))
        .into_response()
}

async fn append_endpoint(
    State(mock): State<MockGoogle>,
    Path((spreadsheet_id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if authorization != "Bearer mock-token" {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if mock.reject_appends {
        return (
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"status":"PERMISSION_DENIED"}}"#,
        )
            .into_response();
    }

    mock.appends
        .lock()
        .unwrap()
        .push((spreadsheet_id, range, query, body));

    Json(json!({
        "spreadsheetId": "sheet-1",
        "updates": {"updatedRange": "Sheet1!A2:J2", "updatedRows": 1}
    }))
    .into_response()
}

async fn start_mock(mock: MockGoogle) -> SocketAddr {
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .route(
            "/v4/spreadsheets/:spreadsheet_id/values/:range",
            post(append_endpoint),
        )
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn sheets_config(addr: SocketAddr) -> SheetsConfig {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
    let credentials = ServiceAccountCredentials {
        client_email: "intake@project.iam.gserviceaccount.com".to_string(),
        private_key: String::from_utf8(key.private_key_to_pem_pkcs8().unwrap()).unwrap(),
        token_uri: format!("http://{}/token", addr),
    };

    let mut config = SheetsConfig::new("sheet-1", credentials);
    config.api_base = format!("http://{}", addr);
    config
}

fn local_sink(addr: SocketAddr) -> GoogleSheetsSink {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    GoogleSheetsSink::with_client(sheets_config(addr), client).unwrap()
}

fn row(name: &str) -> NormalizedRow {
    NormalizedRow {
        timestamp: "10/19/2026, 9:00:00 AM".to_string(),
        name: name.to_string(),
        phone: "15551234567".to_string(),
        email: "a@gmail.com".to_string(),
        property_type: "2BHK".to_string(),
        area: "Indiranagar".to_string(),
        budget: "$2000000".to_string(),
        urgency: "soon".to_string(),
        notes: String::new(),
        raw_json: "{}".to_string(),
    }
}

#[tokio::test]
async fn test_appends_rows_and_reuses_token() {
    let mock = MockGoogle::default();
    let addr = start_mock(mock.clone()).await;
    let sink = local_sink(addr);

    sink.append(&row("first")).await.unwrap();
    sink.append(&row("second")).await.unwrap();

    assert_eq!(mock.token_requests.load(Ordering::SeqCst), 1);

    let appends = mock.appends.lock().unwrap();
    assert_eq!(appends.len(), 2);

    let (spreadsheet_id, range, query, body) = &appends[0];
    assert_eq!(spreadsheet_id, "sheet-1");
    assert_eq!(range, "Sheet1!A:J:append");
    assert_eq!(query.get("valueInputOption").map(String::as_str), Some("USER_ENTERED"));
    assert_eq!(body["values"][0].as_array().unwrap().len(), 10);
    assert_eq!(body["values"][0][1], "first");
    assert_eq!(appends[1].3["values"][0][1], "second");
}

#[tokio::test]
async fn test_rejected_append_reports_status_and_body() {
    let mock = MockGoogle {
        reject_appends: true,
        ..MockGoogle::default()
    };
    let addr = start_mock(mock.clone()).await;
    let sink = local_sink(addr);

    match sink.append(&row("denied")).await {
        Err(IntakeError::SinkRejected { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("PERMISSION_DENIED"));
        }
        other => panic!("expected SinkRejected, got {:?}", other),
    }
    assert!(mock.appends.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_failure_is_reported() {
    let mock = MockGoogle {
        reject_tokens: true,
        ..MockGoogle::default()
    };
    let addr = start_mock(mock.clone()).await;
    let sink = local_sink(addr);

    let result = sink.append(&row("no-token")).await;

    assert!(matches!(result, Err(IntakeError::TokenExchange(_))));
    assert!(mock.appends.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_to_sheet_end_to_end() {
    let mock = MockGoogle::default();
    let addr = start_mock(mock.clone()).await;

    let selector = OutputSelector::new(vec!["lead_intake".to_string()]);
    let app = create_router(AppState::new(Arc::new(local_sink(addr)), selector));

    let webhook = json!({
        "message": {
            "artifact": {
                "structuredOutputs": {
                    "a1": {"name": "lead_intake", "result": {"caller_name": "Neha", "budget": "45000"}}
                }
            }
        }
    });

    let response = app
        .oneshot(
            Request::post("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(webhook.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["status"], "success");

    let appends = mock.appends.lock().unwrap();
    assert_eq!(appends.len(), 1);

    let values = &appends[0].3["values"][0];
    assert_eq!(values[1], "Neha");
    assert_eq!(values[6], "$45,000");
    assert_eq!(values[9], r#"{"caller_name":"Neha","budget":"45000"}"#);
}
