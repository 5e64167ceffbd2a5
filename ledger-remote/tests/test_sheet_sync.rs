mod common;

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use common::MockServer;
use ledger_core::{Category, Expense};
use ledger_remote::{RemoteError, ScriptConfig, SheetClient};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

/// Apps Script stand-in: records every body and answers success.
async fn recording_server() -> (MockServer, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/exec",
            post(|State(seen): State<Seen>, headers: HeaderMap, body: String| async move {
                let ct = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                seen.lock().unwrap().push((ct, serde_json::from_str(&body).unwrap()));
                Json(json!({"status": "success"}))
            }),
        )
        .with_state(seen.clone());
    (MockServer::start(app).await, seen)
}

fn expense(id: &str, amount: f64) -> Expense {
    Expense {
        id: id.to_string(),
        date: "2024-06-01".to_string(),
        amount,
        category: Category::Food,
        description: "coffee".to_string(),
        merchant: "星巴克".to_string(),
    }
}

#[tokio::test]
async fn test_check_connection_ok() {
    let (server, seen) = recording_server().await;
    SheetClient::new()
        .check_connection(&format!("{}/exec", server.url()))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "text/plain;charset=utf-8");
    assert_eq!(seen[0].1, json!({"action": "test"}));
}

#[tokio::test]
async fn test_append_posts_expenses() {
    let (server, seen) = recording_server().await;
    let config = ScriptConfig::new(format!("{}/exec", server.url()));
    SheetClient::new()
        .append(&config, &[expense("a", 12.5), expense("b", 3.0)])
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let body = &seen[0].1;
    assert_eq!(body["action"], "add");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["id"], "a");
    assert_eq!(body["data"][1]["amount"], 3.0);
}

#[tokio::test]
async fn test_http_500_is_a_connection_failure() {
    let app = Router::new().route(
        "/exec",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let server = MockServer::start(app).await;

    let err = SheetClient::new()
        .check_connection(&format!("{}/exec", server.url()))
        .await
        .unwrap_err();
    match err {
        RemoteError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_application_error_carries_message() {
    let app = Router::new().route(
        "/exec",
        post(|| async { Json(json!({"status": "error", "message": "sheet not found"})) }),
    );
    let server = MockServer::start(app).await;
    let config = ScriptConfig::new(format!("{}/exec", server.url()));

    let err = SheetClient::new()
        .append(&config, &[expense("a", 1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(ref m) if m == "sheet not found"));
}

#[tokio::test]
async fn test_missing_status_uses_fallback_message() {
    let app = Router::new().route("/exec", post(|| async { Json(json!({"ok": true})) }));
    let server = MockServer::start(app).await;

    let err = SheetClient::new()
        .check_connection(&format!("{}/exec", server.url()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "connection test failed");
}

#[tokio::test]
async fn test_non_json_reply_is_invalid() {
    let app = Router::new().route("/exec", post(|| async { "<html>login</html>" }));
    let server = MockServer::start(app).await;

    let err = SheetClient::new()
        .check_connection(&format!("{}/exec", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}
