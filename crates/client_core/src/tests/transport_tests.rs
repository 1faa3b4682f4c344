use super::*;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::fields;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    received: Arc<Mutex<Vec<ReceivedField>>>,
}

async fn handle_analyze(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
            .to_vec();
        state.received.lock().await.push(ReceivedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    Ok(Json(json!({"summary": "S", "timeline": "Jan: Start"})))
}

async fn handle_failure() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "model quota exceeded")
}

async fn handle_export() -> Vec<u8> {
    b"%PDF-1.7 exported".to_vec()
}

async fn spawn_service() -> anyhow::Result<(String, ServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/analyze", post(handle_analyze))
        .route("/whatif", post(handle_failure))
        .route("/export/pdf", get(handle_export))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/"), state))
}

#[test]
fn trims_trailing_slash_and_rejects_garbage() {
    let transport = HttpTransport::new("http://127.0.0.1:8001/").expect("valid url");
    assert_eq!(transport.base_url(), "http://127.0.0.1:8001");
    assert_eq!(
        transport.url(Endpoint::ExportPdf),
        "http://127.0.0.1:8001/export/pdf"
    );
    assert!(HttpTransport::new("not a url").is_err());
}

#[tokio::test]
async fn submit_posts_multipart_fields() {
    let (server_url, state) = spawn_service().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url).expect("transport");

    let form = FormPayload::new()
        .file(fields::PRIMARY_FILE, "lease.pdf", "application/pdf", b"%PDF-a".to_vec())
        .file(fields::SECONDARY_FILE, "draft.pdf", "application/pdf", b"%PDF-b".to_vec())
        .text(fields::LANGUAGE, "English")
        .text(fields::SUMMARY_MODE, "concise");
    let raw = transport
        .submit(Endpoint::Analyze, form)
        .await
        .expect("submit");

    let body: Value = serde_json::from_str(raw.as_str()).expect("json body");
    assert_eq!(body["summary"], "S");

    let received = state.received.lock().await.clone();
    let names: Vec<&str> = received.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["file1", "file2", "language", "summaryMode"]);
    assert_eq!(received[0].file_name.as_deref(), Some("lease.pdf"));
    assert_eq!(received[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(received[0].data, b"%PDF-a");
    assert_eq!(received[1].file_name.as_deref(), Some("draft.pdf"));
    assert_eq!(received[2].data, b"English");
    assert_eq!(received[3].data, b"concise");
}

#[tokio::test]
async fn non_success_status_carries_status_and_body() {
    let (server_url, _state) = spawn_service().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url).expect("transport");

    let err = transport
        .submit(
            Endpoint::WhatIf,
            FormPayload::new().text(fields::QUERY, "What if?"),
        )
        .await
        .expect_err("server error");

    match &err {
        TransportError::Server { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "model quota exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn fetch_binary_returns_artifact_bytes() {
    let (server_url, _state) = spawn_service().await.expect("spawn server");
    let transport = HttpTransport::new(&server_url).expect("transport");

    let bytes = transport
        .fetch_binary(Endpoint::ExportPdf)
        .await
        .expect("download");
    assert_eq!(bytes, b"%PDF-1.7 exported");
}

#[tokio::test]
async fn unreachable_service_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let transport = HttpTransport::new(&format!("http://{addr}")).expect("transport");

    let err = transport
        .fetch_binary(Endpoint::ExportPdf)
        .await
        .expect_err("connection refused");
    assert!(matches!(err, TransportError::Http(_)));
    assert_eq!(err.status(), None);
}
