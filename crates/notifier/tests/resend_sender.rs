use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use notifier::{EmailMessage, NotifyError, ReportSender, ResendSender};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn accept(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.requests.lock().unwrap().push((auth, body));
    (StatusCode::OK, Json(json!({ "id": "msg_123" })))
}

async fn reject() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": "invalid from address" })),
    )
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

fn message() -> EmailMessage {
    EmailMessage {
        from: "お疲れ様委員会 <report@example.com>".into(),
        to: vec!["me@example.com".into()],
        subject: "週間コミットレポート (2026/02/14)".into(),
        html: "<p>hi</p>".into(),
    }
}

#[tokio::test]
async fn posts_message_with_bearer_key_and_returns_id() {
    let captured = Captured::default();
    let router = Router::new()
        .route("/emails", post(accept))
        .with_state(captured.clone());
    let base = serve(router).await;

    let sender = ResendSender::new("re_test_key", &base).unwrap();
    let id = sender.send(&message()).await.unwrap();
    assert_eq!(id, "msg_123");

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer re_test_key"));
    assert_eq!(body["from"], "お疲れ様委員会 <report@example.com>");
    assert_eq!(body["to"], json!(["me@example.com"]));
    assert_eq!(body["subject"], "週間コミットレポート (2026/02/14)");
    assert_eq!(body["html"], "<p>hi</p>");
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let base = serve(Router::new().route("/emails", post(reject))).await;
    let sender = ResendSender::new("re_test_key", &base).unwrap();

    match sender.send(&message()).await {
        Err(NotifyError::Api { status, body }) => {
            assert_eq!(status, 422);
            assert!(body.contains("invalid from address"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
