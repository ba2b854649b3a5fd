//! Integration tests for the HTTP API
//!
//! Drives the router in-process with the in-memory outbox transport.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chat_agent_config::Settings;
use chat_agent_server::{create_router, AppState};

struct TestApp {
    router: Router,
    _attachments: tempfile::TempDir,
}

fn app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    let attachments = tempfile::tempdir().unwrap();
    std::fs::write(attachments.path().join("horarios.pdf"), b"%PDF-1.4").unwrap();

    let mut settings = Settings::default();
    settings.assistant.attachments_dir = attachments.path().display().to_string();
    configure(&mut settings);

    let state = AppState::new(settings).unwrap();
    TestApp {
        router: create_router(state),
        _attachments: attachments,
    }
}

fn app() -> TestApp {
    app_with(|_| {})
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_message(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_first_message_gets_welcome() {
    let app = app();

    let (status, body) = send(
        &app.router,
        post_message(json!({ "from": "5534999990000@c.us", "body": "oi", "sender_name": "Marcos Lima" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ignored"], false);
    assert_eq!(body["outcome"]["kind"], "daily_welcome");
    assert_eq!(body["state"]["mode"], "awaiting_option");
    assert_eq!(body["effects"][0]["type"], "typing");
    assert!(body["effects"][1]["text"]
        .as_str()
        .unwrap()
        .starts_with("Olá Marcos,"));
}

#[tokio::test]
async fn test_group_messages_are_ignored() {
    let app = app();

    let (status, body) = send(
        &app.router,
        post_message(json!({ "from": "120363000000@g.us", "body": "menu" })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["ignored"], true);

    let (_, list) = send(&app.router, get("/api/conversations")).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_blank_sender_rejected() {
    let app = app();
    let (status, _) = send(&app.router, post_message(json!({ "from": "  ", "body": "oi" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversation_lifecycle() {
    let app = app();
    let from = "5511988887777@c.us";

    for text in ["oi", "3", "lutador"] {
        let request = post_message(json!({ "from": from, "body": text }));
        let (status, _) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app.router, get(&format!("/api/conversations/{}", from))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "Confirming Plan");
    assert_eq!(body["state"]["mode"]["confirming_plan"], "fighter");

    let (_, body) = send(&app.router, post_message(json!({ "from": from, "body": "sim" }))).await;
    assert_eq!(body["outcome"]["kind"], "plan_confirmed");
    assert_eq!(body["execution"]["failed"].as_array().unwrap().len(), 0);

    let (status, outbox) = send(
        &app.router,
        get(&format!("/api/conversations/{}/outbox", from)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = outbox["messages"].as_array().unwrap();
    assert!(messages.iter().any(|m| m["type"] == "attachment" && m["file_name"] == "horarios.pdf"));
    assert_eq!(messages.last().unwrap()["type"], "mark_unread");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/conversations/{}", from))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, get(&format!("/api/conversations/{}", from))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_conversation_is_not_found() {
    let app = app();
    let (status, _) = send(&app.router, get("/api/conversations/nobody@c.us")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let app = app_with(|settings| settings.server.api_key = Some("s3cret".to_string()));
    let payload = json!({ "from": "a@c.us", "body": "oi" });

    let (status, _) = send(&app.router, post_message(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut wrong = post_message(payload.clone());
    wrong.headers_mut().insert("x-api-key", "nope".parse().unwrap());
    let (status, _) = send(&app.router, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut right = post_message(payload);
    right.headers_mut().insert("x-api-key", "s3cret".parse().unwrap());
    let (status, _) = send(&app.router, right).await;
    assert_eq!(status, StatusCode::OK);

    // health stays public
    let (status, _) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app();

    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["transport"]["name"], "outbox");

    // recorder is only installed by the binary
    let (status, _) = send(&app.router, get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
