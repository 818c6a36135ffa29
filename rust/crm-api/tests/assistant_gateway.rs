//! Content generation through a mock OpenAI upstream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_test::TestServer;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crm_api::config::AppConfig;
use crm_api::database::Store;
use crm_api::gateway::generate_jwt;
use crm_api::server::create_app_with_store;

const SECRET: &str = "test-secret";

/// Spawned stand-in for the chat-completions endpoint. Counts requests and
/// replies with a canned body (or an error status when `fail` is set).
struct MockUpstream {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

async fn spawn_upstream(fail: bool) -> MockUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(move |State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                if fail {
                    return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
                }
                // Echo enough of the request back to assert on it.
                let user_msg = body["messages"][1]["content"].as_str().unwrap_or("").to_string();
                (
                    StatusCode::OK,
                    Json(json!({
                        "choices": [
                            { "message": { "role": "assistant", "content": format!("reply to: {user_msg}") } }
                        ]
                    })),
                )
            }),
        )
        .with_state(hits_clone);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock upstream");
    });

    MockUpstream {
        base_url: format!("http://{addr}"),
        hits,
    }
}

fn test_server(base_url: &str) -> TestServer {
    let mut config = AppConfig::default();
    config.gateway.jwt_secret = SECRET.to_string();
    config.assistant.api_key = Some("sk-test".to_string());
    config.assistant.base_url = base_url.to_string();
    let app = create_app_with_store(config, Store::in_memory()).expect("create app");
    TestServer::new(app).expect("test server")
}

fn token(user: &str) -> String {
    generate_jwt(user, SECRET, 3600).expect("token")
}

#[tokio::test]
async fn generate_returns_content_and_logs_the_conversation() {
    let upstream = spawn_upstream(false).await;
    let server = test_server(&upstream.base_url);
    let token = token("u1");

    let res = server
        .post("/api/v1/assistant/generate")
        .authorization_bearer(&token)
        .json(&json!({
            "prompt": "Write a follow-up",
            "content_type": "follow-up-email",
            "context": "Client: Acme"
        }))
        .await;
    res.assert_status_ok();
    let body = res.json::<Value>();
    let content = body["content"].as_str().unwrap();
    assert!(content.contains("Context: Client: Acme"));
    assert!(content.contains("Request: Write a follow-up"));
    assert!(body["conversation_id"].is_string());
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);

    let conversations = server
        .get("/api/v1/assistant/conversations")
        .authorization_bearer(&token)
        .await
        .json::<Vec<Value>>();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["prompt"], "Write a follow-up");
    assert_eq!(conversations[0]["content_type"], "follow-up-email");
    assert_eq!(conversations[0]["response"], body["content"]);
}

#[tokio::test]
async fn blank_prompt_fails_before_any_upstream_call() {
    let upstream = spawn_upstream(false).await;
    let server = test_server(&upstream.base_url);
    let token = token("u1");

    let res = server
        .post("/api/v1/assistant/generate")
        .authorization_bearer(&token)
        .json(&json!({ "prompt": "   ", "content_type": "custom" }))
        .await;
    res.assert_status_bad_request();

    let res = server
        .post("/api/v1/assistant/generate")
        .authorization_bearer(&token)
        .json(&json!({ "prompt": "hello", "content_type": "" }))
        .await;
    res.assert_status_bad_request();

    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_failure_maps_to_server_error() {
    let upstream = spawn_upstream(true).await;
    let server = test_server(&upstream.base_url);
    let token = token("u1");

    let res = server
        .post("/api/v1/assistant/generate")
        .authorization_bearer(&token)
        .json(&json!({ "prompt": "hello", "content_type": "custom" }))
        .await;
    res.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>();
    assert_eq!(body["error"], "upstream_error");

    // Nothing is logged for a failed generation.
    let conversations = server
        .get("/api/v1/assistant/conversations")
        .authorization_bearer(&token)
        .await
        .json::<Vec<Value>>();
    assert!(conversations.is_empty());
}

#[tokio::test]
async fn generation_requires_authentication() {
    let upstream = spawn_upstream(false).await;
    let server = test_server(&upstream.base_url);

    let res = server
        .post("/api/v1/assistant/generate")
        .json(&json!({ "prompt": "hello", "content_type": "custom" }))
        .await;
    res.assert_status_unauthorized();
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn conversation_log_is_per_user() {
    let upstream = spawn_upstream(false).await;
    let server = test_server(&upstream.base_url);
    let alice = token("alice");
    let bob = token("bob");

    server
        .post("/api/v1/assistant/generate")
        .authorization_bearer(&alice)
        .json(&json!({ "prompt": "alice's prompt", "content_type": "custom" }))
        .await
        .assert_status_ok();

    let conversations = server
        .get("/api/v1/assistant/conversations")
        .authorization_bearer(&bob)
        .await
        .json::<Vec<Value>>();
    assert!(conversations.is_empty());
}
