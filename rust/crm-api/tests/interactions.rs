//! Interaction log side effects and the meeting-prep bundle.

use axum_test::TestServer;
use serde_json::{json, Value};

use crm_api::config::AppConfig;
use crm_api::database::Store;
use crm_api::gateway::generate_jwt;
use crm_api::server::create_app_with_store;

const SECRET: &str = "test-secret";

fn test_server() -> TestServer {
    let mut config = AppConfig::default();
    config.gateway.jwt_secret = SECRET.to_string();
    config.assistant.enabled = false;
    let app = create_app_with_store(config, Store::in_memory()).expect("create app");
    TestServer::new(app).expect("test server")
}

fn token(user: &str) -> String {
    generate_jwt(user, SECRET, 3600).expect("token")
}

async fn create_client(server: &TestServer, token: &str, name: &str) -> String {
    server
        .post("/api/v1/clients")
        .authorization_bearer(token)
        .json(&json!({ "name": name }))
        .await
        .json::<Value>()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn recording_an_interaction_touches_last_contact() {
    let server = test_server();
    let token = token("u1");
    let client_id = create_client(&server, &token, "Acme").await;

    let recorded = server
        .post(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&token)
        .json(&json!({ "type": "Phone Call", "content": "Discussed renewal" }))
        .await;
    recorded.assert_status_ok();
    assert_eq!(recorded.json::<Value>()["type"], "Phone Call");

    let interactions = server
        .get(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&token)
        .await
        .json::<Vec<Value>>();
    assert_eq!(interactions.len(), 1);
    assert_eq!(interactions[0]["content"], "Discussed renewal");

    let clients = server
        .get("/api/v1/clients")
        .authorization_bearer(&token)
        .await
        .json::<Vec<Value>>();
    assert!(clients[0]["last_contact"].is_string());
}

#[tokio::test]
async fn interactions_are_unreachable_through_a_foreign_client() {
    let server = test_server();
    let alice = token("alice");
    let bob = token("bob");
    let client_id = create_client(&server, &alice, "Alice's client").await;

    let res = server
        .get(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&bob)
        .await;
    res.assert_status_not_found();

    let res = server
        .post(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&bob)
        .json(&json!({ "type": "call", "content": "intrusion" }))
        .await;
    res.assert_status_not_found();
}

#[tokio::test]
async fn blank_interaction_fields_are_rejected() {
    let server = test_server();
    let token = token("u1");
    let client_id = create_client(&server, &token, "Acme").await;

    let res = server
        .post(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&token)
        .json(&json!({ "type": "  ", "content": "x" }))
        .await;
    res.assert_status_bad_request();
}

#[tokio::test]
async fn deleting_a_client_removes_its_interaction_log() {
    let server = test_server();
    let token = token("u1");
    let client_id = create_client(&server, &token, "Acme").await;

    server
        .post(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&token)
        .json(&json!({ "type": "call", "content": "hello" }))
        .await
        .assert_status_ok();

    server
        .delete(&format!("/api/v1/clients/{client_id}"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let res = server
        .get(&format!("/api/v1/clients/{client_id}/interactions"))
        .authorization_bearer(&token)
        .await;
    res.assert_status_not_found();
}

#[tokio::test]
async fn meeting_prep_caps_history_at_ten() {
    let server = test_server();
    let token = token("u1");
    let client_id = create_client(&server, &token, "Acme").await;

    for i in 0..12 {
        server
            .post(&format!("/api/v1/clients/{client_id}/interactions"))
            .authorization_bearer(&token)
            .json(&json!({ "type": "call", "content": format!("call {i}") }))
            .await
            .assert_status_ok();
    }

    let prep = server
        .get(&format!("/api/v1/clients/{client_id}/meeting-prep"))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(prep["client"]["name"], "Acme");
    assert_eq!(prep["recent_interactions"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn meeting_prep_includes_only_active_deals() {
    let server = test_server();
    let token = token("u1");
    let client_id = create_client(&server, &token, "Acme").await;

    for status in ["active", "won", "active", "lost"] {
        server
            .post("/api/v1/deals")
            .authorization_bearer(&token)
            .json(&json!({ "title": status, "status": status, "client_id": client_id }))
            .await
            .assert_status_ok();
    }
    // A deal for a different client stays out of the bundle.
    let other_client = create_client(&server, &token, "Other").await;
    server
        .post("/api/v1/deals")
        .authorization_bearer(&token)
        .json(&json!({ "title": "elsewhere", "status": "active", "client_id": other_client }))
        .await
        .assert_status_ok();

    let prep = server
        .get(&format!("/api/v1/clients/{client_id}/meeting-prep"))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    let deals = prep["active_deals"].as_array().unwrap();
    assert_eq!(deals.len(), 2);
    for deal in deals {
        assert_eq!(deal["status"], "active");
        assert_ne!(deal["title"], "elsewhere");
    }
}

#[tokio::test]
async fn meeting_prep_for_a_foreign_client_is_not_found() {
    let server = test_server();
    let alice = token("alice");
    let bob = token("bob");
    let client_id = create_client(&server, &alice, "Alice's client").await;

    let res = server
        .get(&format!("/api/v1/clients/{client_id}/meeting-prep"))
        .authorization_bearer(&bob)
        .await;
    res.assert_status_not_found();
}
