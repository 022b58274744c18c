mod support;

use std::net::SocketAddr;

use kora::server::{router, AppState, ChatReply, ClearReply, HealthReply};
use kora_llm::LlmError;
use serde_json::json;
use support::{orchestrator, text};
use tokio::net::TcpListener;

async fn spawn(agent: kora_agent::Orchestrator) -> (SocketAddr, AppState) {
    let state = AppState::new(agent);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

#[tokio::test]
async fn chat_returns_the_answer() {
    let (addr, state) = spawn(orchestrator(vec![text("42")], None).await).await;

    let reply: ChatReply = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "message": "What is 6 * 7?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply.status, "success");
    assert_eq!(reply.response, "42");
    assert_eq!(state.agent.lock().await.memory().len(), 1);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let (addr, _) = spawn(orchestrator(vec![], None).await).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "message": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Message cannot be empty");
}

#[tokio::test]
async fn failed_turn_reports_error_status() {
    let (addr, _) = spawn(orchestrator(vec![Err(LlmError::api(401, "bad key"))], None).await).await;

    let reply: ChatReply = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "message": "hello" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply.status, "error");
    assert!(reply.response.contains("401"));
}

#[tokio::test]
async fn clear_resets_memory() {
    let (addr, state) = spawn(orchestrator(vec![text("ok")], None).await).await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "message": "remember this" }))
        .send()
        .await
        .unwrap();
    assert_eq!(state.agent.lock().await.memory().len(), 1);

    let reply: ClearReply = client
        .post(format!("http://{addr}/clear"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply.status, "success");
    assert!(state.agent.lock().await.memory().is_empty());
}

#[tokio::test]
async fn health_reports_ready() {
    let (addr, _) = spawn(orchestrator(vec![], None).await).await;

    let reply: HealthReply = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply.status, "healthy");
    assert!(reply.initialized);
    assert!(chrono::DateTime::parse_from_rfc3339(&reply.timestamp).is_ok());
}
