//! HTTP transport tests against a local axum server.
//!
//! Each test binds its own server to an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use folio_chat::{
    DialogueOrchestrator, DialogueTransport, HttpTransport, Outcome, Phase, SelectionResolver,
    TransportError,
};
use folio_core::config::{ChatConfig, TransportConfig};
use folio_core::{ConversationState, Portfolio, Turn};

// =============================================================================
// Helpers
// =============================================================================

type Seen = Arc<Mutex<Vec<Value>>>;

/// Serve `router` on 127.0.0.1 and return its base URL.
async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn transport_for(base_url: &str, timeout_secs: u64) -> HttpTransport {
    HttpTransport::new(&TransportConfig {
        base_url: base_url.to_string(),
        timeout_secs,
        ..TransportConfig::default()
    })
    .unwrap()
}

/// A reasoning service that asks for an experience pick on the first
/// request and answers plainly afterwards.
async fn scripted_service(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    let count = {
        let mut seen = seen.lock().unwrap();
        seen.push(body.clone());
        seen.len()
    };
    let turns = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
    if count == 1 {
        Json(json!({
            "response": format!("Got {} messages. Which role?", turns),
            "state": {"topic": "experience", "thread": "abc"},
            "needsInterrupt": true
        }))
    } else {
        Json(json!({
            "response": format!("Got {} messages.", turns),
            "state": {"topic": null, "thread": "abc", "round": count},
            "needsInterrupt": false
        }))
    }
}

fn scripted_router(seen: Seen) -> Router {
    Router::new()
        .route("/api/chat", post(scripted_service))
        .with_state(seen)
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn test_send_posts_envelope_and_parses_reply() {
    let seen: Seen = Arc::default();
    let base = spawn_server(scripted_router(Arc::clone(&seen))).await;
    let transport = transport_for(&base, 5);

    let transcript = vec![Turn::assistant("Hi!"), Turn::user("experience?")];
    let reply = transport
        .send(&transcript, &ConversationState::empty())
        .await
        .unwrap();

    assert_eq!(reply.response_text, "Got 2 messages. Which role?");
    assert!(reply.needs_interrupt);
    assert_eq!(
        reply.next_state.to_value(),
        json!({"topic": "experience", "thread": "abc"})
    );

    let body = seen.lock().unwrap()[0].clone();
    assert_eq!(
        body,
        json!({
            "messages": [
                {"role": "assistant", "content": "Hi!"},
                {"role": "user", "content": "experience?"}
            ],
            "state": null
        })
    );
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model unavailable") }),
    );
    let base = spawn_server(router).await;

    let err = transport_for(&base, 5)
        .send(&[Turn::user("hi")], &ConversationState::empty())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::Status {
            status: 500,
            body: "model unavailable".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_transport_error() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({"answer": "wrong field"})) }),
    );
    let base = spawn_server(router).await;

    let err = transport_for(&base, 5)
        .send(&[Turn::user("hi")], &ConversationState::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::MalformedReply(_)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport_for(&format!("http://{}", addr), 5)
        .send(&[Turn::user("hi")], &ConversationState::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "{:?}", err);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"response": "late"}))
        }),
    );
    let base = spawn_server(router).await;

    let err = transport_for(&base, 1)
        .send(&[Turn::user("hi")], &ConversationState::empty())
        .await
        .unwrap_err();
    assert_eq!(err, TransportError::Timeout);
}

// =============================================================================
// Orchestrator over HTTP
// =============================================================================

#[tokio::test]
async fn test_interrupt_round_trip_over_http() {
    let seen: Seen = Arc::default();
    let base = spawn_server(scripted_router(Arc::clone(&seen))).await;
    let orch = DialogueOrchestrator::new(
        transport_for(&base, 5),
        Arc::new(Portfolio::sample()),
        ChatConfig::default(),
    );

    let outcome = orch.submit_free_text("tell me about your experience").await;
    assert_eq!(outcome, Ok(Outcome::Replied(Phase::AwaitingSelection)));

    let item = orch.options()[0].clone();
    let outcome = orch.submit_selection(&item).await;
    assert_eq!(outcome, Ok(Outcome::Replied(Phase::Ready)));

    let snap = orch.snapshot();
    assert_eq!(snap.turns.len(), 5);
    assert_eq!(snap.turns[3].content, "Selected: 10xScale.ai - AI Intern");
    assert_eq!(snap.turns[4].content, "Got 4 messages.");

    let bodies = seen.lock().unwrap().clone();
    assert_eq!(bodies.len(), 2);
    // Second request echoes the first reply's state.
    assert_eq!(bodies[1]["state"], json!({"topic": "experience", "thread": "abc"}));
    let picked = &bodies[1]["messages"][3];
    assert_eq!(
        picked["content"],
        json!(SelectionResolver::package_selection(&item))
    );
    assert_eq!(picked["selection"]["id"], "e1");
    assert_eq!(picked["selection"]["type"], "experience");
}

#[tokio::test]
async fn test_unreachable_service_yields_apology() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let orch = DialogueOrchestrator::new(
        transport_for(&format!("http://{}", addr), 5),
        Arc::new(Portfolio::sample()),
        ChatConfig::default(),
    );
    let outcome = orch.submit_free_text("hi").await.unwrap();
    assert!(matches!(outcome, Outcome::Failed(TransportError::Network(_))));

    let snap = orch.snapshot();
    assert_eq!(
        snap.turns.last().unwrap().content,
        ChatConfig::default().error_message
    );
    assert!(snap.state.is_empty());
    assert!(!snap.loading);
}
