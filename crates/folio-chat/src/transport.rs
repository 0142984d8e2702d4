//! Dialogue transport: the only network boundary.
//!
//! Every request carries the full transcript and the current state token.
//! Nothing is retried; a failed call is reported once to the caller.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_core::config::TransportConfig;
use folio_core::{ConversationState, DialogueReply, Role, SelectableItem, Turn};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::selection::SelectionResolver;

/// Longest error body kept in a [`TransportError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Sends a transcript and state token to the reasoning service.
pub trait DialogueTransport: Send + Sync {
    /// Send the whole transcript, in order, with the state token to echo.
    fn send(
        &self,
        transcript: &[Turn],
        state: &ConversationState,
    ) -> impl Future<Output = Result<DialogueReply, TransportError>> + Send;
}

// =============================================================================
// Wire envelope
// =============================================================================

/// One transcript entry as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectableItem>,
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        match &turn.selection {
            Some(item) => Self {
                role: turn.role,
                content: SelectionResolver::package_selection(item),
                selection: Some(item.clone()),
            },
            None => Self {
                role: turn.role,
                content: turn.content.clone(),
                selection: None,
            },
        }
    }
}

/// Request body posted to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequestBody {
    pub messages: Vec<WireMessage>,
    pub state: ConversationState,
}

impl ChatRequestBody {
    pub fn new(transcript: &[Turn], state: &ConversationState) -> Self {
        Self {
            messages: transcript.iter().map(WireMessage::from).collect(),
            state: state.clone(),
        }
    }
}

/// A request as seen by [`MockTransport`].
pub type RecordedRequest = ChatRequestBody;

/// Reply body returned by the chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatReplyBody {
    response: String,
    #[serde(default)]
    state: ConversationState,
    #[serde(default, alias = "needs_interrupt")]
    needs_interrupt: bool,
}

/// Validate a raw reply body.
pub fn parse_reply(body: &[u8]) -> Result<DialogueReply, TransportError> {
    let parsed: ChatReplyBody = serde_json::from_slice(body)
        .map_err(|e| TransportError::MalformedReply(e.to_string()))?;
    Ok(DialogueReply {
        response_text: parsed.response,
        next_state: parsed.state,
        needs_interrupt: parsed.needs_interrupt,
    })
}

// =============================================================================
// HttpTransport
// =============================================================================

/// Transport that POSTs JSON to the configured chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let url = config.chat_url();
        let endpoint = reqwest::Url::parse(&url)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

impl DialogueTransport for HttpTransport {
    async fn send(
        &self,
        transcript: &[Turn],
        state: &ConversationState,
    ) -> Result<DialogueReply, TransportError> {
        let body = ChatRequestBody::new(transcript, state);
        debug!(
            url = %self.endpoint,
            turns = body.messages.len(),
            has_state = !state.is_empty(),
            "Sending dialogue request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Reasoning service rejected request");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        parse_reply(&bytes)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

// =============================================================================
// MockTransport
// =============================================================================

#[derive(Default)]
struct MockInner {
    replies: Mutex<VecDeque<Result<DialogueReply, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    gate: Option<Arc<Notify>>,
}

/// Scripted transport for tests and offline runs.
///
/// Replies are handed out in the order they were queued. Once the queue
/// is empty every call succeeds with `"ok"` and echoes the state back.
/// Clones share the same queue and request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that holds every call until `gate` is notified once per call.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            inner: Arc::new(MockInner {
                gate: Some(gate),
                ..MockInner::default()
            }),
        }
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, text: &str, state: serde_json::Value, needs_interrupt: bool) {
        self.push(Ok(DialogueReply {
            response_text: text.to_string(),
            next_state: ConversationState::new(state),
            needs_interrupt,
        }));
    }

    /// Queue a failure.
    pub fn push_failure(&self, err: TransportError) {
        self.push(Err(err));
    }

    pub fn push(&self, reply: Result<DialogueReply, TransportError>) {
        self.inner
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl DialogueTransport for MockTransport {
    async fn send(
        &self,
        transcript: &[Turn],
        state: &ConversationState,
    ) -> Result<DialogueReply, TransportError> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ChatRequestBody::new(transcript, state));

        if let Some(gate) = &self.inner.gate {
            gate.notified().await;
        }

        let scripted = self
            .inner
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        scripted.unwrap_or_else(|| {
            Ok(DialogueReply {
                response_text: "ok".to_string(),
                next_state: state.clone(),
                needs_interrupt: false,
            })
        })
    }
}
