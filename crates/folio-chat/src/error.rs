//! Error types for the dialogue core.

/// Failure talking to the reasoning service.
///
/// Never retried. The orchestrator turns it into a single apology turn
/// and leaves the state token where it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("reasoning service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed reply: {0}")]
    MalformedReply(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// A submission the orchestrator refused.
///
/// These are caller-discipline violations. They never reach the
/// transcript; the session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("a selection is required before free text is accepted")]
    AwaitingSelection,
    #[error("no selection is pending")]
    NotAwaitingSelection,
    #[error("a request is already in flight")]
    Busy,
    #[error("item is not among the offered options: {0}")]
    UnknownSelection(String),
}
