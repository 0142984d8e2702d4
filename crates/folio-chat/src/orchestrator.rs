//! Dialogue orchestrator: one round trip per submission.
//!
//! Appends the user's input, relays the full transcript and state token,
//! then applies the reply to the store and the interrupt controller. The
//! `loading` flag is set before the transport call and cleared once it
//! settles, so at most one request per session is ever in flight.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use folio_core::config::ChatConfig;
use folio_core::{Catalog, ConversationState, Portfolio, SelectableItem, Turn};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ChatError, TransportError};
use crate::interrupt::{InterruptController, Phase};
use crate::quick::{QuickAnswerer, QuickTopic};
use crate::selection::SelectionResolver;
use crate::store::ConversationStore;
use crate::transport::DialogueTransport;

/// How a submission settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The service replied; the session is now in this phase.
    Replied(Phase),
    /// The call failed; an apology turn was appended and the state token
    /// was left as it was.
    Failed(TransportError),
    /// The session was reset while the call was in flight; the reply was
    /// dropped.
    Discarded,
    /// A quick topic was answered without contacting the service.
    AnsweredLocally,
}

/// Read-only copy of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
    pub state: ConversationState,
    pub phase: Phase,
    pub loading: bool,
    /// Options to present; empty unless `phase` is `AwaitingSelection`.
    pub options: Vec<SelectableItem>,
}

impl SessionSnapshot {
    /// Whether free text (and quick topics) would be accepted right now.
    pub fn accepts_free_text(&self) -> bool {
        self.phase == Phase::Ready && !self.loading
    }
}

/// Aggregate root: everything one open chat surface owns.
#[derive(Debug)]
struct DialogueSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    store: ConversationStore,
    interrupt: InterruptController,
    loading: bool,
}

impl DialogueSession {
    fn new(greeting: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            store: ConversationStore::with_greeting(greeting),
            interrupt: InterruptController::new(),
            loading: false,
        }
    }
}

/// Undoes the pre-call bookkeeping of a submission that is dropped before
/// its reply is applied, e.g. by a caller-side timeout or an aborted task.
struct PendingExchange {
    session: Arc<Mutex<DialogueSession>>,
    session_id: Uuid,
    previous: Option<Phase>,
    settled: bool,
}

impl PendingExchange {
    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for PendingExchange {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if session.id != self.session_id {
            return;
        }
        session.loading = false;
        if let Some(phase) = self.previous {
            session.interrupt.restore(phase);
        }
        warn!(session_id = %self.session_id, "Submission dropped before its reply arrived");
    }
}

/// Facade the presentation layer drives.
///
/// Clones share the same session, so a handle can be moved into a task
/// while another renders snapshots.
pub struct DialogueOrchestrator<T> {
    session: Arc<Mutex<DialogueSession>>,
    transport: Arc<T>,
    resolver: SelectionResolver,
    quick: QuickAnswerer,
    config: ChatConfig,
}

impl<T> Clone for DialogueOrchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            transport: Arc::clone(&self.transport),
            resolver: self.resolver.clone(),
            quick: self.quick.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T: DialogueTransport> DialogueOrchestrator<T> {
    /// Open a session over `portfolio`, talking to the service through
    /// `transport`.
    pub fn new(transport: T, portfolio: Arc<Portfolio>, config: ChatConfig) -> Self {
        let catalog = Arc::new(Catalog::from_portfolio(&portfolio));
        let session = DialogueSession::new(&config.greeting);
        info!(session_id = %session.id, options = catalog.len(), "Dialogue session opened");
        Self {
            session: Arc::new(Mutex::new(session)),
            transport: Arc::new(transport),
            resolver: SelectionResolver::new(catalog),
            quick: QuickAnswerer::new(portfolio),
            config,
        }
    }

    pub fn resolver(&self) -> &SelectionResolver {
        &self.resolver
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.lock();
        let phase = session.interrupt.phase();
        let options = match phase {
            Phase::AwaitingSelection => self.resolver.options_for(session.store.state()),
            Phase::Ready => Vec::new(),
        };
        SessionSnapshot {
            session_id: session.id,
            started_at: session.started_at,
            turns: session.store.turns().to_vec(),
            state: session.store.state().clone(),
            phase,
            loading: session.loading,
            options,
        }
    }

    /// Options to present, or nothing when no selection is pending.
    pub fn options(&self) -> Vec<SelectableItem> {
        self.snapshot().options
    }

    /// Discard the current session and open a fresh one.
    ///
    /// A reply still in flight for the old session is dropped when it
    /// arrives.
    pub fn reset(&self) {
        let mut session = self.lock();
        let old = session.id;
        *session = DialogueSession::new(&self.config.greeting);
        info!(previous = %old, session_id = %session.id, "Dialogue session reset");
    }

    /// Send free text typed by the user.
    pub async fn submit_free_text(&self, text: &str) -> Result<Outcome, ChatError> {
        if text.trim().is_empty() {
            debug!("Rejected empty message");
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_length {
            debug!("Rejected oversized message");
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let (session_id, transcript, state) = {
            let mut session = self.lock();
            Self::check_ready(&session)?;
            session.store.append_turn(Turn::user(text));
            session.loading = true;
            (
                session.id,
                session.store.turns().to_vec(),
                session.store.state().clone(),
            )
        };

        let pending = self.pending(session_id, None);
        self.exchange(transcript, state, pending).await
    }

    /// Send the user's pick from the offered options.
    ///
    /// The transcript shows "Selected: <label>"; the service receives the
    /// packaged item.
    pub async fn submit_selection(&self, item: &SelectableItem) -> Result<Outcome, ChatError> {
        let (session_id, transcript, state, previous) = {
            let mut session = self.lock();
            if session.loading {
                debug!(session_id = %session.id, "Rejected selection while busy");
                return Err(ChatError::Busy);
            }
            if !session.interrupt.is_awaiting_selection() {
                debug!(session_id = %session.id, "Rejected selection with none pending");
                return Err(ChatError::NotAwaitingSelection);
            }
            if !self.resolver.is_offered(session.store.state(), item) {
                debug!(session_id = %session.id, item = %item.id, "Rejected unknown selection");
                return Err(ChatError::UnknownSelection(item.id.clone()));
            }
            session.store.append_turn(Turn::selection(item.clone()));
            let previous = session.interrupt.clear_for_selection();
            session.loading = true;
            (
                session.id,
                session.store.turns().to_vec(),
                session.store.state().clone(),
                previous,
            )
        };

        let pending = self.pending(session_id, Some(previous));
        self.exchange(transcript, state, pending).await
    }

    /// Answer a quick topic locally.
    pub fn submit_quick_topic(&self, topic: QuickTopic) -> Result<Outcome, ChatError> {
        let mut session = self.lock();
        Self::check_ready(&session)?;
        session.store.append_turn(Turn::user(topic.prompt()));
        session
            .store
            .append_turn(Turn::assistant(self.quick.answer(topic)));
        debug!(session_id = %session.id, topic = topic.label(), "Quick topic answered");
        Ok(Outcome::AnsweredLocally)
    }

    // -- Private helpers --

    fn lock(&self) -> MutexGuard<'_, DialogueSession> {
        // Mutations never panic midway, so a poisoned session is still consistent.
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_ready(session: &DialogueSession) -> Result<(), ChatError> {
        if session.loading {
            debug!(session_id = %session.id, "Rejected input while busy");
            return Err(ChatError::Busy);
        }
        if session.interrupt.is_awaiting_selection() {
            debug!(session_id = %session.id, "Rejected free text while awaiting selection");
            return Err(ChatError::AwaitingSelection);
        }
        Ok(())
    }

    fn pending(&self, session_id: Uuid, previous: Option<Phase>) -> PendingExchange {
        PendingExchange {
            session: Arc::clone(&self.session),
            session_id,
            previous,
            settled: false,
        }
    }

    /// The single suspension point. `pending.previous` is the phase to
    /// restore if an optimistic selection clear has to be undone.
    async fn exchange(
        &self,
        transcript: Vec<Turn>,
        state: ConversationState,
        mut pending: PendingExchange,
    ) -> Result<Outcome, ChatError> {
        let result = self.transport.send(&transcript, &state).await;

        let mut session = self.lock();
        pending.settle();
        let session_id = pending.session_id;
        if session.id != session_id {
            warn!(%session_id, "Discarding reply for a session that was reset");
            return Ok(Outcome::Discarded);
        }

        let outcome = match result {
            Ok(reply) => {
                session.store.append_turn(Turn::assistant(reply.response_text));
                session.store.set_state(reply.next_state);
                let has_options = !self
                    .resolver
                    .options_for(session.store.state())
                    .is_empty();
                let phase = session
                    .interrupt
                    .classify(reply.needs_interrupt, has_options);
                debug!(%session_id, turns = session.store.len(), %phase, "Reply applied");
                Outcome::Replied(phase)
            }
            Err(err) => {
                warn!(%session_id, error = %err, "Dialogue request failed");
                session
                    .store
                    .append_turn(Turn::assistant(self.config.error_message.clone()));
                if let Some(phase) = pending.previous {
                    session.interrupt.restore(phase);
                }
                Outcome::Failed(err)
            }
        };
        session.loading = false;
        Ok(outcome)
    }
}

// =============================================================================
// Tests
// =============================================================================
