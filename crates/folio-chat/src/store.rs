//! Conversation store: the ordered transcript plus the latest state token.

use folio_core::{ConversationState, Turn};

/// Append-only transcript and the state token to echo on the next request.
///
/// Turns cannot be edited or removed once appended.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    state: ConversationState,
}

impl ConversationStore {
    /// Empty transcript, null state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript seeded with an assistant greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut store = Self::new();
        store.append_turn(Turn::assistant(greeting));
        store
    }

    pub fn append_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Replace the state token wholesale.
    pub fn set_state(&mut self, state: ConversationState) {
        self.state = state;
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
