//! Dialogue core for the portfolio assistant.
//!
//! Keeps the multi-turn transcript and the server-issued state token,
//! relays both to the reasoning service, and gates user input while the
//! service is waiting for the user to pick an option.

pub mod error;
pub mod interrupt;
pub mod orchestrator;
pub mod quick;
pub mod selection;
pub mod store;
pub mod transport;

pub use error::{ChatError, TransportError};
pub use interrupt::{InterruptController, Phase};
pub use orchestrator::{DialogueOrchestrator, Outcome, SessionSnapshot};
pub use quick::{QuickAnswerer, QuickTopic};
pub use selection::SelectionResolver;
pub use store::ConversationStore;
pub use transport::{DialogueTransport, HttpTransport, MockTransport, RecordedRequest};
