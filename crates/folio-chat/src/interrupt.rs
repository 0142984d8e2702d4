//! Interrupt controller: tracks whether the service is waiting for a pick.
//!
//! Ready -> AwaitingSelection when a reply asks for an interrupt and there
//! is something to pick from. Any other reply lands in Ready. There is no
//! terminal state.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What kind of user action the session accepts next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Free text is accepted.
    #[default]
    Ready,
    /// Only a pick from the offered options is accepted.
    AwaitingSelection,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Ready => write!(f, "ready"),
            Phase::AwaitingSelection => write!(f, "awaiting_selection"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterruptController {
    phase: Phase,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting_selection(&self) -> bool {
        self.phase == Phase::AwaitingSelection
    }

    /// Classify a settled reply.
    ///
    /// `has_options` is whether the selection resolver has anything to offer
    /// for the reply's state. An interrupt with nothing to pick from is
    /// refused and the session stays in Ready.
    pub fn classify(&mut self, needs_interrupt: bool, has_options: bool) -> Phase {
        let next = match (needs_interrupt, has_options) {
            (true, true) => Phase::AwaitingSelection,
            (true, false) => {
                warn!("Interrupt requested with no selectable options; staying ready");
                Phase::Ready
            }
            (false, _) => Phase::Ready,
        };
        if next != self.phase {
            info!(from = %self.phase, to = %next, "Interrupt phase changed");
        }
        self.phase = next;
        next
    }

    /// Leave AwaitingSelection once the user has picked, before the reply
    /// arrives. Returns the phase it replaced so a failed call can undo it.
    pub fn clear_for_selection(&mut self) -> Phase {
        std::mem::replace(&mut self.phase, Phase::Ready)
    }

    /// Put back a phase returned by [`clear_for_selection`](Self::clear_for_selection).
    pub fn restore(&mut self, phase: Phase) {
        self.phase = phase;
    }
}
