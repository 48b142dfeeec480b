//! Effects produced by state transitions

use super::state::Turn;

/// Effects to be applied after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the transcript
    AppendTurn(Turn),

    /// Record the finalized prescription
    Finalize { prescription: String },
}
