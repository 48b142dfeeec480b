//! Pure state transition function
//!
//! Given the same state and event this always yields the same result, with no
//! I/O. The driver performs the model call and applies the effects.

use super::sentinel::extract_prescription;
use super::state::{ConsultState, Session, Turn};
use super::{Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: ConsultState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConsultState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Consultation already finalized")]
    AlreadyFinalized,
    #[error("Utterance is empty")]
    EmptyUtterance,
}

/// Whether `state` accepts a new patient utterance; checked before the model is called
pub fn check_utterance(state: &ConsultState, text: &str) -> Result<(), TransitionError> {
    match state {
        ConsultState::Finalized { .. } => Err(TransitionError::AlreadyFinalized),
        ConsultState::Collecting if text.trim().is_empty() => Err(TransitionError::EmptyUtterance),
        ConsultState::Collecting => Ok(()),
    }
}

pub fn transition(state: &ConsultState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::DoctorReply { utterance, reply } => {
            check_utterance(state, &utterance)?;

            let prescription = extract_prescription(&reply);
            let new_state = match &prescription {
                Some(text) => ConsultState::Finalized {
                    prescription: text.clone(),
                },
                None => ConsultState::Collecting,
            };

            let result = TransitionResult::new(new_state)
                .with_effect(Effect::AppendTurn(Turn::patient(utterance)))
                .with_effect(Effect::AppendTurn(Turn::doctor(reply)));

            Ok(match prescription {
                Some(prescription) => result.with_effect(Effect::Finalize { prescription }),
                None => result,
            })
        }
    }
}

/// Apply a transition result to the session
pub(crate) fn apply(session: &mut Session, result: TransitionResult) {
    for effect in result.effects {
        match effect {
            Effect::AppendTurn(turn) => session.push_turn(turn),
            Effect::Finalize { prescription } => {
                tracing::info!(
                    session_id = %session.id(),
                    prescription_len = prescription.len(),
                    "Consultation finalized"
                );
            }
        }
    }
    session.set_state(result.new_state);
}
