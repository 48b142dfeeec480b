//! Consultation session types

use super::profile::PatientProfile;
use crate::llm::LlmMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Patient,
    Doctor,
}

/// One utterance in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn patient(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Patient,
            text: text.into(),
        }
    }

    pub fn doctor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Doctor,
            text: text.into(),
        }
    }

    /// Model-facing message for this turn
    pub fn to_message(&self) -> LlmMessage {
        match self.speaker {
            Speaker::Patient => LlmMessage::user(self.text.clone()),
            Speaker::Doctor => LlmMessage::assistant(self.text.clone()),
        }
    }
}

/// Consultation state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsultState {
    /// Gathering symptoms; accepts further utterances
    #[default]
    Collecting,

    /// The doctor issued a prescription. Terminal.
    Finalized { prescription: String },
}

impl ConsultState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConsultState::Finalized { .. })
    }
}

/// One consultation: profile, transcript and finalization status.
///
/// Owned by the caller and passed explicitly to the driver. The transcript
/// only grows through [`crate::ConversationDriver::advance`], and a new
/// consultation always starts from a fresh `Session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    profile: PatientProfile,
    transcript: Vec<Turn>,
    state: ConsultState,
}

impl Session {
    pub fn new(profile: PatientProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            transcript: Vec::new(),
            state: ConsultState::Collecting,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &PatientProfile {
        &self.profile
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn state(&self) -> &ConsultState {
        &self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state.is_terminal()
    }

    /// Finalized prescription text, if the consultation has ended
    pub fn prescription(&self) -> Option<&str> {
        match &self.state {
            ConsultState::Finalized { prescription } => Some(prescription),
            ConsultState::Collecting => None,
        }
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    pub(crate) fn set_state(&mut self, state: ConsultState) {
        self.state = state;
    }
}
