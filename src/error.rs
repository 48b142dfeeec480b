//! Errors surfaced by the consultation operations

use crate::consultation::TransitionError;
use crate::llm::LlmErrorKind;
use thiserror::Error;

/// Failure of `advance` or `finalize`.
///
/// Every variant is recoverable from the process's point of view; callers
/// show [`ConsultError::user_message`] and keep running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsultError {
    /// No credential for the configured model
    #[error("Model service not configured: {0}")]
    NotConfigured(String),

    /// Transport failure, timeout, or unusable reply
    #[error("Model unavailable: {message}")]
    ModelUnavailable {
        message: String,
        kind: Option<LlmErrorKind>,
    },

    #[error("Consultation already finalized; start a new session")]
    AlreadyFinalized,

    #[error("Consultation has not produced a prescription yet")]
    NotFinalized,

    #[error("Prescription rendering failed: {0}")]
    RenderFailed(String),

    #[error("Utterance is empty")]
    EmptyUtterance,
}

impl ConsultError {
    pub fn model_unavailable(message: impl Into<String>, kind: Option<LlmErrorKind>) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
            kind,
        }
    }

    /// Retrying the same utterance may succeed. False for rejected credentials
    /// and rejected requests.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ModelUnavailable { kind, .. } => kind.map_or(true, LlmErrorKind::is_retryable),
            _ => false,
        }
    }

    /// Short message suitable for showing to the patient or operator
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => {
                "The AI doctor is not configured. Ask the operator to set the model API key."
            }
            Self::ModelUnavailable {
                kind: Some(LlmErrorKind::Auth),
                ..
            } => {
                "The AI doctor rejected its credentials. Ask the operator to check the model API key."
            }
            Self::ModelUnavailable {
                kind: Some(LlmErrorKind::InvalidRequest),
                ..
            } => {
                "The AI doctor could not process this consultation. Ask the operator to check the model settings."
            }
            Self::ModelUnavailable { .. } => {
                "The AI doctor is temporarily unavailable. Please send your message again."
            }
            Self::AlreadyFinalized => {
                "This consultation is complete. Start a new consultation to continue."
            }
            Self::NotFinalized => {
                "The prescription is not ready yet. Please continue the consultation."
            }
            Self::RenderFailed(_) => {
                "The prescription could not be generated as a PDF. Please try again."
            }
            Self::EmptyUtterance => "Please describe your symptoms before sending.",
        }
    }
}

impl From<TransitionError> for ConsultError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyFinalized => Self::AlreadyFinalized,
            TransitionError::EmptyUtterance => Self::EmptyUtterance,
        }
    }
}
