//! Conversation driver: one model round per patient utterance

use super::profile::Language;
use super::prompt::build_request;
use super::sentinel::is_final_reply;
use super::state::Session;
use super::transition::{apply, check_utterance, transition};
use super::Event;
use crate::config::ConsultConfig;
use crate::error::ConsultError;
use crate::llm::{find_model, LlmErrorKind, LlmService, ModelRegistry};
use std::sync::Arc;
use tokio::time::timeout;

/// Outcome of one consultation round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// The doctor's reply, trimmed
    pub reply: String,
    /// Whether the reply carried the final prescription
    pub is_final: bool,
}

/// Drives a session through model calls.
///
/// The driver holds no per-session state; sessions are passed in by the
/// caller. `advance` takes `&mut Session`, so at most one model call can be in
/// flight for a given session.
pub struct ConversationDriver {
    llm: Option<Arc<dyn LlmService>>,
    config: ConsultConfig,
    unconfigured_reason: String,
}

impl ConversationDriver {
    pub fn new(llm: Arc<dyn LlmService>, config: ConsultConfig) -> Self {
        Self {
            llm: Some(llm),
            config,
            unconfigured_reason: String::new(),
        }
    }

    /// A driver that rejects every round with `NotConfigured`
    pub fn unconfigured(reason: impl Into<String>, config: ConsultConfig) -> Self {
        Self {
            llm: None,
            config,
            unconfigured_reason: reason.into(),
        }
    }

    /// Pick the configured model out of the registry
    pub fn from_registry(registry: &ModelRegistry, config: ConsultConfig) -> Self {
        if let Some(llm) = registry.get(&config.model) {
            return Self::new(llm, config);
        }

        let reason = match find_model(&config.model) {
            Some(def) => format!(
                "{} requires {} (or LLM_GATEWAY)",
                def.id,
                def.provider.api_key_env_var()
            ),
            None => format!("unknown model {}", config.model),
        };
        tracing::warn!(model = %config.model, reason = %reason, "Consultation model unavailable");
        Self::unconfigured(reason, config)
    }

    pub fn config(&self) -> &ConsultConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Produce the next doctor turn for `utterance`.
    ///
    /// On success the trimmed utterance and the reply are appended to the
    /// transcript in that order, and the session moves to `Finalized` when the
    /// reply contains the sentinel. On any error the session is left
    /// untouched, so the same utterance can be retried.
    pub async fn advance(
        &self,
        session: &mut Session,
        utterance: &str,
        language: &Language,
    ) -> Result<Advance, ConsultError> {
        let utterance = utterance.trim();
        check_utterance(session.state(), utterance)?;

        let Some(llm) = &self.llm else {
            return Err(ConsultError::NotConfigured(self.unconfigured_reason.clone()));
        };

        let request = build_request(session, utterance, language, &self.config);

        let response = match timeout(self.config.request_timeout, llm.complete(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(
                    session_id = %session.id(),
                    error = %e.message,
                    "Doctor turn failed"
                );
                return Err(ConsultError::model_unavailable(e.message, Some(e.kind)));
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %session.id(),
                    timeout_secs = self.config.request_timeout.as_secs_f64(),
                    "Doctor turn timed out"
                );
                return Err(ConsultError::model_unavailable(
                    format!(
                        "no reply within {:.1}s",
                        self.config.request_timeout.as_secs_f64()
                    ),
                    Some(LlmErrorKind::Network),
                ));
            }
        };

        let reply = response.text.trim().to_string();
        if reply.is_empty() {
            return Err(ConsultError::model_unavailable(
                "model returned an empty reply",
                Some(LlmErrorKind::Malformed),
            ));
        }

        let is_final = is_final_reply(&reply);
        let result = transition(
            session.state(),
            Event::DoctorReply {
                utterance: utterance.to_string(),
                reply: reply.clone(),
            },
        )?;
        apply(session, result);

        tracing::info!(
            session_id = %session.id(),
            turns = session.transcript().len(),
            is_final,
            "Doctor replied"
        );

        Ok(Advance { reply, is_final })
    }
}
