//! Mock implementations for testing
//!
//! These mocks enable driver and finalizer tests without real I/O.

use crate::consultation::{apply, transition, Event, PatientProfile, Session};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::prescription::{PrescriptionDocument, PrescriptionRenderer, RenderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Delayed Mock LLM Service (for timeout testing)
// ============================================================================

/// Mock LLM service that sleeps before answering
pub struct DelayedMockLlmService {
    pub inner: MockLlmService,
    delay: Duration,
}

impl DelayedMockLlmService {
    pub fn new(model_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner: MockLlmService::new(model_id),
            delay,
        }
    }
}

#[async_trait]
impl LlmService for DelayedMockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        tokio::time::sleep(self.delay).await;
        self.inner.complete(request).await
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

// ============================================================================
// Renderers
// ============================================================================

/// Renderer that always fails
pub struct FailingRenderer;

impl PrescriptionRenderer for FailingRenderer {
    fn render(&self, _document: &PrescriptionDocument) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Save("disk full".to_string()))
    }
}

// ============================================================================
// Session fixtures
// ============================================================================

/// A session finalized by a single terminal doctor reply
pub fn finalized_session(profile: PatientProfile, reply: &str) -> Session {
    let mut session = Session::new(profile);
    let result = transition(
        session.state(),
        Event::DoctorReply {
            utterance: "that is all".to_string(),
            reply: reply.to_string(),
        },
    )
    .unwrap();
    apply(&mut session, result);
    assert!(session.is_finalized(), "reply was not terminal: {reply}");
    session
}
