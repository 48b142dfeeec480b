//! Events that can occur in a consultation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The model answered the pending utterance
    DoctorReply { utterance: String, reply: String },
}
