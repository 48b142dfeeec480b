//! Med Consult - simulated doctor consultations over a hosted LLM
//!
//! A caller-owned [`Session`] is driven one patient utterance at a time by the
//! [`ConversationDriver`]. When the doctor's reply carries the final
//! prescription the session becomes terminal and the [`Finalizer`] renders it
//! to PDF.

pub mod config;
pub mod consultation;
pub mod db;
pub mod error;
pub mod llm;
pub mod prescription;
pub mod transcription;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ConsultConfig;
pub use consultation::{
    Advance, ConsultState, ConversationDriver, Language, PatientProfile, Session, Speaker, Turn,
};
pub use error::ConsultError;
pub use prescription::{Finalizer, PrintPdfRenderer, RenderedPrescription};
