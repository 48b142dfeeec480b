//! Consultation turn loop
//!
//! Implements the Elm Architecture pattern: a pure transition function over
//! `ConsultState`, with the driver performing the model call and applying the
//! resulting effects to the caller-owned `Session`.

mod driver;
mod effect;
mod event;
mod profile;
mod prompt;
mod sentinel;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use driver::{Advance, ConversationDriver};
pub use effect::Effect;
pub use event::Event;
pub use profile::{EmptyLanguage, Language, PatientProfile, DEFAULT_LOCALE};
pub use prompt::{build_request, system_instruction};
pub use sentinel::{extract_prescription, is_final_reply, SENTINEL};
pub use state::{ConsultState, Session, Speaker, Turn};
pub use transition::{check_utterance, transition, TransitionError, TransitionResult};

pub(crate) use transition::apply;
