//! System instruction and request construction

use super::profile::{Language, PatientProfile};
use super::sentinel::SENTINEL;
use super::state::{Session, Turn};
use crate::config::ConsultConfig;
use crate::llm::{LlmMessage, LlmRequest};
use std::fmt::Write;

/// Behavioural rules for the simulated doctor
const RULES: &str = r"You are a professional medical doctor conducting a consultation.

Rules:
- Ask ONLY one medical question at a time.
- Ask relevant follow-up questions based on the symptoms described.
- Never repeat a question you have already asked in this conversation.
- Be polite, calm, and professional.
- When enough information is collected, clearly provide a section that starts with the heading";

const FINAL_SECTIONS: &[&str] = &[
    "Diagnosis",
    "Medicines (with dosage & duration)",
    "Additional Instructions",
    "Warning signs",
    "Follow-up advice",
];

/// Build the single system instruction embedding profile and language
pub fn system_instruction(profile: &PatientProfile, language: &Language) -> String {
    let mut prompt = String::from(RULES);
    let _ = writeln!(prompt, " {SENTINEL} and contains:");
    for section in FINAL_SECTIONS {
        let _ = writeln!(prompt, "- {section}");
    }

    let _ = write!(
        prompt,
        "\nRespond in {language}. Keep the heading {SENTINEL} in English.\n\n\
         Patient Details:\n\
         Name: {}\n\
         Age: {}\n\
         Gender: {}\n\
         Weight: {} kg\n\
         Allergies: {}\n",
        profile.name,
        profile.age,
        profile.gender,
        profile.weight,
        profile.allergies_or_none(),
    );

    prompt
}

/// Assemble the model request for the next doctor turn
pub fn build_request(
    session: &Session,
    utterance: &str,
    language: &Language,
    config: &ConsultConfig,
) -> LlmRequest {
    let mut messages: Vec<LlmMessage> =
        session.transcript().iter().map(Turn::to_message).collect();
    messages.push(LlmMessage::user(utterance));

    LlmRequest {
        system: Some(system_instruction(session.profile(), language)),
        messages,
        max_tokens: Some(config.max_tokens),
        temperature: Some(config.temperature),
    }
}
