//! Patient profile and consultation language

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Locale used for transcription when the language has no dedicated one
pub const DEFAULT_LOCALE: &str = "en-IN";

/// Language the doctor should answer in
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
    /// Any other language name; passed to the model verbatim
    Other(String),
}

impl Language {
    pub fn name(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
            Language::Other(name) => name,
        }
    }

    /// BCP-47 locale for speech recognition
    pub fn locale(&self) -> &'static str {
        match self {
            Language::English | Language::Other(_) => DEFAULT_LOCALE,
            Language::Hindi => "hi-IN",
            Language::Telugu => "te-IN",
        }
    }

    /// Whether replies may use a script the built-in PDF fonts cannot draw.
    /// Unrecognized languages are assumed to.
    pub fn needs_unicode_font(&self) -> bool {
        !matches!(self, Language::English)
    }

    /// ISO 639-1 code derived from the transcription locale
    pub fn iso_code(&self) -> &'static str {
        match self {
            Language::English | Language::Other(_) => "en",
            Language::Hindi => "hi",
            Language::Telugu => "te",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("language name must not be empty")]
pub struct EmptyLanguage;

impl FromStr for Language {
    type Err = EmptyLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyLanguage);
        }
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "english" | "en" => Language::English,
            "hindi" | "hi" => Language::Hindi,
            "telugu" | "te" => Language::Telugu,
            _ => Language::Other(trimmed.to_string()),
        })
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.name().to_string()
    }
}

impl TryFrom<String> for Language {
    type Error = EmptyLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Registration details for one patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    /// Weight in kilograms, as entered
    pub weight: String,
    pub allergies: String,
    pub language: Language,
}

impl PatientProfile {
    /// Allergies as shown to the model; blank input means none were reported
    pub fn allergies_or_none(&self) -> &str {
        let trimmed = self.allergies.trim();
        if trimmed.is_empty() {
            "none reported"
        } else {
            trimmed
        }
    }
}
