//! Speech-to-text for spoken symptoms
//!
//! Transcription is best-effort. [`voice_to_text`] swallows every failure and
//! returns `None`, which callers treat as "ask the patient to type instead".

use crate::consultation::Language;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-large-v3";
const GROQ_TRANSCRIPTION_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("No audio supplied")]
    EmptyAudio,
    #[error("Transcription request failed: {0}")]
    Request(String),
    #[error("Transcription service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Could not parse transcription response: {0}")]
    Parse(String),
}

/// Converts recorded audio into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        language: &Language,
    ) -> Result<String, TranscriptionError>;
}

/// Whisper over an OpenAI-compatible `/audio/transcriptions` endpoint
pub struct WhisperTranscriber {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: impl Into<String>) -> Result<Self, TranscriptionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: GROQ_TRANSCRIPTION_URL.to_string(),
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        language: &Language,
    ) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        let file = Part::bytes(audio)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", language.iso_code())
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(TranscriptionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse =
            serde_json::from_str(&body).map_err(|e| TranscriptionError::Parse(e.to_string()))?;
        Ok(parsed.text)
    }
}

/// Transcribe audio, degrading every failure to `None`
pub async fn voice_to_text(
    transcriber: &dyn Transcriber,
    audio: Vec<u8>,
    language: &Language,
) -> Option<String> {
    match transcriber.transcribe(audio, language).await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                tracing::info!(locale = language.locale(), "Transcription recognized no speech");
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(e) => {
            tracing::warn!(locale = language.locale(), error = %e, "Transcription failed");
            None
        }
    }
}
