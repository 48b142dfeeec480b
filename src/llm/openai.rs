//! `OpenAI`-compatible chat completions (Groq and `OpenAI`)

use super::types::{LlmMessage, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService, Provider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Models reachable through a chat/completions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatModel {
    // Groq hosted
    Llama31Instant,
    Llama33Versatile,
    Llama3Legacy,
    // OpenAI
    GPT4oMini,
    GPT4o,
}

impl ChatModel {
    pub fn api_name(self) -> &'static str {
        match self {
            ChatModel::Llama31Instant => "llama-3.1-8b-instant",
            ChatModel::Llama33Versatile => "llama-3.3-70b-versatile",
            ChatModel::Llama3Legacy => "llama3-70b-8192",
            ChatModel::GPT4oMini => "gpt-4o-mini",
            ChatModel::GPT4o => "gpt-4o",
        }
    }

    pub fn provider(self) -> Provider {
        match self {
            ChatModel::Llama31Instant | ChatModel::Llama33Versatile | ChatModel::Llama3Legacy => {
                Provider::Groq
            }
            ChatModel::GPT4oMini | ChatModel::GPT4o => Provider::OpenAI,
        }
    }
}

/// OpenAI-compatible service implementation
pub struct ChatCompletionsService {
    client: Client,
    api_key: String,
    model: ChatModel,
    base_url: String,
}

impl ChatCompletionsService {
    pub fn new(api_key: String, model: ChatModel, gateway: Option<&str>) -> Result<Self, LlmError> {
        let base_url = chat_endpoint(model.provider(), gateway);

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn translate_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }

        messages.extend(request.messages.iter().map(translate_message));

        ChatRequest {
            model: self.model.api_name().to_string(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }
}

/// Resolve the chat/completions URL for a provider, honouring a gateway prefix
fn chat_endpoint(provider: Provider, gateway: Option<&str>) -> String {
    match (gateway, provider) {
        (Some(gw), Provider::Groq) => {
            format!("{}/groq/openai/v1/chat/completions", gw.trim_end_matches('/'))
        }
        (Some(gw), Provider::OpenAI) => {
            format!("{}/openai/v1/chat/completions", gw.trim_end_matches('/'))
        }
        (None, Provider::Groq) => "https://api.groq.com/openai/v1/chat/completions".to_string(),
        (None, Provider::OpenAI) => "https://api.openai.com/v1/chat/completions".to_string(),
    }
}

fn translate_message(msg: &LlmMessage) -> ChatMessage {
    let role = match msg.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };
    ChatMessage {
        role: role.to_string(),
        content: Some(msg.text.clone()),
    }
}

fn normalize_response(resp: ChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::malformed("No choices in response"))?;

    let text = choice.message.content.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(LlmError::malformed("Response contained no text"));
    }

    let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
        input_tokens: u64::from(u.prompt_tokens),
        output_tokens: u64::from(u.completion_tokens),
    });

    Ok(LlmResponse { text, usage })
}

fn classify_status(status: reqwest::StatusCode, message: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
        400 | 404 | 422 => LlmError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl LlmService for ChatCompletionsService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let chat_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ChatErrorResponse>(&body)
                .map_or(body, |r| r.error.message);
            return Err(classify_status(status, &message));
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {e}")))?;

        normalize_response(chat_response)
    }

    fn model_id(&self) -> &str {
        self.model.api_name()
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}
