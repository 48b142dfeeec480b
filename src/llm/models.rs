//! Centralized model definitions for all LLM providers

use super::{ChatCompletionsService, ChatModel, LlmService};
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl Provider {
    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model ID as sent to the provider (e.g., "llama-3.1-8b-instant")
    pub id: &'static str,
    pub provider: Provider,
    /// Factory function to create the service
    pub factory: fn(&str, Option<&str>) -> Result<Arc<dyn LlmService>, String>,
}

fn build(
    model: ChatModel,
    api_key: &str,
    gateway: Option<&str>,
) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!(
            "{} requires {} or gateway",
            model.api_name(),
            model.provider().api_key_env_var()
        ));
    }
    let service = ChatCompletionsService::new(api_key.to_string(), model, gateway)
        .map_err(|e| e.message)?;
    Ok(Arc::new(service))
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "llama-3.1-8b-instant",
            provider: Provider::Groq,
            factory: |api_key, gateway| build(ChatModel::Llama31Instant, api_key, gateway),
        },
        ModelDef {
            id: "llama-3.3-70b-versatile",
            provider: Provider::Groq,
            factory: |api_key, gateway| build(ChatModel::Llama33Versatile, api_key, gateway),
        },
        ModelDef {
            id: "llama3-70b-8192",
            provider: Provider::Groq,
            factory: |api_key, gateway| build(ChatModel::Llama3Legacy, api_key, gateway),
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            factory: |api_key, gateway| build(ChatModel::GPT4oMini, api_key, gateway),
        },
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            factory: |api_key, gateway| build(ChatModel::GPT4o, api_key, gateway),
        },
    ]
}

/// Look up a model definition by ID
pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}
