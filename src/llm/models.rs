//! Centralized model definitions for all generation providers

use super::{LlmService, OpenAIService};
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn chat_completions_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "llama3-70b-8192")
    pub id: &'static str,
    pub provider: Provider,
    /// API name sent to the provider
    pub api_name: &'static str,
    pub description: &'static str,
}

impl ModelDef {
    /// Build the service for this model
    pub fn create(
        &self,
        api_key: &str,
        gateway: Option<&str>,
    ) -> Result<Arc<dyn LlmService>, String> {
        if api_key.is_empty() {
            return Err(format!(
                "{} requires {} or gateway",
                self.id,
                self.provider.api_key_env_var()
            ));
        }
        let service = OpenAIService::new(
            api_key.to_string(),
            self.provider,
            self.api_name,
            self.id,
            gateway,
        )
        .map_err(|e| e.message)?;
        Ok(Arc::new(service))
    }
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        // Groq-hosted models
        ModelDef {
            id: "llama3-8b-8192",
            provider: Provider::Groq,
            api_name: "llama3-8b-8192",
            description: "Llama 3 8B (fast routing and short replies)",
        },
        ModelDef {
            id: "llama3-70b-8192",
            provider: Provider::Groq,
            api_name: "llama3-70b-8192",
            description: "Llama 3 70B (contract drafting)",
        },
        ModelDef {
            id: "llama-3.3-70b-versatile",
            provider: Provider::Groq,
            api_name: "llama-3.3-70b-versatile",
            description: "Llama 3.3 70B versatile",
        },
        // OpenAI models
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            api_name: "gpt-4o-mini",
            description: "GPT-4o mini (fast, efficient)",
        },
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            api_name: "gpt-4o",
            description: "GPT-4o (balanced performance)",
        },
    ]
}
