//! Model registry for managing available generation providers

use super::{all_models, LlmService, LoggingService, Provider};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_ROUTER_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_DRAFTER_MODEL: &str = "llama3-70b-8192";

/// Configuration for generation providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible gateway base URL (e.g., `http://localhost:4000/v1`)
    pub gateway: Option<String>,
    /// Model used for classification and short conversational replies
    pub router_model: Option<String>,
    /// Model used for contract drafting
    pub drafter_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            groq_api_key: var("GROQ_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            gateway: var("LLM_BASE_URL"),
            router_model: var("CONTRAKT_ROUTER_MODEL"),
            drafter_model: var("CONTRAKT_DRAFTER_MODEL"),
        }
    }

    /// True when at least one generation credential is present
    pub fn has_credentials(&self) -> bool {
        self.groq_api_key.is_some() || self.openai_api_key.is_some()
    }

    fn key_for(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::Groq => self.groq_api_key.as_ref(),
            Provider::OpenAI => self.openai_api_key.as_ref(),
        }
    }
}

/// Registry of available generation models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    router_model: String,
    drafter_model: String,
}

impl ModelRegistry {
    /// Create an empty registry for testing purposes
    #[cfg(test)]
    pub fn new_empty() -> Self {
        Self {
            services: HashMap::new(),
            router_model: "test-router".to_string(),
            drafter_model: "test-drafter".to_string(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            let api_key = if config.gateway.is_some() {
                // The gateway handles authentication; forward whichever key we have
                config
                    .key_for(model_def.provider)
                    .cloned()
                    .unwrap_or_else(|| "implicit".to_string())
            } else {
                match config.key_for(model_def.provider) {
                    Some(key) => key.clone(),
                    None => continue,
                }
            };

            match model_def.create(&api_key, config.gateway.as_deref()) {
                Ok(service) => {
                    services.insert(
                        model_def.id.to_string(),
                        Arc::new(LoggingService::new(service)),
                    );
                }
                Err(e) => tracing::warn!(model = model_def.id, error = %e, "Skipping model"),
            }
        }

        let router_model =
            Self::pick(&services, config.router_model.as_deref(), DEFAULT_ROUTER_MODEL);
        let drafter_model =
            Self::pick(&services, config.drafter_model.as_deref(), DEFAULT_DRAFTER_MODEL);

        Self {
            services,
            router_model,
            drafter_model,
        }
    }

    /// Register a service under an explicit ID
    #[cfg(test)]
    pub fn insert(&mut self, model_id: impl Into<String>, service: Arc<dyn LlmService>) {
        self.services.insert(model_id.into(), service);
    }

    /// Choose the configured model, else the preferred default, else any available model
    fn pick(
        services: &HashMap<String, Arc<dyn LlmService>>,
        configured: Option<&str>,
        preferred: &str,
    ) -> String {
        configured
            .map(String::from)
            .or_else(|| {
                if services.contains_key(preferred) {
                    Some(preferred.to_string())
                } else {
                    let mut ids: Vec<_> = services.keys().cloned().collect();
                    ids.sort();
                    ids.into_iter().next()
                }
            })
            .unwrap_or_else(|| preferred.to_string())
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    pub fn router(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.router_model)
    }

    pub fn drafter(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.drafter_model)
    }

    pub fn router_model_id(&self) -> &str {
        &self.router_model
    }

    pub fn drafter_model_id(&self) -> &str {
        &self.drafter_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
