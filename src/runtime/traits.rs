//! Trait abstractions for orchestrator I/O
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::contribution::{contribution_id, ContributionError};
use crate::db::{ContributionRecord, Database, StoredContribution};
use crate::llm::{LlmError, LlmMessage, LlmRequest, ModelRegistry, SystemContent};
use crate::prompts::render;
use crate::retrieval::{Passage, RetrievalError, SupabaseRetriever};
use crate::state_machine::{Role, Turn};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which configured model serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Classification and short conversational replies
    Fast,
    /// Contract drafting
    Drafting,
}

/// One generation call: instructions (with `{name}` placeholders), prior
/// turns and the user's input
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub history: Vec<Turn>,
    pub input: String,
    pub bindings: BTreeMap<String, String>,
    pub temperature: f32,
    pub tier: ModelTier,
}

impl GenerationRequest {
    pub fn new(instructions: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            history: Vec::new(),
            input: input.into(),
            bindings: BTreeMap::new(),
            temperature: 0.7,
            tier: ModelTier::Fast,
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: &[Turn]) -> Self {
        self.history = history.to_vec();
        self
    }

    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    /// Instructions with bindings substituted
    pub fn rendered_instructions(&self) -> String {
        render(&self.instructions, &self.bindings)
    }

    /// Translate into a provider-neutral chat request
    pub fn to_llm_request(&self) -> LlmRequest {
        let mut messages: Vec<LlmMessage> = self
            .history
            .iter()
            .map(|turn| match turn.role {
                Role::Human => LlmMessage::user(&turn.text),
                Role::Ai => LlmMessage::assistant(&turn.text),
            })
            .collect();
        messages.push(LlmMessage::user(&self.input));

        LlmRequest {
            system: vec![SystemContent::new(self.rendered_instructions())],
            messages,
            max_tokens: None,
            temperature: Some(self.temperature),
        }
    }
}

/// Text generation
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

/// Reference-document retrieval
#[async_trait]
pub trait RetrievalPort: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError>;
}

/// Durable storage for structured contributions
#[async_trait]
pub trait ContributionSink: Send + Sync {
    /// Store the record under a fresh id, returning the stored form
    async fn persist(
        &self,
        record: &ContributionRecord,
    ) -> Result<StoredContribution, ContributionError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: GenerationPort + ?Sized> GenerationPort for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<T: RetrievalPort + ?Sized> RetrievalPort for Arc<T> {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        (**self).retrieve(query).await
    }
}

#[async_trait]
impl<T: ContributionSink + ?Sized> ContributionSink for Arc<T> {
    async fn persist(
        &self,
        record: &ContributionRecord,
    ) -> Result<StoredContribution, ContributionError> {
        (**self).persist(record).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use ModelRegistry as GenerationPort
pub struct RegistryGenerator {
    registry: Arc<ModelRegistry>,
}

impl RegistryGenerator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl GenerationPort for RegistryGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let llm = match request.tier {
            ModelTier::Fast => self.registry.router(),
            ModelTier::Drafting => self.registry.drafter(),
        }
        .ok_or_else(|| LlmError::network("No LLM available"))?;

        let response = llm.complete(&request.to_llm_request()).await?;
        Ok(response.text())
    }
}

#[async_trait]
impl RetrievalPort for SupabaseRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        self.search(query).await
    }
}

/// Adapter to use Database as ContributionSink
#[derive(Clone)]
pub struct DatabaseContributionSink {
    db: Database,
}

impl DatabaseContributionSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContributionSink for DatabaseContributionSink {
    async fn persist(
        &self,
        record: &ContributionRecord,
    ) -> Result<StoredContribution, ContributionError> {
        let now = Utc::now();
        let id = contribution_id(now);
        Ok(self.db.insert_contribution(&id, record, now)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ContributionKind, Priority};
    use crate::llm::{ContentBlock, LlmResponse, LlmService, MessageRole};
    use std::sync::Mutex;

    #[test]
    fn test_to_llm_request_orders_history_then_input() {
        let request = GenerationRequest::new("Use {context}.", "Draft an NDA")
            .with_history(&[Turn::human("Hi"), Turn::ai("Hello!")])
            .bind("context", "the template")
            .with_temperature(0.4);

        let llm = request.to_llm_request();
        assert_eq!(llm.system[0].text, "Use the template.");
        assert_eq!(llm.temperature, Some(0.4));
        let roles: Vec<_> = llm.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(
            llm.messages[2].content,
            vec![ContentBlock::text("Draft an NDA")]
        );
    }

    struct EchoService {
        id: &'static str,
        seen: Mutex<Vec<LlmRequest>>,
    }

    #[async_trait]
    impl LlmService for EchoService {
        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(LlmResponse::from_text(self.id))
        }

        fn model_id(&self) -> &str {
            self.id
        }
    }

    #[tokio::test]
    async fn test_registry_generator_picks_tier() {
        let mut registry = ModelRegistry::new_empty();
        registry.insert(
            "test-router",
            Arc::new(EchoService {
                id: "router",
                seen: Mutex::new(vec![]),
            }),
        );
        registry.insert(
            "test-drafter",
            Arc::new(EchoService {
                id: "drafter",
                seen: Mutex::new(vec![]),
            }),
        );
        let generator = RegistryGenerator::new(Arc::new(registry));

        let fast = GenerationRequest::new("x", "y");
        assert_eq!(generator.generate(&fast).await.unwrap(), "router");
        let drafting = fast.with_tier(ModelTier::Drafting);
        assert_eq!(generator.generate(&drafting).await.unwrap(), "drafter");
    }

    #[tokio::test]
    async fn test_registry_generator_without_models() {
        let generator = RegistryGenerator::new(Arc::new(ModelRegistry::new_empty()));
        let err = generator
            .generate(&GenerationRequest::new("x", "y"))
            .await
            .unwrap_err();
        assert!(err.kind.is_retryable());
    }

    #[tokio::test]
    async fn test_database_sink_assigns_ids() {
        let db = Database::open_in_memory().unwrap();
        let sink = DatabaseContributionSink::new(db.clone());
        let record = ContributionRecord {
            kind: ContributionKind::FeatureSuggestion,
            description: "Dark mode".to_string(),
            details: "Add a dark theme".to_string(),
            impact: "Comfort".to_string(),
            priority: Priority::Low,
        };

        let stored = sink.persist(&record).await.unwrap();
        assert!(stored.id.starts_with("contribution_"));
        assert_eq!(db.get_contribution(&stored.id).unwrap().record, record);
    }
}
