//! Orchestrator: drives the routing machine against injected ports

use super::handlers;
use super::traits::{ContributionSink, GenerationPort, RetrievalPort};
use crate::state_machine::{transition, ConversationState, Effect, Event, Phase, Turn};
use crate::templates::{TemplateError, TemplateIndex};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Errors an invocation may raise to its caller
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Template lookup failed: {0}")]
    TemplateLookup(#[from] TemplateError),
    #[error(transparent)]
    Transition(#[from] crate::state_machine::TransitionError),
}

/// Generic orchestrator that can work with any generation, retrieval and
/// contribution-sink implementations.
///
/// Holds no per-run state; concurrent invocations share only the ports and
/// the template index.
pub struct Orchestrator<G, R, C>
where
    G: GenerationPort + 'static,
    R: RetrievalPort + 'static,
    C: ContributionSink + 'static,
{
    generator: Arc<G>,
    retriever: Arc<R>,
    sink: Arc<C>,
    templates: Arc<TemplateIndex>,
}

impl<G, R, C> Orchestrator<G, R, C>
where
    G: GenerationPort + 'static,
    R: RetrievalPort + 'static,
    C: ContributionSink + 'static,
{
    pub fn new(generator: G, retriever: R, sink: C, templates: Arc<TemplateIndex>) -> Self {
        Self {
            generator: Arc::new(generator),
            retriever: Arc::new(retriever),
            sink: Arc::new(sink),
            templates,
        }
    }

    pub fn templates(&self) -> &TemplateIndex {
        &self.templates
    }

    /// Process one user message end-to-end
    pub async fn invoke(
        &self,
        input: impl Into<String>,
        history: Vec<Turn>,
    ) -> Result<ConversationState, OrchestratorError> {
        self.run(ConversationState::new(input, history)).await
    }

    /// Drive `state` from `Entry` to `Terminal`
    pub async fn run(
        &self,
        state: ConversationState,
    ) -> Result<ConversationState, OrchestratorError> {
        let mut state = state;
        let mut pending = vec![self.classify(&state).await];

        while let Some(event) = pending.pop() {
            let result = transition(&state, event)?;
            state = result.new_state;
            for effect in result.effects {
                if let Some(next) = self.execute_effect(&state, effect).await? {
                    pending.push(next);
                }
            }
        }

        Ok(state)
    }

    async fn classify(&self, state: &ConversationState) -> Event {
        let request = handlers::classification_request(state);
        match self.generator.generate(&request).await {
            Ok(raw) => {
                tracing::debug!(raw = %raw.trim(), "Entry classification");
                Event::Classified { raw }
            }
            Err(e) => {
                tracing::error!(error = %e, "Entry classification failed, routing to fallback");
                Event::ClassificationFailed { message: e.message }
            }
        }
    }

    async fn execute_effect(
        &self,
        state: &ConversationState,
        effect: Effect,
    ) -> Result<Option<Event>, OrchestratorError> {
        match effect {
            Effect::RunHandler { phase } => {
                let outcome = match phase {
                    Phase::Info => handlers::info(self.generator.as_ref(), state).await,
                    Phase::Contribution => {
                        handlers::contribution(self.generator.as_ref(), self.sink.as_ref(), state)
                            .await
                    }
                    Phase::ContractGeneration => {
                        handlers::contract(
                            self.generator.as_ref(),
                            self.retriever.as_ref(),
                            &self.templates,
                            state,
                            Utc::now(),
                        )
                        .await?
                    }
                    Phase::Fallback | Phase::Entry | Phase::Terminal => {
                        handlers::fallback(self.generator.as_ref(), state).await
                    }
                };
                Ok(Some(Event::HandlerCompleted { outcome }))
            }

            Effect::LogIncompleteRun => {
                tracing::error!(
                    input_len = state.input.len(),
                    "Entry classification produced no content; run ends without a reply"
                );
                Ok(None)
            }

            Effect::RunComplete { operation } => {
                tracing::info!(
                    operation = %operation,
                    messages = state.messages.len(),
                    has_artifact = state.contract_artifact.is_some(),
                    "Invocation complete"
                );
                Ok(None)
            }
        }
    }
}
