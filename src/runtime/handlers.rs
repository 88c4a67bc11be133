//! Terminal handlers, one per routing phase
//!
//! Every handler absorbs port and parse failures into a fixed reply. The one
//! exception is a template position outside the catalog, which is returned
//! to the orchestrator as an error.

use super::traits::{ContributionSink, GenerationPort, GenerationRequest, ModelTier, RetrievalPort};
use crate::artifact::extract_artifact;
use crate::contribution::{parse_contribution, ContributionError};
use crate::llm::LlmError;
use crate::prompts::{
    CONTRACT_CONTEXT_SUFFIX, CONTRACT_SYSTEM_PROMPT, CONTRIBUTE_PROMPT, CONVERSATIONAL_PROMPT,
    INFO_PROMPT, ROUTER_PROMPT, TEMPLATE_SELECTOR_PROMPT,
};
use crate::retrieval::{join_passages, RetrievalError};
use crate::state_machine::{ConversationState, HandlerOutcome};
use crate::templates::{TemplateError, TemplateIndex, TemplateSelection};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classification and conversational replies
pub const CONVERSATIONAL_TEMPERATURE: f32 = 0.7;
/// Contract drafting; lower variance keeps the fenced block parseable
pub const DRAFTING_TEMPERATURE: f32 = 0.4;

pub const GENERATION_APOLOGY: &str =
    "I'm sorry, I couldn't process your request right now. Please try again in a moment.";
pub const CONTRIBUTION_THANKS: &str =
    "Thank you for your contribution! Your report has been recorded and will be reviewed by our team.";
pub const CONTRIBUTION_APOLOGY: &str =
    "I'm sorry, but there was an error processing your contribution. Please try again.";
pub const CONTRACT_APOLOGY: &str =
    "I apologize, but I encountered an error while generating the contract. Please try again later.";

/// Entry classification request
pub fn classification_request(state: &ConversationState) -> GenerationRequest {
    GenerationRequest::new(ROUTER_PROMPT, state.input.clone())
        .with_history(&state.history)
        .with_temperature(CONVERSATIONAL_TEMPERATURE)
}

pub async fn info<G: GenerationPort + ?Sized>(
    generator: &G,
    state: &ConversationState,
) -> HandlerOutcome {
    let (reply, raw) = converse(generator, state, INFO_PROMPT).await;
    HandlerOutcome::Info { reply, raw }
}

pub async fn fallback<G: GenerationPort + ?Sized>(
    generator: &G,
    state: &ConversationState,
) -> HandlerOutcome {
    let (reply, raw) = converse(generator, state, CONVERSATIONAL_PROMPT).await;
    HandlerOutcome::Fallback { reply, raw }
}

async fn converse<G: GenerationPort + ?Sized>(
    generator: &G,
    state: &ConversationState,
    instructions: &str,
) -> (String, Option<String>) {
    let request = GenerationRequest::new(instructions, state.input.clone())
        .with_history(&state.history)
        .with_temperature(CONVERSATIONAL_TEMPERATURE);

    match generator.generate(&request).await {
        Ok(text) => (text.clone(), Some(text)),
        Err(e) => {
            tracing::error!(error = %e, "Conversational generation failed");
            (GENERATION_APOLOGY.to_string(), None)
        }
    }
}

pub async fn contribution<G, C>(
    generator: &G,
    sink: &C,
    state: &ConversationState,
) -> HandlerOutcome
where
    G: GenerationPort + ?Sized,
    C: ContributionSink + ?Sized,
{
    let request = GenerationRequest::new(CONTRIBUTE_PROMPT, state.input.clone())
        .with_history(&state.history)
        .with_temperature(CONVERSATIONAL_TEMPERATURE);

    let raw = match generator.generate(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(error = %e, "Contribution structuring failed");
            return HandlerOutcome::Contribution {
                reply: CONTRIBUTION_APOLOGY.to_string(),
                raw: None,
            };
        }
    };

    let stored = match parse_contribution(&raw) {
        Ok(record) => sink.persist(&record).await,
        Err(e) => Err(e),
    };

    match stored {
        Ok(stored) => {
            tracing::info!(id = %stored.id, kind = %stored.record.kind, "Contribution recorded");
            HandlerOutcome::Contribution {
                reply: CONTRIBUTION_THANKS.to_string(),
                raw: Some(raw),
            }
        }
        Err(e) => {
            match &e {
                ContributionError::Parse(_) => {
                    tracing::warn!(error = %e, raw = %raw, "Unparseable contribution");
                }
                ContributionError::Persist(_) => {
                    tracing::error!(error = %e, "Contribution not persisted");
                }
            }
            HandlerOutcome::Contribution {
                reply: CONTRIBUTION_APOLOGY.to_string(),
                raw: Some(raw),
            }
        }
    }
}

/// Failures inside the drafting pipeline
#[derive(Debug, Error)]
enum DraftError {
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Template selector returned nothing")]
    EmptySelection,
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Template selection, retrieval, drafting and artifact extraction.
///
/// `Err` only for a template position outside the catalog.
pub async fn contract<G, R>(
    generator: &G,
    retriever: &R,
    templates: &TemplateIndex,
    state: &ConversationState,
    now: DateTime<Utc>,
) -> Result<HandlerOutcome, TemplateError>
where
    G: GenerationPort + ?Sized,
    R: RetrievalPort + ?Sized,
{
    match draft(generator, retriever, templates, state).await {
        Ok(text) => {
            let (reply, artifact) = extract_artifact(&text, now);
            tracing::info!(has_artifact = artifact.is_some(), "Contract reply generated");
            Ok(HandlerOutcome::Contract {
                reply,
                raw: Some(text),
                artifact,
            })
        }
        Err(DraftError::Template(e @ TemplateError::OutOfRange { .. })) => Err(e),
        Err(e) => {
            tracing::error!(error = %e, "Contract generation failed");
            Ok(HandlerOutcome::Contract {
                reply: CONTRACT_APOLOGY.to_string(),
                raw: None,
                artifact: None,
            })
        }
    }
}

async fn draft<G, R>(
    generator: &G,
    retriever: &R,
    templates: &TemplateIndex,
    state: &ConversationState,
) -> Result<String, DraftError>
where
    G: GenerationPort + ?Sized,
    R: RetrievalPort + ?Sized,
{
    let selector = GenerationRequest::new(TEMPLATE_SELECTOR_PROMPT, state.input.clone())
        .bind("catalog", templates.listing())
        .with_temperature(CONVERSATIONAL_TEMPERATURE);
    let selected = generator.generate(&selector).await?;
    tracing::debug!(selection = %selected.trim(), "Template selector answered");

    let selection = TemplateSelection::parse(&selected).ok_or(DraftError::EmptySelection)?;
    let template = templates.resolve(&selection)?;

    let passages = retriever.retrieve(&state.input).await?;
    let context = format!(
        "{}\n\nContract Template:\n{template}",
        join_passages(&passages)
    );

    let request = GenerationRequest::new(
        format!("{CONTRACT_SYSTEM_PROMPT}\n\n{CONTRACT_CONTEXT_SUFFIX}"),
        state.input.clone(),
    )
    .with_history(&state.history)
    .bind("context", context)
    .with_temperature(DRAFTING_TEMPERATURE)
    .with_tier(ModelTier::Drafting);

    Ok(generator.generate(&request).await?)
}
