//! Pure state transition function

use super::{ConversationState, Effect, Event, Operation, Phase};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Run already finished")]
    AlreadyTerminal,
    #[error("Operation already set to {0}")]
    OperationAlreadySet(Operation),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same state and event it always produces the same result and
/// performs no I/O. Handlers run as effects; their outcomes come back as
/// `HandlerCompleted` events.
pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        (Phase::Terminal, _) => Err(TransitionError::AlreadyTerminal),

        // Entry produced nothing: end without dispatch or reply
        (Phase::Entry, Event::Classified { raw }) if raw.trim().is_empty() => {
            let mut next = state.clone();
            next.phase = Phase::Terminal;
            Ok(TransitionResult::new(next).with_effect(Effect::LogIncompleteRun))
        }

        (Phase::Entry, Event::Classified { raw }) => {
            let operation = Operation::classify(&raw);
            let next = dispatch(state, operation, Some(raw))?;
            Ok(TransitionResult::new(next).with_effect(Effect::run_handler(operation)))
        }

        // Port failure at entry is treated like garbled output
        (Phase::Entry, Event::ClassificationFailed { .. }) => {
            let next = dispatch(state, Operation::Unknown, None)?;
            Ok(TransitionResult::new(next).with_effect(Effect::run_handler(Operation::Unknown)))
        }

        (phase, Event::HandlerCompleted { outcome }) if phase.is_handler() => {
            if outcome.phase() != phase {
                return Err(TransitionError::InvalidTransition(format!(
                    "{:?} outcome in {phase:?}",
                    outcome.phase()
                )));
            }
            let operation = state.operation.ok_or_else(|| {
                TransitionError::InvalidTransition(format!("{phase:?} without an operation"))
            })?;
            let mut next = state.clone().reduce(outcome);
            next.phase = Phase::Terminal;
            Ok(TransitionResult::new(next).with_effect(Effect::RunComplete { operation }))
        }

        (phase, Event::Classified { .. } | Event::ClassificationFailed { .. }) => {
            match state.operation {
                Some(operation) => Err(TransitionError::OperationAlreadySet(operation)),
                None => Err(TransitionError::InvalidTransition(format!(
                    "classification in {phase:?}"
                ))),
            }
        }

        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in {phase:?}"
        ))),
    }
}

fn dispatch(
    state: &ConversationState,
    operation: Operation,
    raw: Option<String>,
) -> Result<ConversationState, TransitionError> {
    if let Some(existing) = state.operation {
        return Err(TransitionError::OperationAlreadySet(existing));
    }
    let mut next = state.clone();
    next.messages.extend(raw);
    next.operation = Some(operation);
    next.phase = operation.phase();
    Ok(next)
}
