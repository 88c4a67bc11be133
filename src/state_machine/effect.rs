//! Effects produced by state transitions

use super::state::{Operation, Phase};

/// Effects to be executed by the orchestrator after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the handler for the given phase
    RunHandler { phase: Phase },

    /// Entry produced no content; the run ends without a reply
    LogIncompleteRun,

    /// A handler finished and the run reached `Terminal`
    RunComplete { operation: Operation },
}

impl Effect {
    pub fn run_handler(operation: Operation) -> Self {
        Effect::RunHandler {
            phase: operation.phase(),
        }
    }
}
