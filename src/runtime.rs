//! Orchestrator runtime
//!
//! Executes the routing machine's effects against the generation,
//! retrieval and contribution ports.

mod executor;
pub mod handlers;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{Orchestrator, OrchestratorError};
pub use traits::*;

use std::sync::Arc;

/// Orchestrator over shared trait-object ports; production wiring and API tests both use it
pub type DynOrchestrator = Orchestrator<
    Arc<dyn GenerationPort>,
    Arc<dyn RetrievalPort>,
    Arc<dyn ContributionSink>,
>;
