//! HTTP API for Contrakt

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::db::Database;
use crate::runtime::DynOrchestrator;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DynOrchestrator>,
    pub db: Database,
    /// Per-invocation time budget
    pub invocation_timeout: Duration,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<DynOrchestrator>,
        db: Database,
        invocation_timeout: Duration,
    ) -> Self {
        Self {
            orchestrator,
            db,
            invocation_timeout,
        }
    }
}
