//! Events that drive the routing machine

use super::state::HandlerOutcome;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Entry classification returned (possibly empty, possibly garbled) text
    Classified { raw: String },
    /// Entry classification call failed at the generation port
    ClassificationFailed { message: String },
    /// The dispatched handler finished
    HandlerCompleted { outcome: HandlerOutcome },
}
