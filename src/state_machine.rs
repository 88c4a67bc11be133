//! Request routing state machine
//!
//! Elm-style: a pure `transition` over `ConversationState`, with handler
//! invocations returned as effects for the orchestrator to run.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConversationState, HandlerOutcome, Operation, Phase, Role, Turn};
pub use transition::{transition, TransitionError, TransitionResult};
