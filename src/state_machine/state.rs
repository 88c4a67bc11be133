//! Routing state types

use crate::artifact::ContractArtifact;
use serde::{Deserialize, Serialize};

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Human,
    #[serde(alias = "assistant")]
    Ai,
}

/// A prior (role, text) turn carried in by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            text: text.into(),
        }
    }
}

/// Routing decision produced by entry classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Contribute,
    Create,
    Info,
    Unknown,
}

impl Operation {
    /// Match precedence for classifier output
    pub const PRECEDENCE: [Operation; 4] = [
        Operation::Contribute,
        Operation::Create,
        Operation::Info,
        Operation::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Contribute => "contribute",
            Operation::Create => "create",
            Operation::Info => "info",
            Operation::Unknown => "unknown",
        }
    }

    /// Normalize untrusted classifier output into a routing decision.
    ///
    /// Substring containment, first match in `PRECEDENCE` order wins.
    /// Anything unrecognised routes to `Unknown`.
    pub fn classify(raw: &str) -> Operation {
        Self::PRECEDENCE
            .into_iter()
            .find(|op| raw.contains(op.as_str()))
            .unwrap_or(Operation::Unknown)
    }

    /// Handler phase this decision dispatches to
    pub fn phase(self) -> Phase {
        match self {
            Operation::Contribute => Phase::Contribution,
            Operation::Create => Phase::ContractGeneration,
            Operation::Info => Phase::Info,
            Operation::Unknown => Phase::Fallback,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a run in the routing machine.
///
/// `Entry -> {Info | Fallback | Contribution | ContractGeneration} -> Terminal`,
/// or `Entry -> Terminal` when classification produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Entry,
    Info,
    Fallback,
    Contribution,
    ContractGeneration,
    Terminal,
}

impl Phase {
    pub fn is_handler(self) -> bool {
        matches!(
            self,
            Phase::Info | Phase::Fallback | Phase::Contribution | Phase::ContractGeneration
        )
    }
}

/// What a terminal handler produced; merged into the state by [`ConversationState::reduce`]
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// `raw` is absent when the generation call itself failed
    Info {
        reply: String,
        raw: Option<String>,
    },
    Fallback {
        reply: String,
        raw: Option<String>,
    },
    Contribution {
        reply: String,
        /// Raw structuring output, kept for diagnostics even when parsing failed
        raw: Option<String>,
    },
    Contract {
        reply: String,
        raw: Option<String>,
        artifact: Option<ContractArtifact>,
    },
}

impl HandlerOutcome {
    /// The handler phase allowed to produce this outcome
    pub fn phase(&self) -> Phase {
        match self {
            HandlerOutcome::Info { .. } => Phase::Info,
            HandlerOutcome::Fallback { .. } => Phase::Fallback,
            HandlerOutcome::Contribution { .. } => Phase::Contribution,
            HandlerOutcome::Contract { .. } => Phase::ContractGeneration,
        }
    }
}

/// Per-turn unit of work. Created fresh for each user message and dropped
/// once the reply is returned; only `history` is carried forward.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationState {
    pub input: String,
    pub history: Vec<Turn>,
    /// Raw generation outputs of this invocation, append-only
    pub messages: Vec<String>,
    /// Write-once routing decision
    pub operation: Option<Operation>,
    /// Final reply, set by exactly one handler
    pub result: Option<String>,
    pub contract_artifact: Option<ContractArtifact>,
    pub phase: Phase,
}

impl ConversationState {
    pub fn new(input: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            input: input.into(),
            history,
            ..Default::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Fold a handler outcome into the state
    #[must_use]
    pub fn reduce(mut self, outcome: HandlerOutcome) -> Self {
        match outcome {
            HandlerOutcome::Info { reply, raw }
            | HandlerOutcome::Fallback { reply, raw }
            | HandlerOutcome::Contribution { reply, raw } => {
                self.messages.extend(raw);
                self.result = Some(reply);
            }
            HandlerOutcome::Contract {
                reply,
                raw,
                artifact,
            } => {
                self.messages.extend(raw);
                self.result = Some(reply);
                self.contract_artifact = artifact;
            }
        }
        self
    }

    /// History for the caller's next turn: prior turns plus this exchange.
    /// A run that produced no reply only records the user's message.
    pub fn next_history(&self) -> Vec<Turn> {
        let mut history = self.history.clone();
        history.push(Turn::human(self.input.clone()));
        if let Some(result) = &self.result {
            history.push(Turn::ai(result.clone()));
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exact_tokens() {
        assert_eq!(Operation::classify("contribute"), Operation::Contribute);
        assert_eq!(Operation::classify("create"), Operation::Create);
        assert_eq!(Operation::classify("info"), Operation::Info);
        assert_eq!(Operation::classify("unknown"), Operation::Unknown);
    }

    #[test]
    fn test_classify_precedence_and_garbage() {
        assert_eq!(Operation::classify("create or contribute?"), Operation::Contribute);
        assert_eq!(Operation::classify("info: create"), Operation::Create);
        assert_eq!(Operation::classify("\"info\"."), Operation::Info);
        assert_eq!(Operation::classify("banana"), Operation::Unknown);
        assert_eq!(Operation::classify(""), Operation::Unknown);
        // Matching is case-sensitive
        assert_eq!(Operation::classify("CREATE"), Operation::Unknown);
    }

    #[test]
    fn test_operation_phases() {
        assert_eq!(Operation::Contribute.phase(), Phase::Contribution);
        assert_eq!(Operation::Create.phase(), Phase::ContractGeneration);
        assert_eq!(Operation::Info.phase(), Phase::Info);
        assert_eq!(Operation::Unknown.phase(), Phase::Fallback);
        assert!(Operation::PRECEDENCE.iter().all(|op| op.phase().is_handler()));
    }

    #[test]
    fn test_reduce_appends_messages() {
        let mut state = ConversationState::new("hi", vec![]);
        state.messages.push("info".to_string());
        let state = state.reduce(HandlerOutcome::Info {
            reply: "Hello".to_string(),
            raw: Some("Hello".to_string()),
        });
        assert_eq!(state.messages, vec!["info", "Hello"]);
        assert_eq!(state.result.as_deref(), Some("Hello"));
        assert!(state.contract_artifact.is_none());
    }

    #[test]
    fn test_reduce_contribution_without_raw() {
        let state = ConversationState::new("bug", vec![]).reduce(HandlerOutcome::Contribution {
            reply: "sorry".to_string(),
            raw: None,
        });
        assert!(state.messages.is_empty());
        assert_eq!(state.result.as_deref(), Some("sorry"));
    }

    #[test]
    fn test_next_history() {
        let mut state = ConversationState::new("What is Contrakt?", vec![Turn::human("Hello!")]);
        assert_eq!(state.next_history().len(), 2);

        state.result = Some("A contract platform.".to_string());
        let history = state.next_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], Turn::human("What is Contrakt?"));
        assert_eq!(history[2], Turn::ai("A contract platform."));
    }

    #[test]
    fn test_role_aliases() {
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Ai);
        let role: Role = serde_json::from_str("\"human\"").unwrap();
        assert_eq!(role, Role::Human);
        assert_eq!(serde_json::to_string(&Role::Ai).unwrap(), "\"ai\"");
    }
}
