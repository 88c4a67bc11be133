//! Property-based tests for the routing machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::artifact::ContractArtifact;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,:\"\n]{0,40}"
}

fn arb_token() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("contribute"),
        Just("create"),
        Just("info"),
        Just("unknown"),
    ]
}

/// Classifier output: a routing token wrapped in arbitrary noise, or pure noise
fn arb_classifier_output() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_text(), arb_token(), arb_text()).prop_map(|(a, t, b)| format!("{a}{t}{b}")),
        arb_text(),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Turn>> {
    prop::collection::vec(
        (any::<bool>(), arb_text()).prop_map(|(human, text)| {
            if human {
                Turn::human(text)
            } else {
                Turn::ai(text)
            }
        }),
        0..4,
    )
}

fn outcome_for(phase: Phase, reply: &str, raw: &str) -> HandlerOutcome {
    match phase {
        Phase::Info => HandlerOutcome::Info {
            reply: reply.to_string(),
            raw: Some(raw.to_string()),
        },
        Phase::Contribution => HandlerOutcome::Contribution {
            reply: reply.to_string(),
            raw: Some(raw.to_string()),
        },
        Phase::ContractGeneration => HandlerOutcome::Contract {
            reply: reply.to_string(),
            raw: Some(raw.to_string()),
            artifact: Some(ContractArtifact::draft(
                "TERMS",
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )),
        },
        _ => HandlerOutcome::Fallback {
            reply: reply.to_string(),
            raw: Some(raw.to_string()),
        },
    }
}

/// Drive a full run: classification followed by the matching handler outcome
fn run(
    input: &str,
    history: Vec<Turn>,
    classifier: &str,
    reply: &str,
) -> Result<ConversationState, TransitionError> {
    let state = ConversationState::new(input, history);
    let entered = transition(
        &state,
        Event::Classified {
            raw: classifier.to_string(),
        },
    )?;
    if entered.new_state.is_terminal() {
        return Ok(entered.new_state);
    }
    let outcome = outcome_for(entered.new_state.phase, reply, reply);
    Ok(transition(&entered.new_state, Event::HandlerCompleted { outcome })?.new_state)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any output containing "contribute" routes to Contribution, whatever else it says
    #[test]
    fn contribute_takes_precedence(a in arb_text(), b in arb_text(), other in arb_token()) {
        let raw = format!("{a}{other}{b}contribute");
        prop_assert_eq!(Operation::classify(&raw), Operation::Contribute);
        prop_assert_eq!(Operation::classify(&raw).phase(), Phase::Contribution);
    }

    /// Classification without "contribute" but with "create" always yields Create
    #[test]
    fn create_beats_info(a in "[a-z ]{0,20}", b in "[a-z ]{0,20}") {
        prop_assume!(!a.contains("contribute") && !b.contains("contribute"));
        let raw = format!("{a}info{b}create");
        prop_assert_eq!(Operation::classify(&raw), Operation::Create);
    }

    /// Every non-empty run ends Terminal with exactly one result
    #[test]
    fn exactly_one_terminal_handler(
        input in arb_text(),
        history in arb_history(),
        raw in arb_classifier_output(),
        reply in "[a-zA-Z ]{1,30}",
    ) {
        let state = run(&input, history.clone(), &raw, &reply).unwrap();
        prop_assert!(state.is_terminal());

        if raw.trim().is_empty() {
            prop_assert_eq!(state.operation, None);
            prop_assert_eq!(state.result.as_deref(), None);
        } else {
            prop_assert_eq!(state.operation, Some(Operation::classify(&raw)));
            prop_assert_eq!(state.result.as_deref(), Some(reply.as_str()));
            prop_assert_eq!(state.messages.len(), 2);
            prop_assert_eq!(&state.messages[0], &raw);
        }
        // History is read-only within a run
        prop_assert_eq!(&state.history, &history);

        // No further events are accepted
        let again = transition(&state, Event::HandlerCompleted {
            outcome: outcome_for(Phase::Info, "x", "x"),
        });
        prop_assert_eq!(again.unwrap_err(), TransitionError::AlreadyTerminal);
    }

    /// Artifacts only come out of the contract path
    #[test]
    fn artifact_only_on_create(raw in arb_classifier_output(), reply in "[a-z]{1,10}") {
        let state = run("draft something", vec![], &raw, &reply).unwrap();
        if state.contract_artifact.is_some() {
            prop_assert_eq!(state.operation, Some(Operation::Create));
        }
    }

    /// Transitions never drop earlier messages
    #[test]
    fn messages_are_append_only(raw in "[a-z]{1,20}", reply in "[a-z]{1,20}") {
        let state = ConversationState::new("x", vec![]);
        let entered = transition(&state, Event::Classified { raw: raw.clone() }).unwrap().new_state;
        let outcome = outcome_for(entered.phase, &reply, &reply);
        let done = transition(&entered, Event::HandlerCompleted { outcome }).unwrap().new_state;
        prop_assert!(done.messages.starts_with(&entered.messages));
        prop_assert!(entered.messages.starts_with(&state.messages));
    }

    /// The transition is a pure function of its inputs
    #[test]
    fn transition_is_deterministic(raw in arb_classifier_output()) {
        let state = ConversationState::new("x", vec![]);
        let a = transition(&state, Event::Classified { raw: raw.clone() }).unwrap();
        let b = transition(&state, Event::Classified { raw }).unwrap();
        prop_assert_eq!(a.new_state, b.new_state);
        prop_assert_eq!(a.effects, b.effects);
    }
}
