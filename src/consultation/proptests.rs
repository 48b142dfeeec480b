//! Property-based tests for the consultation state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::sentinel::{extract_prescription, is_final_reply, SENTINEL};
use super::state::{ConsultState, Turn};
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Sentinel with every letter's case chosen independently
fn arb_sentinel_casing() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), SENTINEL.len()).prop_map(|upper| {
        SENTINEL
            .chars()
            .zip(upper)
            .map(|(c, up)| {
                if up {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

/// Free text that can never contain the sentinel (no letter 'f')
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[a-eg-zA-EG-Z0-9 .,?\n]{0,80}"
}

/// One line of prescription text, free of the sentinel
fn arb_inline() -> impl Strategy<Value = String> {
    "[a-eg-zA-EG-Z0-9][a-eg-zA-EG-Z0-9 .,]{0,40}"
}

fn arb_utterance() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ,.]{0,40}"
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn sentinel_detected_in_any_case(
        prefix in arb_plain_text(),
        sentinel in arb_sentinel_casing(),
        suffix in arb_plain_text(),
    ) {
        let reply = format!("{prefix}{sentinel}{suffix}");
        prop_assert!(is_final_reply(&reply));
        prop_assert!(extract_prescription(&reply).is_some());
    }

    #[test]
    fn text_on_sentinel_line_is_kept(
        prefix in arb_plain_text(),
        sentinel in arb_sentinel_casing(),
        inline in arb_inline(),
        rest in arb_plain_text(),
    ) {
        let reply = format!("{prefix}{sentinel}: {inline}\n{rest}");
        let extracted = extract_prescription(&reply).unwrap();
        prop_assert!(extracted.starts_with(inline.trim()));
        prop_assert!(extracted.contains(rest.trim()));
    }

    #[test]
    fn text_without_sentinel_never_terminal(text in arb_plain_text()) {
        prop_assert!(!is_final_reply(&text));
        prop_assert!(extract_prescription(&text).is_none());
    }

    #[test]
    fn reply_appends_exactly_two_turns_in_order(
        utterance in arb_utterance(),
        reply in arb_plain_text(),
    ) {
        let result = transition(
            &ConsultState::Collecting,
            Event::DoctorReply { utterance: utterance.clone(), reply: reply.clone() },
        ).unwrap();

        let appended: Vec<&Turn> = result.effects.iter().filter_map(|e| match e {
            Effect::AppendTurn(turn) => Some(turn),
            _ => None,
        }).collect();
        prop_assert_eq!(appended.len(), 2);
        prop_assert_eq!(appended[0], &Turn::patient(utterance));
        prop_assert_eq!(appended[1], &Turn::doctor(reply));
        prop_assert_eq!(result.new_state, ConsultState::Collecting);
    }

    #[test]
    fn finalized_is_absorbing(
        prescription in arb_plain_text(),
        utterance in arb_utterance(),
        reply in arb_plain_text(),
    ) {
        let state = ConsultState::Finalized { prescription };
        prop_assert_eq!(
            check_utterance(&state, &utterance),
            Err(TransitionError::AlreadyFinalized)
        );
        prop_assert_eq!(
            transition(&state, Event::DoctorReply { utterance, reply }),
            Err(TransitionError::AlreadyFinalized)
        );
    }
}
