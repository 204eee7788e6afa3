//! Property-based tests for the dialogue router
//!
//! These tests verify routing and termination hold across arbitrary tool
//! call mixes and round-trip limits.

use super::transition::{route, Route, TransitionResult};
use super::*;
use crate::conversation::{ConversationState, Message};
use crate::tools::{ToolCall, ToolInput, ToolKind};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_order_input() -> impl Strategy<Value = ToolInput> {
    prop_oneof![
        "[A-Za-z ]{1,20}".prop_map(|book| ToolInput::from_name_and_value(
            "add_to_order",
            json!({ "book": book })
        )),
        Just(ToolInput::ConfirmOrder),
        Just(ToolInput::GetOrder),
        Just(ToolInput::ClearOrder),
        Just(ToolInput::PlaceOrder),
    ]
}

fn arb_unknown_input() -> impl Strategy<Value = ToolInput> {
    "[a-z_]{3,12}"
        .prop_filter("known tool names", |name| ToolKind::of(name).is_none())
        .prop_map(|name| ToolInput::from_name_and_value(&name, json!({})))
}

fn arb_tool_input() -> impl Strategy<Value = ToolInput> {
    prop_oneof![
        Just(ToolInput::GetCatalog),
        arb_order_input(),
        arb_unknown_input(),
    ]
}

fn arb_calls() -> impl Strategy<Value = Vec<ToolCall>> {
    proptest::collection::vec(arb_tool_input(), 1..6).prop_map(|inputs| {
        inputs
            .into_iter()
            .enumerate()
            .map(|(i, input)| ToolCall::new(format!("call_{i}"), input))
            .collect()
    })
}

fn conversation_with(calls: Vec<ToolCall>) -> ConversationState {
    let mut conv = ConversationState::new();
    conv.messages.push(Message::human("I'd like a book"));
    conv.messages.push(Message::assistant("", calls));
    conv
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Any message containing the catalog tool routes to the catalog node,
    /// and every call of the message is carried along.
    #[test]
    fn catalog_has_priority(calls in arb_calls()) {
        let has_catalog = calls.iter().any(|c| matches!(c.input, ToolInput::GetCatalog));
        let has_order = calls.iter().any(|c| c.input.kind() == Some(ToolKind::Order));
        let conv = conversation_with(calls.clone());

        let Ok(Route::Tools { kind, calls: routed }) = route(&conv) else {
            return Err(TestCaseError::fail("tool calls must route to a tool node"));
        };
        prop_assert_eq!(routed, calls);
        if has_catalog || !has_order {
            prop_assert_eq!(kind, ToolKind::Catalog);
        } else {
            prop_assert_eq!(kind, ToolKind::Order);
        }
    }

    /// A finished conversation never routes to a tool node.
    #[test]
    fn finished_always_routes_to_done(calls in arb_calls()) {
        let mut conv = conversation_with(calls);
        conv.finished = true;
        prop_assert_eq!(route(&conv), Ok(Route::Done));
    }

    /// Driving the router with a model that always calls tools ends the
    /// turn after exactly `max_round_trips` model requests.
    #[test]
    fn tool_loop_is_bounded(calls in arb_calls(), limit in 1u32..15) {
        let ctx = DialogueContext::new(limit);
        let conv = conversation_with(calls);
        let mut state = DialogueState::initial();
        let mut model_requests = 1u32;

        for _ in 0..(limit * 2 + 2) {
            let event = match state {
                DialogueState::AwaitingModel { .. } => Event::ModelResponded,
                DialogueState::CatalogTool { .. } | DialogueState::OrderTool { .. } => {
                    Event::ToolsExecuted { order_placed: false }
                }
                DialogueState::Done { .. } => break,
            };
            let result = transition(&state, &ctx, &conv, event)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            model_requests += result
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::RequestModel))
                .count() as u32;
            state = result.new_state;
        }

        prop_assert_eq!(state, DialogueState::Done { reason: DoneReason::RoundLimit });
        prop_assert_eq!(model_requests, limit);
    }

    /// A successful placement ends the turn whatever the round.
    #[test]
    fn placement_is_terminal(round in 0u32..20, limit in 1u32..20, catalog in any::<bool>()) {
        let conv = conversation_with(vec![ToolCall::new("c1", ToolInput::PlaceOrder)]);
        let state = if catalog {
            DialogueState::CatalogTool { round }
        } else {
            DialogueState::OrderTool { round }
        };
        let result = transition(
            &state,
            &DialogueContext::new(limit),
            &conv,
            Event::ToolsExecuted { order_placed: true },
        );
        let placed = matches!(
            result,
            Ok(TransitionResult {
                new_state: DialogueState::Done { reason: DoneReason::OrderPlaced },
                ..
            })
        );
        prop_assert!(placed);
    }
}
