//! Conversation driver
//!
//! Runs one user turn: appends the human message, then alternates between
//! the model and the tool dispatcher under the dialogue router until the
//! router reports a terminal state.

use super::traits::LlmClient;
use crate::conversation::{ConversationState, Message};
use crate::llm::{LlmError, LlmRequest, SystemContent};
use crate::state_machine::{
    transition, DialogueContext, DialogueState, DoneReason, Effect, Event, TransitionError,
};
use crate::system_prompt::{build_system_prompt, system_message};
use crate::tools::{self, ToolCall, ToolDispatcher, ToolKind};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

/// Prefix of the reply given when a turn fails
pub const APOLOGY_PREFIX: &str = "Sorry, something went wrong";

/// Reply given when the model keeps calling tools past the round-trip limit
pub const ROUND_LIMIT_REPLY: &str =
    "Sorry, I couldn't finish handling that request. Could you try rephrasing it?";

/// Reply given when a turn produced no text at all
pub const FALLBACK_REPLY: &str = "Sorry, no response is available.";

/// Limits applied to every turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Maximum model calls per turn
    pub max_round_trips: u32,
    /// Maximum output tokens per model call
    pub max_tokens: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_round_trips: 10,
            max_tokens: 1024,
        }
    }
}

/// Reasons a turn can fail
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Routing(#[from] TransitionError),
}

/// Drives turns of a conversation
pub struct ConversationDriver {
    llm: Arc<dyn LlmClient>,
    dispatcher: ToolDispatcher,
    config: DriverConfig,
}

impl ConversationDriver {
    pub fn new(llm: Arc<dyn LlmClient>, dispatcher: ToolDispatcher, config: DriverConfig) -> Self {
        Self {
            llm,
            dispatcher,
            config,
        }
    }

    /// Answer one user message.
    ///
    /// Never fails: any error becomes an apology and the conversation is
    /// left exactly as it was before the turn. A conversation whose order
    /// was placed starts over.
    pub async fn respond(
        &self,
        session_id: &str,
        conversation: &mut ConversationState,
        user_text: &str,
    ) -> String {
        let snapshot = conversation.clone();

        if conversation.finished {
            tracing::info!(session_id = %session_id, "Previous order placed, starting a new conversation");
            *conversation = ConversationState::new();
        }
        if conversation.messages.is_empty() {
            conversation.messages.push(system_message());
        }

        let turn_start = conversation.messages.len();
        conversation.messages.push(Message::human(user_text));

        match self.run_turn(session_id, conversation).await {
            Ok(reason) => {
                tracing::info!(
                    session_id = %session_id,
                    reason = reason.as_str(),
                    messages = conversation.messages.len() - turn_start,
                    "Turn complete"
                );
                let reply = final_reply(&conversation.messages[turn_start..], reason);
                if reason == DoneReason::RoundLimit {
                    // Close the turn so the history does not end on tool results
                    conversation
                        .messages
                        .push(Message::assistant(reply.clone(), vec![]));
                }
                reply
            }
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Turn failed");
                *conversation = snapshot;
                format!("{APOLOGY_PREFIX}: {e}")
            }
        }
    }

    async fn run_turn(
        &self,
        session_id: &str,
        conversation: &mut ConversationState,
    ) -> Result<DoneReason, TurnError> {
        let context = DialogueContext::new(self.config.max_round_trips);
        let mut state = DialogueState::initial();
        let mut effects = VecDeque::from([Effect::RequestModel]);

        while let Some(effect) = effects.pop_front() {
            let event = match effect {
                Effect::RequestModel => {
                    self.request_model(session_id, &state, conversation).await?;
                    Event::ModelResponded
                }
                Effect::ExecuteTools { kind, calls } => {
                    let order_placed = self.execute_tools(session_id, kind, &calls, conversation);
                    Event::ToolsExecuted { order_placed }
                }
                Effect::Finish { reason } => {
                    debug_assert!(state.is_terminal());
                    return Ok(reason);
                }
            };

            let result = transition(&state, &context, conversation, event)?;
            tracing::debug!(
                session_id = %session_id,
                from = state.name(),
                to = result.new_state.name(),
                "Dialogue transition"
            );
            state = result.new_state;
            effects.extend(result.effects);
        }

        Err(TransitionError::Stalled.into())
    }

    async fn request_model(
        &self,
        session_id: &str,
        state: &DialogueState,
        conversation: &mut ConversationState,
    ) -> Result<(), LlmError> {
        let request = LlmRequest {
            system: vec![SystemContent::new(build_system_prompt(
                conversation.system_texts(),
            ))],
            messages: conversation.to_llm_messages(),
            tools: tools::definitions(),
            max_tokens: Some(self.config.max_tokens),
        };

        tracing::info!(
            session_id = %session_id,
            model = %self.llm.model_id(),
            state = ?state,
            "Making LLM request"
        );

        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            session_id = %session_id,
            end_turn = response.end_turn,
            tool_calls = response.tool_uses().len(),
            "Model responded"
        );
        conversation.messages.push(Message::from_response(&response));
        Ok(())
    }

    /// Run every call of the message in order. Returns whether an order was
    /// placed, in which case the conversation is marked finished.
    fn execute_tools(
        &self,
        session_id: &str,
        kind: ToolKind,
        calls: &[ToolCall],
        conversation: &mut ConversationState,
    ) -> bool {
        tracing::info!(
            session_id = %session_id,
            node = kind.as_str(),
            calls = calls.len(),
            "Executing tools"
        );

        let mut rng = rand::thread_rng();
        let mut order_placed = false;
        for call in calls {
            let execution = self
                .dispatcher
                .execute(call, &mut conversation.order, &mut rng);
            order_placed |= execution.order_placed;
            conversation
                .messages
                .push(Message::ToolResult(execution.result));
        }

        if order_placed {
            conversation.finished = true;
        }
        order_placed
    }
}

/// Pick the text shown to the user from the messages of one turn
fn final_reply(turn: &[Message], reason: DoneReason) -> String {
    if reason == DoneReason::RoundLimit {
        return ROUND_LIMIT_REPLY.to_string();
    }

    turn.iter()
        .rev()
        .find_map(|m| match m {
            Message::Assistant { content, .. } if !content.trim().is_empty() => {
                Some(content.clone())
            }
            _ => None,
        })
        .or_else(|| {
            turn.last()
                .map(Message::text)
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{text_response, tool_response, MockLlmClient, RecordingSink};
    use crate::tools::{ADD_TO_ORDER, CONFIRM_ORDER, GET_CATALOG, GET_ORDER, PLACE_ORDER};
    use serde_json::json;

    struct Harness {
        llm: Arc<MockLlmClient>,
        sink: Arc<RecordingSink>,
        driver: ConversationDriver,
    }

    fn harness(max_round_trips: u32) -> Harness {
        let llm = Arc::new(MockLlmClient::new("mock-model"));
        let sink = Arc::new(RecordingSink::new());
        let driver = ConversationDriver::new(
            llm.clone(),
            ToolDispatcher::new(sink.clone()),
            DriverConfig {
                max_round_trips,
                max_tokens: 256,
            },
        );
        Harness { llm, sink, driver }
    }

    #[tokio::test]
    async fn test_greeting_without_tools() {
        let h = harness(10);
        h.llm.queue_response(text_response("Hello! Looking for a book?"));

        let mut conv = ConversationState::new();
        let reply = h.driver.respond("s1", &mut conv, "hello").await;

        assert_eq!(reply, "Hello! Looking for a book?");
        assert!(conv.order.is_empty());
        assert!(!conv.finished);
        assert_eq!(h.llm.request_count(), 1);

        let request = &h.llm.recorded_requests()[0];
        assert_eq!(request.tools.len(), 6);
        assert_eq!(request.max_tokens, Some(256));
        assert!(request.system[0].text.contains("BookStoreBot"));
    }

    #[tokio::test]
    async fn test_catalog_lookup_feeds_result_back() {
        let h = harness(10);
        h.llm
            .queue_response(tool_response("", &[("c1", GET_CATALOG, json!({}))]));
        h.llm
            .queue_response(text_response("We have Sapiens and Homo Deus in Non-Fiction."));

        let mut conv = ConversationState::new();
        let reply = h
            .driver
            .respond("s1", &mut conv, "what non-fiction do you have?")
            .await;

        assert_eq!(reply, "We have Sapiens and Homo Deus in Non-Fiction.");
        let requests = h.llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        let fed_back = format!("{:?}", requests[1].messages);
        assert!(fed_back.contains("CATALOG:"));
    }

    #[tokio::test]
    async fn test_add_then_confirm() {
        let h = harness(10);
        h.llm.queue_response(tool_response(
            "",
            &[(
                "c1",
                ADD_TO_ORDER,
                json!({"book": "1984", "options": ["hardcover"]}),
            )],
        ));
        h.llm
            .queue_response(tool_response("", &[("c2", CONFIRM_ORDER, json!({}))]));
        h.llm
            .queue_response(text_response("Your order: 1984 (hardcover). Is this correct?"));

        let mut conv = ConversationState::new();
        let reply = h
            .driver
            .respond("s1", &mut conv, "I'd like 1984 in hardcover")
            .await;

        assert_eq!(reply, "Your order: 1984 (hardcover). Is this correct?");
        assert_eq!(conv.order.lines(), ["1984 (hardcover)"]);
        assert!(!conv.finished);
        assert!(conv.messages.iter().any(|m| m.text()
            == "Your current order:\n  - 1984 (hardcover)\n\nIs this correct?"));
    }

    #[tokio::test]
    async fn test_place_order_ends_turn_without_another_model_call() {
        let h = harness(10);
        h.llm.queue_response(tool_response(
            "",
            &[
                ("c1", ADD_TO_ORDER, json!({"book": "Sapiens"})),
                ("c2", PLACE_ORDER, json!({})),
            ],
        ));

        let mut conv = ConversationState::new();
        let reply = h.driver.respond("s1", &mut conv, "Sapiens please, place it").await;

        assert!(reply.starts_with("Order placed successfully! Estimated delivery:"));
        assert!(conv.finished);
        assert_eq!(h.llm.request_count(), 1);
        assert_eq!(
            h.sink.submitted(),
            vec![vec!["Sapiens (standard edition)".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_place_empty_order_continues_to_model() {
        let h = harness(10);
        h.llm
            .queue_response(tool_response("", &[("c1", PLACE_ORDER, json!({}))]));
        h.llm
            .queue_response(text_response("Your order is empty. What would you like?"));

        let mut conv = ConversationState::new();
        let reply = h.driver.respond("s1", &mut conv, "place my order").await;

        assert_eq!(reply, "Your order is empty. What would you like?");
        assert!(!conv.finished);
        assert!(h.sink.submitted().is_empty());
        assert_eq!(h.llm.request_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_answered_with_text() {
        let h = harness(10);
        h.llm
            .queue_response(tool_response("", &[("c1", "teleport", json!({}))]));
        h.llm.queue_response(text_response("I can't do that."));

        let mut conv = ConversationState::new();
        let reply = h.driver.respond("s1", &mut conv, "teleport me").await;

        assert_eq!(reply, "I can't do that.");
        assert!(conv
            .messages
            .iter()
            .any(|m| m.text() == "Unknown tool call: teleport"));
    }

    #[tokio::test]
    async fn test_model_failure_becomes_apology_and_rolls_back() {
        let h = harness(10);
        h.llm.queue_response(text_response("Hi there!"));
        let mut conv = ConversationState::new();
        h.driver.respond("s1", &mut conv, "hello").await;
        let before = conv.clone();

        h.llm.queue_response(tool_response(
            "",
            &[("c1", ADD_TO_ORDER, json!({"book": "Ikigai"}))],
        ));
        h.llm
            .queue_error(LlmError::server_error("upstream unavailable"));

        let reply = h.driver.respond("s1", &mut conv, "add Ikigai").await;

        assert!(reply.starts_with(APOLOGY_PREFIX));
        assert!(reply.contains("upstream unavailable"));
        assert_eq!(conv, before);
    }

    #[tokio::test]
    async fn test_round_limit_ends_with_fixed_reply() {
        let h = harness(3);
        for i in 0..3 {
            let id = format!("c{i}");
            h.llm.queue_response(tool_response(
                "Checking...",
                &[(id.as_str(), GET_ORDER, json!({}))],
            ));
        }

        let mut conv = ConversationState::new();
        let reply = h.driver.respond("s1", &mut conv, "what's in my order?").await;

        assert_eq!(reply, ROUND_LIMIT_REPLY);
        assert_eq!(h.llm.request_count(), 3);
        assert_eq!(
            conv.messages.last(),
            Some(&Message::assistant(ROUND_LIMIT_REPLY, vec![]))
        );

        // The next turn's request still alternates roles
        h.llm.queue_response(text_response("Your order is empty."));
        h.driver.respond("s1", &mut conv, "hello?").await;
        let requests = h.llm.recorded_requests();
        let roles: Vec<_> = requests[3].messages.iter().map(|m| m.role).collect();
        assert!(roles.windows(2).all(|pair| pair[0] != pair[1]));
        assert_eq!(roles.last(), Some(&crate::llm::MessageRole::User));
    }

    #[tokio::test]
    async fn test_cart_persists_across_turns() {
        let h = harness(10);
        h.llm.queue_response(tool_response(
            "",
            &[("c1", ADD_TO_ORDER, json!({"book": "Educated"}))],
        ));
        h.llm.queue_response(text_response("Added Educated."));
        h.llm.queue_response(tool_response(
            "",
            &[("c2", ADD_TO_ORDER, json!({"book": "Deep Work", "options": ["e-book"]}))],
        ));
        h.llm.queue_response(text_response("Added Deep Work."));

        let mut conv = ConversationState::new();
        h.driver.respond("s1", &mut conv, "Educated please").await;
        let reply = h.driver.respond("s1", &mut conv, "and Deep Work as an e-book").await;

        assert_eq!(reply, "Added Deep Work.");
        assert_eq!(
            conv.order.lines(),
            ["Educated (standard edition)", "Deep Work (e-book)"]
        );

        let second = &h.llm.recorded_requests()[2];
        let history = format!("{:?}", second.messages);
        assert!(history.contains("Educated please"));
    }

    #[tokio::test]
    async fn test_finished_conversation_starts_over() {
        let h = harness(10);
        h.llm.queue_response(tool_response(
            "",
            &[
                ("c1", ADD_TO_ORDER, json!({"book": "Ikigai"})),
                ("c2", PLACE_ORDER, json!({})),
            ],
        ));
        h.llm.queue_response(text_response("Welcome back!"));

        let mut conv = ConversationState::new();
        h.driver.respond("s1", &mut conv, "Ikigai, place it").await;
        assert!(conv.finished);

        let reply = h.driver.respond("s1", &mut conv, "hi again").await;
        assert_eq!(reply, "Welcome back!");
        assert!(!conv.finished);
        assert!(conv.order.is_empty());
        assert_eq!(conv.messages.len(), 3);
        assert!(matches!(conv.messages[0], Message::System { .. }));
    }

    #[test]
    fn test_final_reply_fallbacks() {
        assert_eq!(
            final_reply(&[Message::human("hi"), Message::assistant("Hello", vec![])], DoneReason::Replied),
            "Hello"
        );
        assert_eq!(
            final_reply(&[Message::human("hi"), Message::assistant("", vec![])], DoneReason::Replied),
            FALLBACK_REPLY
        );
        assert_eq!(final_reply(&[], DoneReason::Replied), FALLBACK_REPLY);
        assert_eq!(
            final_reply(&[Message::assistant("Hello", vec![])], DoneReason::RoundLimit),
            ROUND_LIMIT_REPLY
        );
    }
}
