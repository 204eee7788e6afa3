//! Pure routing and transition functions

use super::{DialogueContext, DialogueState, DoneReason, Effect, Event};
use crate::conversation::ConversationState;
use crate::tools::{ToolCall, ToolKind};
use thiserror::Error;

/// Next step after a model response
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Done,
    Tools { kind: ToolKind, calls: Vec<ToolCall> },
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn done(reason: DoneReason) -> Self {
        Self::new(DialogueState::Done { reason }).with_effect(Effect::Finish { reason })
    }
}

/// Errors that can occur during routing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("No messages found when routing the conversation")]
    NoMessages,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Dialogue stopped before reaching a terminal state")]
    Stalled,
}

/// Decide what follows the latest model message.
///
/// Catalog calls take priority over order calls in the same message. A
/// message made only of unknown tools goes to the catalog node, whose
/// dispatcher answers each one with text.
pub fn route(conversation: &ConversationState) -> Result<Route, TransitionError> {
    if conversation.messages.is_empty() {
        return Err(TransitionError::NoMessages);
    }
    if conversation.finished {
        return Ok(Route::Done);
    }

    let calls = conversation.latest_tool_calls();
    if calls.is_empty() {
        return Ok(Route::Done);
    }

    let has_kind = |kind| calls.iter().any(|c| c.input.kind() == Some(kind));
    let kind = if has_kind(ToolKind::Catalog) {
        ToolKind::Catalog
    } else if has_kind(ToolKind::Order) {
        ToolKind::Order
    } else {
        ToolKind::Catalog
    };

    Ok(Route::Tools {
        kind,
        calls: calls.to_vec(),
    })
}

/// Pure transition function
pub fn transition(
    state: &DialogueState,
    context: &DialogueContext,
    conversation: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        (DialogueState::AwaitingModel { round }, Event::ModelResponded) => {
            match route(conversation)? {
                Route::Done => Ok(TransitionResult::done(if conversation.finished {
                    DoneReason::OrderPlaced
                } else {
                    DoneReason::Replied
                })),
                Route::Tools { kind, calls } => {
                    let next = match kind {
                        ToolKind::Catalog => DialogueState::CatalogTool { round },
                        ToolKind::Order => DialogueState::OrderTool { round },
                    };
                    Ok(TransitionResult::new(next).with_effect(Effect::ExecuteTools { kind, calls }))
                }
            }
        }

        (
            DialogueState::CatalogTool { round } | DialogueState::OrderTool { round },
            Event::ToolsExecuted { order_placed },
        ) => {
            if order_placed || conversation.finished {
                return Ok(TransitionResult::done(DoneReason::OrderPlaced));
            }
            let made = round + 1;
            if made >= context.max_round_trips {
                return Ok(TransitionResult::done(DoneReason::RoundLimit));
            }
            Ok(TransitionResult::new(DialogueState::AwaitingModel { round: made })
                .with_effect(Effect::RequestModel))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in state {}",
            state.name()
        ))),
    }
}
