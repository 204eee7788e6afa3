//! Conversation data model
//!
//! A `ConversationState` holds the message history, the order being built,
//! and the `finished` flag. It belongs to one session and is mutated only by
//! the conversation driver.

use crate::llm::{ContentBlock, LlmMessage, LlmResponse, MessageRole};
use crate::order::OrderStore;
use crate::tools::{ToolCall, ToolInput};

/// Result of executing one tool call, fed back to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Id of the originating `ToolCall`
    pub call_id: String,
    pub name: String,
    pub content: String,
}

/// A message in the conversation history
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System {
        content: String,
    },
    Human {
        content: String,
    },
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    ToolResult(ToolResult),
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Build the assistant message for a model response
    pub fn from_response(response: &LlmResponse) -> Self {
        let tool_calls = response
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| ToolCall::new(id, ToolInput::from_name_and_value(name, input.clone())))
            .collect();
        Message::assistant(response.text(), tool_calls)
    }

    pub fn text(&self) -> &str {
        match self {
            Message::System { content }
            | Message::Human { content }
            | Message::Assistant { content, .. } => content,
            Message::ToolResult(result) => &result.content,
        }
    }
}

/// State of one conversation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub order: OrderStore,
    /// Set once an order has been placed; the turn ends immediately after
    pub finished: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool calls carried by the latest message, if it is an assistant message
    pub fn latest_tool_calls(&self) -> &[ToolCall] {
        match self.messages.last() {
            Some(Message::Assistant { tool_calls, .. }) => tool_calls,
            _ => &[],
        }
    }

    /// System texts recorded in the history, in order
    pub fn system_texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|m| match m {
            Message::System { content } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Translate the history into provider-neutral LLM messages.
    ///
    /// System messages are carried in the request's system prompt instead.
    /// Assistant messages with neither text nor calls (a filtered or empty
    /// model reply) are dropped, since providers reject empty content.
    /// Consecutive user-side messages are merged so roles keep alternating,
    /// which also folds the tool results of a multi-call turn together.
    pub fn to_llm_messages(&self) -> Vec<LlmMessage> {
        let mut out: Vec<LlmMessage> = Vec::new();

        for message in &self.messages {
            match message {
                Message::System { .. } => {}
                Message::Human { content } => {
                    push_user(&mut out, ContentBlock::text(content.clone()));
                }
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    if content.is_empty() && tool_calls.is_empty() {
                        continue;
                    }
                    let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
                    if !content.is_empty() {
                        blocks.push(ContentBlock::text(content.clone()));
                    }
                    blocks.extend(
                        tool_calls
                            .iter()
                            .map(|c| ContentBlock::tool_use(c.id.clone(), c.name(), c.input.to_value())),
                    );
                    out.push(LlmMessage {
                        role: MessageRole::Assistant,
                        content: blocks,
                    });
                }
                Message::ToolResult(result) => push_user(
                    &mut out,
                    ContentBlock::tool_result(
                        result.call_id.clone(),
                        result.name.clone(),
                        result.content.clone(),
                    ),
                ),
            }
        }

        out
    }
}

fn push_user(out: &mut Vec<LlmMessage>, block: ContentBlock) {
    match out.last_mut() {
        Some(last) if last.role == MessageRole::User => last.content.push(block),
        _ => out.push(LlmMessage {
            role: MessageRole::User,
            content: vec![block],
        }),
    }
}
