//! Effects produced by state transitions

use super::DoneReason;
use crate::tools::{ToolCall, ToolKind};

/// Work the driver must do after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the model with the current history
    RequestModel,

    /// Run every call of the latest assistant message, in order
    ExecuteTools { kind: ToolKind, calls: Vec<ToolCall> },

    /// End the turn
    Finish { reason: DoneReason },
}
