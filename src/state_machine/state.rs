//! Dialogue state types

/// Router state within one user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// A model call is pending. `round` counts the model calls already made
    /// in this turn.
    AwaitingModel { round: u32 },

    /// Running a message whose calls include the catalog tool
    CatalogTool { round: u32 },

    /// Running a message made of order tools
    OrderTool { round: u32 },

    /// Terminal
    Done { reason: DoneReason },
}

impl DialogueState {
    pub fn initial() -> Self {
        DialogueState::AwaitingModel { round: 0 }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DialogueState::Done { .. })
    }

    pub fn name(self) -> &'static str {
        match self {
            DialogueState::AwaitingModel { .. } => "await_model",
            DialogueState::CatalogTool { .. } => "catalog_tool",
            DialogueState::OrderTool { .. } => "order_tool",
            DialogueState::Done { .. } => "done",
        }
    }
}

/// Why a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The model answered without calling tools
    Replied,
    /// `place_order` succeeded
    OrderPlaced,
    /// The model kept calling tools past the round-trip limit
    RoundLimit,
}

impl DoneReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DoneReason::Replied => "replied",
            DoneReason::OrderPlaced => "order_placed",
            DoneReason::RoundLimit => "round_limit",
        }
    }
}

/// Immutable configuration for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueContext {
    /// Maximum model calls per turn, at least 1
    pub max_round_trips: u32,
}

impl DialogueContext {
    pub fn new(max_round_trips: u32) -> Self {
        Self {
            max_round_trips: max_round_trips.max(1),
        }
    }
}
