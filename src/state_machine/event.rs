//! Events fed back into the router by the driver

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The model answered and its message was appended to the history
    ModelResponded,
    /// Every tool call of the latest assistant message has a result
    ToolsExecuted { order_placed: bool },
}
