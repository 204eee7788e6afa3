//! Dialogue router
//!
//! A pure state machine deciding, after each model turn, whether the turn is
//! done or which tool node runs next. The driver executes the effects it
//! returns and feeds the outcome back as events.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{DialogueContext, DialogueState, DoneReason};
pub use transition::{transition, TransitionError};
