//! Order store and fulfillment sink
//!
//! The order is a list of formatted lines scoped to one conversation. Lines
//! are only ever appended, cleared wholesale, or read; nothing parses them
//! back into title and edition.

#[cfg(test)]
mod proptests;

use rand::Rng;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Sentinel returned by `get` on an empty order
pub const EMPTY_ORDER: &str = "(no order)";

/// Edition used when the customer names no options
pub const STANDARD_EDITION: &str = "standard edition";

/// Delivery estimate range, in days
pub const DELIVERY_DAYS: RangeInclusive<u32> = 1..=7;

/// Receives finalized orders
pub trait FulfillmentSink: Send + Sync {
    fn submit(&self, lines: &[String]);
}

/// Fulfillment sink that records the order in the service log
pub struct LogSink;

impl FulfillmentSink for LogSink {
    fn submit(&self, lines: &[String]) {
        tracing::info!(
            items = lines.len(),
            order = %lines.join("\n"),
            "Sending order to bookstore system"
        );
    }
}

/// Outcome of `OrderStore::place`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOutcome {
    pub message: String,
    pub placed: bool,
    pub delivery_days: Option<u32>,
}

/// Ordered list of order lines for one conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderStore {
    lines: Vec<String>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append `"<title> (<options>)"`, falling back to the standard edition
    pub fn add(&mut self, title: &str, options: &[String]) -> String {
        let option_str = if options.is_empty() {
            STANDARD_EDITION.to_string()
        } else {
            options.join(", ")
        };
        self.lines.push(format!("{title} ({option_str})"));
        format!("Added to order: {title}")
    }

    pub fn clear(&mut self) -> String {
        self.lines.clear();
        "Order cleared.".to_string()
    }

    pub fn get(&self) -> String {
        if self.lines.is_empty() {
            EMPTY_ORDER.to_string()
        } else {
            self.lines.join("\n")
        }
    }

    /// Render the order for the customer to check. The answer comes back as
    /// the next user turn; nothing waits here.
    pub fn confirm(&self) -> String {
        if self.lines.is_empty() {
            return "Your order is currently empty.".to_string();
        }
        let items = self
            .lines
            .iter()
            .map(|line| format!("  - {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Your current order:\n{items}\n\nIs this correct?")
    }

    /// Hand the order to fulfillment. An empty order is refused without
    /// touching the store or the sink.
    pub fn place<R: Rng + ?Sized>(&self, sink: &dyn FulfillmentSink, rng: &mut R) -> PlaceOutcome {
        if self.lines.is_empty() {
            return PlaceOutcome {
                message: "Cannot place empty order.".to_string(),
                placed: false,
                delivery_days: None,
            };
        }

        sink.submit(&self.lines);
        let days = rng.gen_range(DELIVERY_DAYS);
        PlaceOutcome {
            message: format!("Order placed successfully! Estimated delivery: {days} days."),
            placed: true,
            delivery_days: Some(days),
        }
    }
}
