//! Bookstore tools exposed to the model
//!
//! The tool set is closed: `get_catalog` reads the catalog, and five order
//! tools read or mutate the conversation's `OrderStore`. Names outside the
//! schema decode to `ToolInput::Unknown` and are answered with text, never
//! with an error.

use crate::catalog;
use crate::conversation::ToolResult;
use crate::llm::ToolDefinition;
use crate::order::{FulfillmentSink, OrderStore};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const GET_CATALOG: &str = "get_catalog";
pub const ADD_TO_ORDER: &str = "add_to_order";
pub const CONFIRM_ORDER: &str = "confirm_order";
pub const GET_ORDER: &str = "get_order";
pub const CLEAR_ORDER: &str = "clear_order";
pub const PLACE_ORDER: &str = "place_order";

/// Which dialogue node handles a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Read-only catalog lookups
    Catalog,
    /// Tools that read or mutate the order
    Order,
}

impl ToolKind {
    pub fn of(name: &str) -> Option<Self> {
        match name {
            GET_CATALOG => Some(ToolKind::Catalog),
            ADD_TO_ORDER | CONFIRM_ORDER | GET_ORDER | CLEAR_ORDER | PLACE_ORDER => {
                Some(ToolKind::Order)
            }
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Catalog => "catalog",
            ToolKind::Order => "order",
        }
    }
}

/// Input for the `add_to_order` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToOrderInput {
    pub book: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Strongly typed tool input
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    GetCatalog,
    AddToOrder(AddToOrderInput),
    ConfirmOrder,
    GetOrder,
    ClearOrder,
    PlaceOrder,
    /// A known tool whose arguments did not decode
    Malformed {
        name: String,
        input: Value,
        error: String,
    },
    /// Fallback for names outside the schema
    Unknown { name: String, input: Value },
}

impl ToolInput {
    pub fn tool_name(&self) -> &str {
        match self {
            ToolInput::GetCatalog => GET_CATALOG,
            ToolInput::AddToOrder(_) => ADD_TO_ORDER,
            ToolInput::ConfirmOrder => CONFIRM_ORDER,
            ToolInput::GetOrder => GET_ORDER,
            ToolInput::ClearOrder => CLEAR_ORDER,
            ToolInput::PlaceOrder => PLACE_ORDER,
            ToolInput::Malformed { name, .. } | ToolInput::Unknown { name, .. } => name,
        }
    }

    pub fn kind(&self) -> Option<ToolKind> {
        ToolKind::of(self.tool_name())
    }

    /// Arguments as sent back to the model in the history
    pub fn to_value(&self) -> Value {
        match self {
            ToolInput::AddToOrder(input) => json!({
                "book": input.book,
                "options": input.options,
            }),
            ToolInput::Malformed { input, .. } | ToolInput::Unknown { input, .. } => input.clone(),
            _ => json!({}),
        }
    }

    /// Parse from tool name and JSON arguments
    pub fn from_name_and_value(name: &str, value: Value) -> Self {
        match name {
            GET_CATALOG => ToolInput::GetCatalog,
            ADD_TO_ORDER => match serde_json::from_value::<AddToOrderInput>(value.clone()) {
                Ok(input) => ToolInput::AddToOrder(input),
                Err(e) => ToolInput::Malformed {
                    name: name.to_string(),
                    input: value,
                    error: e.to_string(),
                },
            },
            CONFIRM_ORDER => ToolInput::ConfirmOrder,
            GET_ORDER => ToolInput::GetOrder,
            CLEAR_ORDER => ToolInput::ClearOrder,
            PLACE_ORDER => ToolInput::PlaceOrder,
            _ => ToolInput::Unknown {
                name: name.to_string(),
                input: value,
            },
        }
    }
}

/// A tool call from the model with typed input
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub input: ToolInput,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, input: ToolInput) -> Self {
        Self {
            id: id.into(),
            input,
        }
    }

    pub fn name(&self) -> &str {
        self.input.tool_name()
    }
}

fn no_parameters() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Tool schemas advertised to the model
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: GET_CATALOG.to_string(),
            description: "Provide the latest up-to-date book catalog.".to_string(),
            input_schema: no_parameters(),
        },
        ToolDefinition {
            name: ADD_TO_ORDER.to_string(),
            description: "Adds the specified book to the customer's order, including any options \
                          (e.g., edition type like hardcover, paperback, or e-book)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["book"],
                "properties": {
                    "book": {
                        "type": "string",
                        "description": "Book title exactly as listed in the catalog"
                    },
                    "options": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Edition or special requests, e.g. hardcover, gift wrapping"
                    }
                }
            }),
        },
        ToolDefinition {
            name: CONFIRM_ORDER.to_string(),
            description: "Asks the customer if the order is correct.".to_string(),
            input_schema: no_parameters(),
        },
        ToolDefinition {
            name: GET_ORDER.to_string(),
            description: "Returns the user's order so far. One item per line.".to_string(),
            input_schema: no_parameters(),
        },
        ToolDefinition {
            name: CLEAR_ORDER.to_string(),
            description: "Removes all items from the user's order.".to_string(),
            input_schema: no_parameters(),
        },
        ToolDefinition {
            name: PLACE_ORDER.to_string(),
            description: "Sends the order to the bookstore for fulfillment.".to_string(),
            input_schema: no_parameters(),
        },
    ]
}

/// Outcome of dispatching one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub result: ToolResult,
    /// True only when `place_order` succeeded
    pub order_placed: bool,
}

/// Executes tool calls against a conversation's order
#[derive(Clone)]
pub struct ToolDispatcher {
    sink: Arc<dyn FulfillmentSink>,
}

impl ToolDispatcher {
    pub fn new(sink: Arc<dyn FulfillmentSink>) -> Self {
        Self { sink }
    }

    pub fn execute<R: Rng + ?Sized>(
        &self,
        call: &ToolCall,
        order: &mut OrderStore,
        rng: &mut R,
    ) -> Execution {
        let mut order_placed = false;

        let content = match &call.input {
            ToolInput::GetCatalog => catalog::get_catalog().to_string(),
            ToolInput::AddToOrder(input) => {
                order.add(&input.book, input.options.as_deref().unwrap_or_default())
            }
            ToolInput::ConfirmOrder => order.confirm(),
            ToolInput::GetOrder => order.get(),
            ToolInput::ClearOrder => order.clear(),
            ToolInput::PlaceOrder => {
                let outcome = order.place(self.sink.as_ref(), rng);
                order_placed = outcome.placed;
                if outcome.placed {
                    tracing::info!(
                        items = order.lines().len(),
                        delivery_days = outcome.delivery_days,
                        "Order placed"
                    );
                }
                outcome.message
            }
            ToolInput::Malformed { name, error, .. } => {
                tracing::warn!(tool = %name, error = %error, "Malformed tool arguments");
                format!("Invalid arguments for {name}: {error}")
            }
            ToolInput::Unknown { name, .. } => {
                tracing::warn!(tool = %name, "Unknown tool call");
                format!("Unknown tool call: {name}")
            }
        };

        tracing::debug!(tool = call.name(), call_id = %call.id, "Tool executed");

        Execution {
            result: ToolResult {
                call_id: call.id.clone(),
                name: call.name().to_string(),
                content,
            },
            order_placed,
        }
    }
}
