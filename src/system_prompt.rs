//! System prompt construction
//!
//! The base instruction opens every conversation as a system message. The
//! prompt sent with each request is built from the system messages in the
//! history, in order.

use crate::conversation::Message;

/// Greeting shown when a session starts. Never sent to the model.
pub const WELCOME_MESSAGE: &str = "Welcome to BookStoreBot! How can I help you find a book today?";

const BASE_PROMPT: &str = r"You are a BookStoreBot, an interactive bookstore ordering system. A human will talk to you about the available books you have and you will answer any questions about the book catalog (and only about the catalog - no off-topic discussion, but you can chat about the books, their authors, and their background). The customer will place an order for 1 or more books from the catalog, which you will structure and send to the ordering system after confirming the order with the human.

Add items to the customer's order with add_to_order, and reset the order with clear_order. To see the contents of the order so far, call get_order (this is shown to you, not the user). Always confirm_order with the user (double-check) before calling place_order. Calling confirm_order will display the order items to the user and returns their response to seeing the list. Their response may contain modifications. Always verify and respond with book titles and categories from the CATALOG before adding them to the order. If you are unsure a book title or category matches those on the CATALOG, ask a question to clarify or redirect. You only have the books listed in the catalog. Once the customer has finished ordering items, call confirm_order to ensure it is correct then make any necessary updates and then call place_order. Once place_order has returned, thank the user and say goodbye!";

/// System message that opens every conversation
pub fn system_message() -> Message {
    Message::System {
        content: BASE_PROMPT.to_string(),
    }
}

/// Build the system prompt for one model request from the system texts
/// recorded in the history. A history without any gets the base
/// instruction.
pub fn build_system_prompt<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = texts
        .into_iter()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    if parts.is_empty() {
        BASE_PROMPT.to_string()
    } else {
        parts.join("\n\n")
    }
}
