//! Extraction of the user's intent from a chat request.

use crate::chat::{ChatRequest, MessageContent, Role};

/// Stand-in intent for a user message that has no text part.
pub const IMAGE_ONLY_PLACEHOLDER: &str = "Image analysis requested";

/// Find the text the router should reason about.
///
/// Takes the most recent `user` message. Plain content is returned as is;
/// multi-part content yields its first `text` part, or
/// [`IMAGE_ONLY_PLACEHOLDER`] when there is none. Returns `None` when there
/// is no user message or the extracted text is empty.
pub fn extract_intent(request: &ChatRequest) -> Option<String> {
    let message = request.messages.iter().rev().find(|m| m.role == Role::User)?;

    let text = match message.content.as_ref()? {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => parts
            .iter()
            .find_map(|p| p.as_text())
            .unwrap_or(IMAGE_ONLY_PLACEHOLDER)
            .to_string(),
    };

    if text.is_empty() { None } else { Some(text) }
}
