//! OpenAI-style chat request and response types.

pub mod types;

pub use types::{
    ChatCompletion, ChatRequest, Choice, ChoiceMessage, ContentPart, Message, MessageContent,
    ResponseFormat, Role,
};
