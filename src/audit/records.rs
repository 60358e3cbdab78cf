//! Audit record types and request-body truncation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Longest string input kept in an error record, in characters.
pub const MAX_TEXT_CHARS: usize = 1000;
/// Most list elements kept in an error record.
pub const MAX_LIST_ITEMS: usize = 5;
/// Longest list element kept in an error record, in characters.
pub const MAX_ITEM_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// One row per instrumented call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestLog {
    pub model: String,
    pub credential: String,
    pub success: bool,
    pub status_code: u16,
    pub latency_ms: u64,
    pub requested_at: DateTime<Utc>,
}

/// Extra row written only when an instrumented call fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorLog {
    pub credential: String,
    pub model: String,
    pub error_type: String,
    pub error_message: String,
    pub status_code: u16,
    pub request: TruncatedRequest,
    pub requested_at: DateTime<Utc>,
}

/// The request input of a call, as handed to the backend.
#[derive(Debug, Clone, Copy)]
pub enum RequestInput<'a> {
    Text(&'a str),
    List(&'a [String]),
}

/// Shortened copy of a request input, safe to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruncatedRequest {
    pub input_truncated: TruncatedInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TruncatedInput {
    Text(String),
    List(Vec<String>),
}

impl TruncatedRequest {
    /// Strings over 1000 characters are cut and suffixed with `...`. Lists
    /// keep their first 5 elements, each cut at 100 characters, plus a final
    /// `...` element when more were supplied.
    pub fn from_input(input: RequestInput<'_>) -> Self {
        let input_truncated = match input {
            RequestInput::Text(text) => TruncatedInput::Text(truncate_chars(text, MAX_TEXT_CHARS)),
            RequestInput::List(items) => {
                let mut kept: Vec<String> = items
                    .iter()
                    .take(MAX_LIST_ITEMS)
                    .map(|item| truncate_chars(item, MAX_ITEM_CHARS))
                    .collect();
                if items.len() > MAX_LIST_ITEMS {
                    kept.push(ELLIPSIS.to_string());
                }
                TruncatedInput::List(kept)
            }
        };

        Self { input_truncated }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
