//! JSON message protocol between the chat page and the server.

use crate::chat::history::History;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat/text`.
///
/// The client sends its full history back with every message; the server
/// keeps no per-session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    pub message: String,
    #[serde(default)]
    pub history: History,
}

/// Reply for both submit endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// What the transcriber heard (only present for audio submissions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub reply: String,
    pub history: History,
}

/// Error payload returned with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
