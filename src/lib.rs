//! salesql - ask supermarket sales questions by voice or text, get SQL back
//!
//! Wires a local Whisper model, a hosted text-completion endpoint, and a web
//! chat page into one small text-to-SQL assistant for a supermarket sales
//! warehouse.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod chat;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod llm;
pub mod models;
pub mod output;
pub mod prompt;
pub mod server;
pub mod stt;

// Core seams (transcribe → flatten → complete)
pub use chat::engine::ChatEngine;
pub use chat::history::{History, Turn};
pub use llm::client::CompletionClient;
pub use stt::transcriber::Transcriber;

// Error handling
pub use error::{Result, SalesqlError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
