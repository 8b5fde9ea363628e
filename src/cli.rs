//! Command-line interface for salesql
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Ask supermarket sales questions by voice or text, get SQL back
#[derive(Parser, Debug)]
#[command(
    name = "salesql",
    version,
    about = "Ask supermarket sales questions by voice or text, get SQL back"
)]
pub struct Cli {
    /// Subcommand to execute (default: serve the chat page)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Whisper model (default: base, multilingual). Use base.en for English-only optimized
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code for transcription (default: auto-detect). Examples: auto, en, de, es
    #[arg(long, global = true, value_name = "LANG")]
    pub language: Option<String>,

    /// Prevent automatic model download if configured model is missing
    #[arg(long, global = true)]
    pub no_download: bool,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the chat page (default command)
    Serve {
        /// Bind address (default: from config, 127.0.0.1)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port (default: from config, 7860)
        #[arg(long, short, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Ask one question from the terminal; omit the question for a chat loop
    Ask {
        /// The question. With no question, reads turns interactively
        question: Option<String>,
    },

    /// Transcribe a WAV file and print the text
    Transcribe {
        /// WAV file to transcribe
        file: PathBuf,
    },

    /// Manage Whisper models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Show or edit configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List available models
    List,

    /// Download and install a model
    Install {
        /// Model name (e.g., base, base.en, small)
        name: String,
    },

    /// Set the default model
    Use {
        /// Model name (e.g., base, base.en, small)
        name: String,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print a single value, e.g. `salesql config get stt.model`
    Get {
        /// Dotted key path
        key: String,
    },

    /// Set a value, e.g. `salesql config set llm.endpoint https://…`
    Set {
        /// Dotted key path
        key: String,
        /// New value
        value: String,
    },

    /// Print an annotated configuration template
    Dump,
}
