//! Default configuration constants for salesql.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Audio sample rate in Hz expected by the transcription model.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Fixed input window of the Whisper model, in seconds.
///
/// Audio is padded with silence or trimmed to exactly this duration before
/// inference, matching the model's training window.
pub const WHISPER_WINDOW_SECS: u32 = 30;

/// Fixed input window of the Whisper model, in samples at [`SAMPLE_RATE`].
pub const WHISPER_WINDOW_SAMPLES: usize = (SAMPLE_RATE * WHISPER_WINDOW_SECS) as usize;

/// Default Whisper model name.
///
/// "base" (multilingual) supports auto-detection of any language.
/// Use "base.en" explicitly for English-only optimized transcription.
pub const DEFAULT_MODEL: &str = "base";

/// Default language code for transcription.
///
/// "auto" lets Whisper detect the spoken language automatically.
/// Set to a specific code (e.g., "en", "de") to force a language.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Suffix for English-only model variants.
pub const ENGLISH_ONLY_SUFFIX: &str = ".en";

/// Sampling temperature sent with every completion request.
///
/// The sampling configuration is fixed. It is part of the request contract,
/// not a tunable, and identical across all invocations regardless of input.
pub const TEMPERATURE: f64 = 0.5;

/// Maximum output length in tokens for a completion response.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Nucleus sampling parameter sent with every completion request.
pub const TOP_P: f64 = 1.0;

/// Top-k sampling parameter sent with every completion request.
pub const TOP_K: u32 = 40;

/// Default bind address for the chat surface.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for the chat surface.
pub const DEFAULT_PORT: u16 = 7860;

/// Environment variable consulted for the completion endpoint API key.
pub const DEFAULT_API_KEY_ENV: &str = "SALESQL_API_KEY";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whisper_window_is_30s_at_16khz() {
        assert_eq!(WHISPER_WINDOW_SAMPLES, 480_000);
    }

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }
}
