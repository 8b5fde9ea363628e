//! Whisper model metadata catalog.
//!
//! This module provides a catalog of available Whisper models from OpenAI,
//! including model information, availability checks, and defaults.

/// Metadata for a Whisper model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g., "tiny.en", "base", "large")
    pub name: &'static str,
    /// Model size in megabytes
    pub size_mb: u32,
    /// SHA-1 checksum for integrity verification (empty = skip verification)
    pub sha1: &'static str,
    /// Whether this model supports English only
    pub english_only: bool,
}

impl ModelInfo {
    /// Download URL for the ggml checkpoint on HuggingFace.
    pub fn url(&self) -> String {
        format!(
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-{}.bin",
            self.name
        )
    }
}

/// Catalog of available Whisper models.
///
/// Models range from tiny (75 MB, fast, lower accuracy) to large (3094 MB, slower,
/// highest accuracy). The `.en` suffix indicates English-only models, which are
/// faster and smaller.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "tiny.en",
        size_mb: 75,
        sha1: "",
        english_only: true,
    },
    ModelInfo {
        name: "tiny",
        size_mb: 75,
        sha1: "",
        english_only: false,
    },
    ModelInfo {
        name: "base.en",
        size_mb: 142,
        sha1: "",
        english_only: true,
    },
    ModelInfo {
        name: "base",
        size_mb: 142,
        sha1: "",
        english_only: false,
    },
    ModelInfo {
        name: "small.en",
        size_mb: 466,
        sha1: "",
        english_only: true,
    },
    ModelInfo {
        name: "small",
        size_mb: 466,
        sha1: "",
        english_only: false,
    },
    ModelInfo {
        name: "medium.en",
        size_mb: 1533,
        sha1: "",
        english_only: true,
    },
    ModelInfo {
        name: "medium",
        size_mb: 1533,
        sha1: "",
        english_only: false,
    },
    ModelInfo {
        name: "large",
        size_mb: 3094,
        sha1: "",
        english_only: false,
    },
];

/// Find a model by name.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// Get all available models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

/// Normalize a user-supplied model name to its catalog form.
///
/// Accepts `ggml-` prefixed names and `-en`/`_en` suffix spellings, e.g.
/// `ggml-base.bin`, `base-en`, and `BASE.EN` all resolve to catalog names.
pub fn resolve_name(name: &str) -> &str {
    let mut candidate = name.trim().to_ascii_lowercase();
    if let Some(stripped) = candidate.strip_prefix("ggml-") {
        candidate = stripped.to_string();
    }
    if let Some(stripped) = candidate.strip_suffix(".bin") {
        candidate = stripped.to_string();
    }
    candidate = candidate.replace("-en", ".en").replace("_en", ".en");

    MODELS
        .iter()
        .map(|m| m.name)
        .find(|n| *n == candidate)
        .unwrap_or(name)
}
