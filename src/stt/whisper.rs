//! Whisper-based speech-to-text transcription.
//!
//! This module provides a Whisper implementation of the Transcriber trait using whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be installed.
//! To build with Whisper support:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::defaults;
use crate::error::{Result, SalesqlError};
use crate::stt::transcriber::Transcriber;
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for Whisper transcriber.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,
    /// Language code ("auto" to detect, or e.g. "en", "es", "fr")
    pub language: String,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.bin"),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

/// Whisper-based transcriber implementation.
///
/// The model is loaded once at construction and held for the process
/// lifetime. The WhisperContext is wrapped in a Mutex to ensure thread safety.
///
/// # Feature Gate
///
/// This type is only available when the `whisper` feature is enabled.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper-based transcriber placeholder (without whisper feature).
///
/// This is a stub implementation that returns errors when used.
/// Enable the `whisper` feature to use real transcription.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: WhisperConfig,
    model_name: String,
}

fn model_name_from_path(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber.
    ///
    /// # Errors
    /// Returns `SalesqlError::TranscriptionModelNotFound` if the model file doesn't exist
    /// Returns `SalesqlError::TranscriptionInferenceFailed` if model loading fails
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(SalesqlError::TranscriptionModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        let mut context_params = WhisperContextParameters::default();
        // Fused attention kernels avoid the standalone softmax CUDA kernel,
        // which crashes on Blackwell GPUs (sm_120) with ggml <= 1.7.6
        context_params.flash_attn(true);
        let context = WhisperContext::new_with_params(
            config.model_path.to_str().ok_or_else(|| {
                SalesqlError::TranscriptionInferenceFailed {
                    message: "Invalid UTF-8 in model path".to_string(),
                }
            })?,
            context_params,
        )
        .map_err(|e| SalesqlError::TranscriptionInferenceFailed {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// Whisper expects audio in f32 format normalized to the range [-1.0, 1.0].
    /// Input is 16-bit PCM audio where samples range from -32768 to 32767.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber (stub implementation).
    ///
    /// This returns an error indicating that the whisper feature is not enabled.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(SalesqlError::TranscriptionModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// This function is available even without the whisper feature for testing.
    pub fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        let audio_f32 = Self::convert_audio(audio);

        let context =
            self.context
                .lock()
                .map_err(|e| SalesqlError::TranscriptionInferenceFailed {
                    message: format!("Failed to acquire context lock: {}", e),
                })?;

        let mut state =
            context
                .create_state()
                .map_err(|e| SalesqlError::TranscriptionInferenceFailed {
                    message: format!("Failed to create Whisper state: {}", e),
                })?;

        // Greedy sampling keeps decoding deterministic for a fixed input
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // Auto-detect the dominant language unless one is pinned
        if self.config.language == defaults::AUTO_LANGUAGE {
            params.set_language(None);
        } else {
            params.set_language(Some(&self.config.language));
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        // Disable printing to stdout/stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| SalesqlError::TranscriptionInferenceFailed {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let mut transcription = String::new();
        for segment in state.as_iter() {
            transcription.push_str(&segment.to_string());
        }

        Ok(transcription.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<String> {
        Err(SalesqlError::TranscriptionInferenceFailed {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release (whisper is enabled by default)\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_whisper_config_default() {
        let config = WhisperConfig::default();
        assert_eq!(config.model_path, PathBuf::from("models/ggml-base.bin"));
        assert_eq!(config.language, defaults::AUTO_LANGUAGE);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn test_whisper_config_custom() {
        let config = WhisperConfig {
            model_path: PathBuf::from("/custom/model.bin"),
            language: "es".to_string(),
            threads: Some(4),
        };
        assert_eq!(config.model_path, PathBuf::from("/custom/model.bin"));
        assert_eq!(config.language, "es");
        assert_eq!(config.threads, Some(4));
    }

    #[test]
    fn test_whisper_transcriber_new_fails_for_missing_model() {
        let config = WhisperConfig {
            model_path: PathBuf::from("/nonexistent/model.bin"),
            language: "en".to_string(),
            threads: None,
        };

        let result = WhisperTranscriber::new(config);
        assert!(result.is_err());

        match result {
            Err(SalesqlError::TranscriptionModelNotFound { path }) => {
                assert_eq!(path, "/nonexistent/model.bin");
            }
            _ => panic!("Expected TranscriptionModelNotFound error"),
        }
    }

    #[test]
    fn test_model_name_extraction() {
        assert_eq!(
            model_name_from_path(Path::new("/models/ggml-base.bin")),
            "ggml-base"
        );
        assert_eq!(model_name_from_path(Path::new("weird")), "weird");
    }

    #[test]
    fn test_convert_audio_i16_to_f32() {
        let samples = vec![0i16, 16384, -16384, 32767, -32768];
        let converted = WhisperTranscriber::convert_audio(&samples);

        assert_eq!(converted.len(), samples.len());
        assert_eq!(converted[0], 0.0);
        assert!((converted[1] - 0.5).abs() < 0.01);
        assert!((converted[2] + 0.5).abs() < 0.01);
        assert!((converted[3] - 0.999969).abs() < 0.01);
        assert_eq!(converted[4], -1.0);
    }

    #[test]
    fn test_convert_audio_empty() {
        let samples: Vec<i16> = vec![];
        let converted = WhisperTranscriber::convert_audio(&samples);
        assert_eq!(converted.len(), 0);
    }

    #[test]
    fn test_whisper_transcriber_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<WhisperTranscriber>();
        assert_sync::<WhisperTranscriber>();
    }

    // Integration tests — run automatically when any model is installed,
    // print a visible warning and skip when not.

    /// Models to try, best-to-worst for English transcription tests.
    const MODEL_CANDIDATES: &[&str] = &[
        "base.en", "small.en", "tiny.en", "medium.en", "base", "small", "tiny", "medium", "large",
    ];

    /// Look for a model file in the cache dir and local `models/` dir.
    fn try_find_model(name: &str) -> Option<PathBuf> {
        let filename = format!("ggml-{}.bin", name);

        if let Ok(home) = std::env::var("HOME") {
            let path = PathBuf::from(home)
                .join(".cache/salesql/models")
                .join(&filename);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from("models").join(&filename);
        if local.exists() {
            return Some(local);
        }

        None
    }

    /// Find any installed model from `MODEL_CANDIDATES`.
    /// Prints a big warning and returns `None` if nothing is installed.
    fn require_any_model() -> Option<PathBuf> {
        for name in MODEL_CANDIDATES {
            if let Some(path) = try_find_model(name) {
                return Some(path);
            }
        }
        eprintln!();
        eprintln!("  ╔══════════════════════════════════════════════════════════════╗");
        eprintln!("  ║  WARNING: NO WHISPER MODEL FOUND — SKIPPING TEST             ║");
        eprintln!("  ║                                                              ║");
        eprintln!("  ║  Install any model to enable whisper tests:                  ║");
        eprintln!("  ║                                                              ║");
        eprintln!("  ║    cargo run -- models install base.en                       ║");
        eprintln!("  ║                                                              ║");
        eprintln!("  ╚══════════════════════════════════════════════════════════════╝");
        eprintln!();
        None
    }

    /// Detect language setting for a model path (English-only → "en", multilingual → "auto").
    fn language_for_model(path: &Path) -> &'static str {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if stem.ends_with(defaults::ENGLISH_ONLY_SUFFIX) {
            "en"
        } else {
            defaults::AUTO_LANGUAGE
        }
    }

    #[test]
    #[cfg(feature = "whisper")]
    fn test_whisper_transcriber_with_real_model() {
        let Some(model_path) = require_any_model() else {
            return;
        };

        let language = language_for_model(&model_path).to_string();
        let config = WhisperConfig {
            model_path,
            language,
            threads: Some(4),
        };

        let transcriber = WhisperTranscriber::new(config).unwrap();
        assert!(transcriber.is_ready());
        assert!(!transcriber.model_name().is_empty());
    }

    #[test]
    #[cfg(feature = "whisper")]
    fn test_whisper_transcribe_is_deterministic_for_fixed_input() {
        let Some(model_path) = require_any_model() else {
            return;
        };

        let language = language_for_model(&model_path).to_string();
        let config = WhisperConfig {
            model_path,
            language,
            threads: Some(4),
        };

        let transcriber = WhisperTranscriber::new(config).unwrap();

        let audio = vec![0i16; crate::defaults::WHISPER_WINDOW_SAMPLES];
        let first = transcriber.transcribe(&audio).unwrap();
        let second = transcriber.transcribe(&audio).unwrap();

        assert_eq!(first, second, "greedy decode must be repeatable");
    }
}
