//! Error types for salesql.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesqlError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio decoding errors
    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Completion endpoint errors
    #[error("Completion request failed: {message}")]
    CompletionRequest { message: String },

    #[error("Completion endpoint returned {status}: {message}")]
    CompletionStatus { status: u16, message: String },

    #[error("Completion response invalid: {message}")]
    CompletionResponse { message: String },

    // HTTP surface errors
    #[error("Server error: {message}")]
    Server { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SalesqlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = SalesqlError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = SalesqlError::ConfigInvalidValue {
            key: "server.port".to_string(),
            message: "must be a number".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for server.port: must be a number"
        );
    }

    #[test]
    fn test_audio_decode_display() {
        let error = SalesqlError::AudioDecode {
            message: "not a WAV file".to_string(),
        };
        assert_eq!(error.to_string(), "Audio decode failed: not a WAV file");
    }

    #[test]
    fn test_transcription_model_not_found_display() {
        let error = SalesqlError::TranscriptionModelNotFound {
            path: "/models/whisper.bin".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription model not found at /models/whisper.bin"
        );
    }

    #[test]
    fn test_transcription_inference_failed_display() {
        let error = SalesqlError::TranscriptionInferenceFailed {
            message: "out of memory".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription inference failed: out of memory"
        );
    }

    #[test]
    fn test_completion_request_display() {
        let error = SalesqlError::CompletionRequest {
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Completion request failed: connection refused"
        );
    }

    #[test]
    fn test_completion_status_display() {
        let error = SalesqlError::CompletionStatus {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Completion endpoint returned 429: quota exceeded"
        );
    }

    #[test]
    fn test_completion_response_display() {
        let error = SalesqlError::CompletionResponse {
            message: "missing text field".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Completion response invalid: missing text field"
        );
    }

    #[test]
    fn test_server_display() {
        let error = SalesqlError::Server {
            message: "bind failed".to_string(),
        };
        assert_eq!(error.to_string(), "Server error: bind failed");
    }

    #[test]
    fn test_other_display() {
        let error = SalesqlError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SalesqlError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: SalesqlError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: SalesqlError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SalesqlError>();
        assert_sync::<SalesqlError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
