use crate::audio::wav;
use crate::defaults;
use crate::error::{Result, SalesqlError};
use std::path::Path;
use std::sync::Arc;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono, already
    ///   normalized to the model's fixed input window
    ///
    /// # Returns
    /// Transcribed text or error
    fn transcribe(&self, audio: &[i16]) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;

    /// Transcribe an audio file by path.
    ///
    /// Decodes the file to 16kHz mono, pads or trims to the model's fixed
    /// window, then runs inference. Any decode or inference error propagates
    /// to the caller; there is no recovery.
    fn transcribe_file(&self, path: &Path) -> Result<String> {
        let samples = wav::decode_file(path)?;
        let samples = wav::pad_or_trim(samples, defaults::WHISPER_WINDOW_SAMPLES);
        self.transcribe(&samples)
    }
}

/// Implement Transcriber for Arc<T> to allow sharing across request handlers.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<String> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<String> {
        if self.should_fail {
            Err(SalesqlError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transcriber_returns_response() {
        let transcriber =
            MockTranscriber::new("test-model").with_response("top products by sales");

        let audio = vec![0i16; 1000];
        let result = transcriber.transcribe(&audio);

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "top products by sales");
    }

    #[test]
    fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure();

        let audio = vec![0i16; 1000];
        let result = transcriber.transcribe(&audio);

        assert!(result.is_err());
        match result {
            Err(SalesqlError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            _ => panic!("Expected Transcription error"),
        }
    }

    #[test]
    fn test_mock_transcriber_model_name() {
        let transcriber = MockTranscriber::new("whisper-base");
        assert_eq!(transcriber.model_name(), "whisper-base");
    }

    #[test]
    fn test_mock_transcriber_is_ready() {
        let ready_transcriber = MockTranscriber::new("test-model");
        assert!(ready_transcriber.is_ready());

        let failing_transcriber = MockTranscriber::new("test-model").with_failure();
        assert!(!failing_transcriber.is_ready());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.model_name(), "test-model");
        assert!(transcriber.is_ready());

        let audio = vec![0i16; 100];
        let result = transcriber.transcribe(&audio);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "boxed test");
    }

    #[test]
    fn test_arc_transcriber_delegates() {
        let transcriber = Arc::new(MockTranscriber::new("shared").with_response("shared result"));

        assert_eq!(transcriber.model_name(), "shared");
        let audio = vec![0i16; 10];
        assert_eq!(transcriber.transcribe(&audio).unwrap(), "shared result");
    }

    #[test]
    fn test_transcribe_file_decodes_then_transcribes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("question.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..1600 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let transcriber = MockTranscriber::new("test-model").with_response("from file");
        assert_eq!(transcriber.transcribe_file(&path).unwrap(), "from file");
    }

    #[test]
    fn test_transcribe_file_propagates_decode_error() {
        let transcriber = MockTranscriber::new("test-model");
        let result = transcriber.transcribe_file(Path::new("/nonexistent/question.wav"));
        assert!(matches!(result, Err(SalesqlError::AudioDecode { .. })));
    }

    #[test]
    fn test_mock_transcriber_repeated_calls_are_identical() {
        // Fixed decoding settings make transcription idempotent per input
        let transcriber = MockTranscriber::new("test-model").with_response("same answer");
        let audio = vec![0i16; 100];

        let first = transcriber.transcribe(&audio).unwrap();
        let second = transcriber.transcribe(&audio).unwrap();
        assert_eq!(first, second);
    }
}
