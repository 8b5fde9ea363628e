//! Binds transcription, prompt assembly, and completion into chat turns.
//!
//! Each submission runs exactly one synchronous chain: optional transcription,
//! flattening against the caller's history, one completion request, one new
//! turn. Failures anywhere in the chain propagate to the surface untouched.

use crate::chat::history::{History, Turn};
use crate::error::{Result, SalesqlError};
use crate::llm::client::CompletionClient;
use crate::prompt;
use crate::stt::transcriber::Transcriber;
use std::path::Path;
use std::sync::Arc;

/// The conversation engine shared by every surface.
///
/// Holds the one-time-loaded model handles; per-session history is passed in
/// and returned updated, never stored here.
#[derive(Clone)]
pub struct ChatEngine {
    transcriber: Option<Arc<dyn Transcriber>>,
    completion: Arc<dyn CompletionClient>,
}

impl ChatEngine {
    pub fn new(transcriber: Arc<dyn Transcriber>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            transcriber: Some(transcriber),
            completion,
        }
    }

    /// Engine without a transcription model; audio submissions will fail.
    ///
    /// Used by typed-only surfaces so they don't pay the Whisper load.
    pub fn text_only(completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            transcriber: None,
            completion,
        }
    }

    /// Name of the loaded transcription model, if one is loaded.
    pub fn model_name(&self) -> Option<&str> {
        self.transcriber.as_deref().map(|t| t.model_name())
    }

    /// Submit a typed message against the given history.
    ///
    /// Returns the generated reply and the history with the new turn
    /// appended.
    pub async fn submit_text(&self, message: &str, mut history: History) -> Result<(String, History)> {
        let flattened = history.flatten_with(message);
        let prompt = prompt::build_prompt(&flattened);
        let reply = self.completion.complete(&prompt).await?;
        history.push(Turn::new(message, reply.as_str()));
        Ok((reply, history))
    }

    /// Submit a recorded audio file against the given history.
    ///
    /// Transcribes first, on a blocking thread so Whisper inference cannot
    /// stall the async runtime, then follows the same chain as a typed
    /// message. Returns the transcript alongside the reply so the surface
    /// can show what was heard.
    pub async fn submit_audio(
        &self,
        audio_path: &Path,
        history: History,
    ) -> Result<(String, String, History)> {
        let Some(transcriber) = &self.transcriber else {
            return Err(SalesqlError::Transcription {
                message: "no transcription model loaded".to_string(),
            });
        };

        let transcriber = Arc::clone(transcriber);
        let path = audio_path.to_path_buf();
        let transcript = tokio::task::spawn_blocking(move || transcriber.transcribe_file(&path))
            .await
            .map_err(|e| SalesqlError::Transcription {
                message: format!("transcription task failed: {e}"),
            })??;

        let (reply, history) = self.submit_text(&transcript, history).await?;
        Ok((transcript, reply, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockCompletionClient;
    use crate::stt::transcriber::MockTranscriber;

    fn engine_with(completion: Arc<MockCompletionClient>) -> ChatEngine {
        ChatEngine::new(
            Arc::new(MockTranscriber::new("mock-model")),
            completion,
        )
    }

    fn write_silence_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..1600 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn history_grows_by_one_per_submission() {
        let completion = Arc::new(MockCompletionClient::new("SELECT 1;"));
        let engine = engine_with(Arc::clone(&completion));

        let mut history = History::new();
        for i in 1..=3 {
            let (_, updated) = engine
                .submit_text(&format!("question {i}"), history)
                .await
                .unwrap();
            history = updated;
            assert_eq!(history.len(), i);
        }

        for (i, turn) in history.turns().iter().enumerate() {
            assert_eq!(turn.input, format!("question {}", i + 1));
            assert_eq!(turn.output, "SELECT 1;");
        }
    }

    #[tokio::test]
    async fn first_submission_embeds_bare_input_in_prompt() {
        let completion = Arc::new(MockCompletionClient::new("SELECT 1;"));
        let engine = engine_with(Arc::clone(&completion));

        let question = "List top 5 products by sales in 2023";
        let (reply, history) = engine.submit_text(question, History::new()).await.unwrap();

        assert_eq!(reply, "SELECT 1;");
        assert_eq!(history.len(), 1);

        let prompts = completion.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with(&format!("input: {question} output:")));
    }

    #[tokio::test]
    async fn later_prompts_carry_full_conversation_in_order() {
        let completion = Arc::new(MockCompletionClient::new("answer"));
        let engine = engine_with(Arc::clone(&completion));

        let (_, history) = engine.submit_text("q1", History::new()).await.unwrap();
        let (_, history) = engine.submit_text("q2", history).await.unwrap();
        let (_, _) = engine.submit_text("q3", history).await.unwrap();

        let prompts = completion.prompts();
        assert!(prompts[1].ends_with("input: q1 answer q2 output:"));
        assert!(prompts[2].ends_with("input: q1 answer q2 answer q3 output:"));
    }

    #[tokio::test]
    async fn failed_completion_leaves_no_turn_behind() {
        let completion = Arc::new(MockCompletionClient::new("unused").with_failure());
        let engine = engine_with(completion);

        let result = engine.submit_text("question", History::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn audio_submission_stores_transcript_as_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wav_path = temp_dir.path().join("question.wav");
        write_silence_wav(&wav_path);

        let completion = Arc::new(MockCompletionClient::new("SELECT 1;"));
        let engine = ChatEngine::new(
            Arc::new(MockTranscriber::new("mock-model").with_response("spoken question")),
            completion.clone(),
        );

        let (transcript, reply, history) = engine
            .submit_audio(&wav_path, History::new())
            .await
            .unwrap();

        assert_eq!(transcript, "spoken question");
        assert_eq!(reply, "SELECT 1;");
        assert_eq!(history.len(), 1);
        assert_eq!(history.turns()[0].input, "spoken question");

        assert!(
            completion.prompts()[0].ends_with("input: spoken question output:")
        );
    }

    #[tokio::test]
    async fn audio_decode_error_propagates() {
        let completion = Arc::new(MockCompletionClient::new("unused"));
        let engine = engine_with(Arc::clone(&completion));

        let result = engine
            .submit_audio(Path::new("/nonexistent/clip.wav"), History::new())
            .await;

        assert!(matches!(result, Err(SalesqlError::AudioDecode { .. })));
        // The completion endpoint was never contacted
        assert!(completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn text_only_engine_rejects_audio() {
        let engine = ChatEngine::text_only(Arc::new(MockCompletionClient::new("answer")));
        assert!(engine.model_name().is_none());

        let result = engine
            .submit_audio(Path::new("question.wav"), History::new())
            .await;
        assert!(matches!(result, Err(SalesqlError::Transcription { .. })));
    }

    #[tokio::test]
    async fn mixed_text_and_audio_share_one_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wav_path = temp_dir.path().join("question.wav");
        write_silence_wav(&wav_path);

        let completion = Arc::new(MockCompletionClient::new("answer"));
        let engine = ChatEngine::new(
            Arc::new(MockTranscriber::new("mock-model").with_response("spoken")),
            completion.clone(),
        );

        let (_, history) = engine.submit_text("typed", History::new()).await.unwrap();
        let (_, _, history) = engine.submit_audio(&wav_path, history).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].input, "typed");
        assert_eq!(history.turns()[1].input, "spoken");

        assert!(
            completion.prompts()[1].ends_with("input: typed answer spoken output:")
        );
    }
}
