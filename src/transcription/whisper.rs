//! Whisper-class transcription over an OpenAI-compatible API.

use super::Transcriber;
use crate::config::{ProviderSettings, TranscriptionSettings};
use crate::error::{LektorError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// Transcriber backed by a hosted Whisper-class model.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(provider: &ProviderSettings, settings: &TranscriptionSettings) -> Self {
        Self {
            client: create_client(provider),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| LektorError::Provider(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| LektorError::Provider(format!("Transcription API error: {}", e)))?;

        let text = response.text.trim().to_string();
        debug!(chars = text.len(), "Transcription complete");
        Ok(text)
    }
}
