//! Speech-to-text transcription.
//!
//! The pipeline only depends on the [`Transcriber`] trait; the default
//! implementation calls a Whisper-class model on an OpenAI-compatible
//! endpoint.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return the full text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
