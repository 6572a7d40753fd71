//! Text completion capability.
//!
//! Summarization, translation, topic extraction and quiz generation all go
//! through this single interface with different prompts.

mod openai;

pub use openai::OpenAiCompleter;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Run one prompt through the configured model and return the raw text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
