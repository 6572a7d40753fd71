//! Chat completion over an OpenAI-compatible API.

use super::ChatCompleter;
use crate::config::{CompletionSettings, ProviderSettings};
use crate::error::{LektorError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

/// Completer backed by a hosted chat model.
pub struct OpenAiCompleter {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiCompleter {
    pub fn new(provider: &ProviderSettings, settings: &CompletionSettings) -> Self {
        Self {
            client: create_client(provider),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl ChatCompleter for OpenAiCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LektorError::Provider(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| LektorError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LektorError::Provider(format!("Completion API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| LektorError::Provider("Empty response from model".to_string()))?
            .trim()
            .to_string();

        debug!(chars = content.len(), "Completion received");
        Ok(content)
    }
}
