//! OpenAI-compatible client configuration with sensible defaults.
//!
//! The same client shape talks to any OpenAI-compatible endpoint; the
//! reference deployment points `provider.api_base` at Groq.

use crate::config::ProviderSettings;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for provider API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a provider client from settings.
///
/// Uses a bounded timeout to prevent hung API calls; the API key is read from
/// the environment variable named by `provider.api_key_env`.
pub fn create_client(settings: &ProviderSettings) -> Client<OpenAIConfig> {
    let timeout = if settings.timeout_seconds > 0 {
        Duration::from_secs(settings.timeout_seconds)
    } else {
        Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    };

    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let mut config = OpenAIConfig::default();
    if let Some(base) = &settings.api_base {
        config = config.with_api_base(base.as_str());
    }
    if let Ok(key) = std::env::var(&settings.api_key_env) {
        if !key.is_empty() {
            config = config.with_api_key(key);
        }
    }

    Client::with_config(config).with_http_client(http_client)
}
