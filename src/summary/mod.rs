//! Summarization and translation on top of the completion capability.
//!
//! Model output is passed through a sanitizer that strips boilerplate
//! preambles and meta-commentary before anything reaches the caller.

mod language;

pub use language::{detect_language, language_name};

use crate::completion::ChatCompleter;
use crate::config::Prompts;
use crate::error::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Sentinel returned when sanitization leaves nothing usable.
pub const NO_SUMMARY: &str = "No summary available.";

/// Summary generation for transcripts.
pub struct Summarizer {
    completer: Arc<dyn ChatCompleter>,
    prompts: Prompts,
    max_prompt_chars: usize,
    boilerplate: Regex,
}

impl Summarizer {
    pub fn new(completer: Arc<dyn ChatCompleter>, prompts: Prompts, max_prompt_chars: usize) -> Self {
        // Lines the models like to prepend around the actual summary
        let boilerplate = Regex::new(r"(?i)here is a summary|if you would like me")
            .expect("Invalid boilerplate regex");

        Self {
            completer,
            prompts,
            max_prompt_chars,
            boilerplate,
        }
    }

    /// Summarize a lecture transcript in the given language (639-1 code).
    #[instrument(skip(self, transcript))]
    pub async fn summarize(&self, transcript: &str, language_code: &str) -> Result<String> {
        info!(language = language_code, "Requesting lecture summary");
        let prompt = self.render(&self.prompts.summary.lecture, transcript, language_code);
        let raw = self.completer.complete(&prompt).await?;
        Ok(self.sanitize(&raw))
    }

    /// Summarize transcript text in bullet-point form.
    #[instrument(skip(self, transcript))]
    pub async fn summarize_bullets(&self, transcript: &str, language_code: &str) -> Result<String> {
        let prompt = self.render(&self.prompts.summary.bullets, transcript, language_code);
        let raw = self.completer.complete(&prompt).await?;
        Ok(self.sanitize(&raw))
    }

    /// Translate text into a target language.
    #[instrument(skip(self, text))]
    pub async fn translate(&self, text: &str, target: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), text.to_string());
        vars.insert("target".to_string(), target.to_string());

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.translate, &vars);
        let raw = self.completer.complete(&prompt).await?;
        Ok(self.sanitize(&raw))
    }

    fn render(&self, template: &str, transcript: &str, language_code: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "language".to_string(),
            language_name(language_code),
        );
        vars.insert(
            "transcript".to_string(),
            truncate_chars(transcript, self.max_prompt_chars).to_string(),
        );
        self.prompts.render_with_custom(template, &vars)
    }

    /// Strip boilerplate lines and blank lines from model output.
    ///
    /// An empty result becomes the [`NO_SUMMARY`] sentinel rather than empty
    /// text.
    pub fn sanitize(&self, raw: &str) -> String {
        let cleaned: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.boilerplate.is_match(line))
            .collect();

        if cleaned.is_empty() {
            NO_SUMMARY.to_string()
        } else {
            cleaned.join("\n")
        }
    }
}

/// Truncate to a character limit without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;

    struct EchoCompleter(String);

    #[async_trait]
    impl ChatCompleter for EchoCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn summarizer(reply: &str) -> Summarizer {
        Summarizer::new(
            Arc::new(EchoCompleter(reply.to_string())),
            Prompts::default(),
            8000,
        )
    }

    #[test]
    fn test_sanitize_strips_boilerplate_and_blanks() {
        let s = summarizer("");
        let raw = "Here is a summary of the lecture:\n\nPoint one.\n\nPoint two.\n\
                   If you would like me to expand, say so.";
        assert_eq!(s.sanitize(raw), "Point one.\nPoint two.");
    }

    #[test]
    fn test_all_boilerplate_yields_sentinel() {
        let s = summarizer("");
        assert_eq!(s.sanitize("Here is a summary of the talk:\n\n"), NO_SUMMARY);
        assert_eq!(s.sanitize(""), NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_summarize_applies_sanitizer() {
        let s = summarizer("here is a summary:\nActual content.");
        let out = s.summarize("a transcript", "en").await.unwrap();
        assert_eq!(out, "Actual content.");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
