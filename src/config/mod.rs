//! Configuration module for Lektor.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuizPrompts, SummaryPrompts};
pub use settings::{
    CacheSettings, CompletionSettings, DownloadSettings, GeneralSettings, PromptSettings,
    ProviderSettings, RenderSettings, Settings, SlideSettings, TranscriptionSettings,
};
