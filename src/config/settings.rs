//! Configuration settings for Lektor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub transcription: TranscriptionSettings,
    pub completion: CompletionSettings,
    pub slides: SlideSettings,
    pub render: RenderSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for per-request working files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Upper bound for a single pipeline stage, in seconds.
    pub stage_timeout_seconds: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.lektor".to_string(),
            temp_dir: "/tmp/lektor".to_string(),
            log_level: "info".to_string(),
            stage_timeout_seconds: 600,
        }
    }
}

/// Provider endpoint settings shared by transcription and completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of an OpenAI-compatible API. None = api.openai.com.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_base: Some("https://api.groq.com/openai/v1".to_string()),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Artifact cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory holding hash-keyed cache entries.
    pub dir: String,
    /// Maximum number of cached entries kept on disk.
    pub max_entries: usize,
    /// Reset the whole cache when a new video's hash differs from the
    /// current one (single-slot policy). When false, oldest entries are
    /// evicted once `max_entries` is exceeded.
    pub reset_on_new_video: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: "~/.lektor/cache".to_string(),
            max_entries: 2,
            reset_on_new_video: true,
        }
    }
}

/// Video download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Ordered yt-dlp format preferences; the first attempt that produces a
    /// non-trivial file wins.
    pub formats: Vec<String>,
    /// Minimum size for a download to count as successful, in bytes.
    pub min_file_bytes: u64,
    /// Socket timeout passed to yt-dlp, in seconds.
    pub socket_timeout_seconds: u32,
    /// Retry count passed to yt-dlp per format attempt.
    pub retries: u32,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            formats: vec![
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/mp4".to_string(),
                "bv*+ba/b".to_string(),
                "best[ext=mp4]/mp4".to_string(),
                "best[height<=480]".to_string(),
            ],
            min_file_bytes: 1024,
            socket_timeout_seconds: 30,
            retries: 3,
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper-class model to use.
    pub model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-large-v3".to_string(),
        }
    }
}

/// Chat completion settings (summaries, translation, topics, quizzes).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Model used for all text-completion prompts.
    pub model: String,
    /// Maximum transcript characters included in a summary prompt.
    pub max_prompt_chars: usize,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            max_prompt_chars: 8000,
        }
    }
}

/// Slide extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    /// Scene-change sensitivity on a 0-255 pixel-delta scale.
    pub sensitivity: f64,
    /// Maximum concurrent OCR invocations.
    pub max_concurrent_ocr: usize,
    /// Tesseract language code.
    pub ocr_language: String,
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            sensitivity: 30.0,
            max_concurrent_ocr: 4,
            ocr_language: "eng".to_string(),
        }
    }
}

/// Deliverable rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Path to a TTF font used for the PDF.
    pub font_path: String,
    /// Title printed on the summary page.
    pub title: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            title: "Lecture Summary".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LektorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lektor")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded cache directory path.
    pub fn cache_dir(&self) -> PathBuf {
        Self::expand_path(&self.cache.dir)
    }

    /// Get the expanded deliverable font path.
    pub fn font_path(&self) -> PathBuf {
        Self::expand_path(&self.render.font_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache.max_entries, 2);
        assert!(settings.cache.reset_on_new_video);
        assert_eq!(settings.download.formats.len(), 4);
        assert_eq!(settings.download.min_file_bytes, 1024);
        assert_eq!(settings.slides.sensitivity, 30.0);
    }

    #[test]
    fn test_partial_config_parses() {
        let toml = r#"
[cache]
max_entries = 5
reset_on_new_video = false
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.cache.max_entries, 5);
        assert!(!settings.cache.reset_on_new_video);
        // Untouched sections keep their defaults
        assert_eq!(settings.completion.max_prompt_chars, 8000);
    }
}
