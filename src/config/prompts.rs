//! Prompt templates for Lektor.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub quiz: QuizPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for summarization and translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    /// Full lecture summary in the detected language.
    pub lecture: String,
    /// Bullet-point summary of an uploaded transcript.
    pub bullets: String,
    /// Text translation.
    pub translate: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            lecture: "Summarize this lecture in {{language}}:\n\n{{transcript}}".to_string(),
            bullets: "Summarize this transcript in bullet points in {{language}}:\n\n{{transcript}}"
                .to_string(),
            translate: "Translate this text into {{target}}:\n\n{{text}}".to_string(),
        }
    }
}

/// Prompts for quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    /// Main-topic extraction from a transcript excerpt.
    pub topic: String,
    /// Quiz generation with resource suggestions.
    pub generate: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            topic: "Extract the main topic (2-5 words) from:\n\n{{transcript}}".to_string(),

            generate: r#"Based on the topic **{{topic}}** and transcript:
1. Generate a {{difficulty}}-level quiz with {{count}} MCQs.
2. Each MCQ must have 4 options and a correct answer.
3. Provide 3 learning articles (Wikipedia, GeeksforGeeks, Docs).
4. Provide 2 YouTube videos from verified educational channels.

Transcript:
{{transcript}}

Return valid JSON ONLY:
{
  "quiz": [{"question":"...", "options":["..."], "answer":"..."}],
  "suggestions": {
    "articles":[{"topic":"...","link":"..."}],
    "videos":[{"title":"...","url":"..."}]
  }
}"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.summary.lecture.contains("{{transcript}}"));
        assert!(prompts.quiz.generate.contains("{{count}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Summarize this lecture in {{language}}:\n\n{{transcript}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("language".to_string(), "English".to_string());
        vars.insert("transcript".to_string(), "hello".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Summarize this lecture in English:\n\nhello");
    }
}
