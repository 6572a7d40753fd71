//! Quiz generation from lecture transcripts.
//!
//! Quizzes are ephemeral: generated on demand through the completion
//! capability and never cached. The model is first asked for the lecture's
//! main topic, which then seeds the quiz prompt.

use crate::completion::ChatCompleter;
use crate::config::Prompts;
use crate::error::{LektorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Question count bounds accepted by [`QuizSpec::new`].
pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;

/// Transcript characters fed to the topic-extraction prompt.
const TOPIC_PROMPT_CHARS: usize = 2000;
/// Transcript characters fed to the quiz prompt.
const QUIZ_PROMPT_CHARS: usize = 8000;

/// Requested quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::str::FromStr for Difficulty {
    type Err = LektorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(LektorError::InvalidInput(format!(
                "Unknown difficulty '{}': expected easy, medium or hard",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// A validated quiz request.
#[derive(Debug, Clone)]
pub struct QuizSpec {
    pub source_text: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
}

impl QuizSpec {
    pub fn new(source_text: String, difficulty: Difficulty, question_count: u32) -> Result<Self> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
            return Err(LektorError::InvalidInput(format!(
                "Question count {} out of range [{}, {}]",
                question_count, MIN_QUESTIONS, MAX_QUESTIONS
            )));
        }
        if source_text.trim().is_empty() {
            return Err(LektorError::InvalidInput(
                "Quiz source text is empty".to_string(),
            ));
        }
        Ok(Self {
            source_text,
            difficulty,
            question_count,
        })
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// A suggested learning article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSuggestion {
    pub topic: String,
    pub link: String,
}

/// A suggested video resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSuggestion {
    pub title: String,
    pub url: String,
}

/// Learning-resource suggestions attached to a quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestions {
    pub articles: Vec<ArticleSuggestion>,
    pub videos: Vec<VideoSuggestion>,
}

/// A generated quiz plus resource suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz: Vec<QuizQuestion>,
    #[serde(default)]
    pub suggestions: Suggestions,
}

/// Quiz generation through the completion capability.
pub struct QuizGenerator {
    completer: Arc<dyn ChatCompleter>,
    prompts: Prompts,
}

impl QuizGenerator {
    pub fn new(completer: Arc<dyn ChatCompleter>, prompts: Prompts) -> Self {
        Self { completer, prompts }
    }

    /// Generate a quiz for the given spec.
    ///
    /// Model output that cannot be reduced to valid quiz JSON is a parse
    /// failure, never a crash.
    #[instrument(skip(self, spec), fields(difficulty = %spec.difficulty, count = spec.question_count))]
    pub async fn generate(&self, spec: &QuizSpec) -> Result<QuizResult> {
        let topic = self.extract_topic(&spec.source_text).await?;
        info!(%topic, "Generating quiz");

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic);
        vars.insert("difficulty".to_string(), spec.difficulty.to_string());
        vars.insert("count".to_string(), spec.question_count.to_string());
        vars.insert(
            "transcript".to_string(),
            truncate_chars(&spec.source_text, QUIZ_PROMPT_CHARS).to_string(),
        );

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.quiz.generate, &vars);
        let raw = self.completer.complete(&prompt).await?;

        let json = extract_json_object(&raw).ok_or_else(|| {
            LektorError::Parse(format!(
                "No JSON object in quiz output: {}",
                truncate_chars(&raw, 200)
            ))
        })?;

        let result: QuizResult = serde_json::from_str(json)
            .map_err(|e| LektorError::Parse(format!("Invalid quiz JSON: {}", e)))?;

        for (i, question) in result.quiz.iter().enumerate() {
            if question.options.len() != 4 {
                return Err(LektorError::Parse(format!(
                    "Question {} has {} options, expected 4",
                    i + 1,
                    question.options.len()
                )));
            }
        }

        debug!(questions = result.quiz.len(), "Quiz parsed");
        Ok(result)
    }

    /// Ask the model for the lecture's main topic.
    async fn extract_topic(&self, source_text: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert(
            "transcript".to_string(),
            truncate_chars(source_text, TOPIC_PROMPT_CHARS).to_string(),
        );

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.quiz.topic, &vars);
        Ok(self.completer.complete(&prompt).await?.trim().to_string())
    }
}

/// Find the first balanced `{...}` span in model output.
///
/// Models wrap their JSON in prose; this scans for the first opening brace
/// and tracks nesting (string-aware, so braces inside quoted values don't
/// count) until it closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ScriptedCompleter {
        replies: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedCompleter {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: std::sync::Mutex::new(
                    replies.into_iter().rev().map(String::from).collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl ChatCompleter for ScriptedCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.replies.lock().unwrap().pop().unwrap_or_default())
        }
    }

    fn quiz_json(count: usize) -> String {
        let questions: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"question":"Q{i}?","options":["a","b","c","d"],"answer":"a"}}"#
                )
            })
            .collect();
        format!(
            r#"{{"quiz":[{}],"suggestions":{{"articles":[{{"topic":"t","link":"l"}}],"videos":[{{"title":"v","url":"u"}}]}}}}"#,
            questions.join(",")
        )
    }

    #[test]
    fn test_extract_json_object_with_noise() {
        let text = format!("Sure! Here you go: {} hope that helps", quiz_json(1));
        let json = extract_json_object(&text).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(serde_json::from_str::<QuizResult>(json).is_ok());
    }

    #[test]
    fn test_extract_json_object_ignores_braces_in_strings() {
        let text = r#"preamble {"a":"has } brace","b":{"c":1}} trailing"#;
        let json = extract_json_object(text).unwrap();
        assert_eq!(json, r#"{"a":"has } brace","b":{"c":1}}"#);
    }

    #[test]
    fn test_extract_json_object_unbalanced_is_none() {
        assert!(extract_json_object("no braces at all").is_none());
        assert!(extract_json_object(r#"{"never": "closed""#).is_none());
    }

    #[test]
    fn test_spec_validates_question_count() {
        assert!(QuizSpec::new("text".into(), Difficulty::Easy, 0).is_err());
        assert!(QuizSpec::new("text".into(), Difficulty::Easy, 21).is_err());
        assert!(QuizSpec::new("text".into(), Difficulty::Easy, 20).is_ok());
        assert!(QuizSpec::new("  ".into(), Difficulty::Easy, 5).is_err());
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("MEDIUM".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[tokio::test]
    async fn test_generate_returns_requested_count() {
        let completer = ScriptedCompleter::new(vec![
            "Operating Systems",
            &format!("Here's your quiz:\n{}\nEnjoy!", quiz_json(10)),
        ]);
        let generator = QuizGenerator::new(Arc::new(completer), Prompts::default());
        let spec = QuizSpec::new("lecture text".into(), Difficulty::Hard, 10).unwrap();

        let result = generator.generate(&spec).await.unwrap();
        assert_eq!(result.quiz.len(), 10);
        assert!(result.quiz.iter().all(|q| q.options.len() == 4));
        assert_eq!(result.suggestions.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_non_json_output() {
        let completer =
            ScriptedCompleter::new(vec!["Topic", "I cannot generate a quiz right now."]);
        let generator = QuizGenerator::new(Arc::new(completer), Prompts::default());
        let spec = QuizSpec::new("lecture text".into(), Difficulty::Easy, 5).unwrap();

        let err = generator.generate(&spec).await.unwrap_err();
        assert!(matches!(err, LektorError::Parse(_)));
    }

    #[tokio::test]
    async fn test_generate_rejects_wrong_option_count() {
        let bad = r#"{"quiz":[{"question":"Q?","options":["a","b"],"answer":"a"}],"suggestions":{"articles":[],"videos":[]}}"#;
        let completer = ScriptedCompleter::new(vec!["Topic", bad]);
        let generator = QuizGenerator::new(Arc::new(completer), Prompts::default());
        let spec = QuizSpec::new("lecture text".into(), Difficulty::Easy, 1).unwrap();

        let err = generator.generate(&spec).await.unwrap_err();
        assert!(matches!(err, LektorError::Parse(_)));
    }
}
