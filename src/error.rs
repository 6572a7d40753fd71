//! Error types for Lektor.

use thiserror::Error;

/// Library-level error type for Lektor operations.
#[derive(Error, Debug)]
pub enum LektorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video download failed: {0}")]
    Download(String),

    #[error("Unsupported or broken media: {0}")]
    MediaFormat(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error(transparent)]
    Stage(#[from] crate::pipeline::StageError),
}

/// Failure classification surfaced to callers.
///
/// Every `LektorError` maps onto exactly one kind; no raw provider error or
/// panic detail crosses the library boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    Network,
    MediaFormat,
    Provider,
    Parse,
    Io,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Network => "network_failure",
            FailureKind::MediaFormat => "media_format_failure",
            FailureKind::Provider => "provider_failure",
            FailureKind::Parse => "parse_failure",
            FailureKind::Io => "io_failure",
        };
        write!(f, "{}", name)
    }
}

impl LektorError {
    /// Classify this error into the caller-facing failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            LektorError::Config(_) | LektorError::InvalidInput(_) => FailureKind::InvalidInput,
            LektorError::Download(_) | LektorError::Http(_) => FailureKind::Network,
            LektorError::MediaFormat(_) | LektorError::ToolFailed(_) => FailureKind::MediaFormat,
            LektorError::Provider(_) => FailureKind::Provider,
            LektorError::Parse(_) | LektorError::Json(_) | LektorError::TomlParse(_) => {
                FailureKind::Parse
            }
            LektorError::Io(_)
            | LektorError::Render(_)
            | LektorError::NotFound(_)
            | LektorError::ToolNotFound(_) => FailureKind::Io,
            LektorError::Stage(e) => e.kind,
        }
    }
}

/// Result type alias for Lektor operations.
pub type Result<T> = std::result::Result<T, LektorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            LektorError::InvalidInput("x".into()).kind(),
            FailureKind::InvalidInput
        );
        assert_eq!(
            LektorError::Download("x".into()).kind(),
            FailureKind::Network
        );
        assert_eq!(
            LektorError::MediaFormat("x".into()).kind(),
            FailureKind::MediaFormat
        );
        assert_eq!(
            LektorError::Provider("x".into()).kind(),
            FailureKind::Provider
        );
        assert_eq!(LektorError::Parse("x".into()).kind(), FailureKind::Parse);
        assert_eq!(
            LektorError::NotFound("x".into()).kind(),
            FailureKind::Io
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FailureKind::Network.to_string(), "network_failure");
        assert_eq!(FailureKind::Parse.to_string(), "parse_failure");
    }
}
