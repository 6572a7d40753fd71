//! Stage execution with failure isolation.
//!
//! Each pipeline stage wraps exactly one external operation. The runner
//! guarantees that nothing escapes uncaught: errors are classified into the
//! failure taxonomy, panics are contained, and every stage runs under a
//! bounded timeout.

use crate::error::FailureKind;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error};

/// One unit of pipeline work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    ExtractAudio,
    Transcribe,
    Summarize,
    DetectSlides,
    Render,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Download => "download",
            Stage::ExtractAudio => "extract_audio",
            Stage::Transcribe => "transcribe",
            Stage::Summarize => "summarize",
            Stage::DetectSlides => "detect_slides",
            Stage::Render => "render",
        }
    }

    /// Classification used when the stage faults without a typed error.
    fn fault_kind(&self) -> FailureKind {
        match self {
            Stage::Download => FailureKind::Network,
            Stage::ExtractAudio | Stage::DetectSlides => FailureKind::MediaFormat,
            Stage::Transcribe | Stage::Summarize => FailureKind::Provider,
            Stage::Render => FailureKind::Io,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Typed failure outcome of one stage.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} stage failed ({kind}): {message}")]
pub struct StageError {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

/// Runs stages in isolation.
pub struct StageRunner {
    timeout: Duration,
}

impl StageRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Execute one stage.
    ///
    /// The wrapped operation's error is classified via `LektorError::kind`;
    /// panics map to the stage's fault kind and timeouts to Provider, so the
    /// caller always gets a typed outcome.
    pub async fn run<T, F>(&self, stage: Stage, fut: F) -> Result<T, StageError>
    where
        F: Future<Output = crate::error::Result<T>>,
    {
        debug!(stage = %stage, "Running stage");

        let guarded = AssertUnwindSafe(fut).catch_unwind();

        match tokio::time::timeout(self.timeout, guarded).await {
            Err(_) => Err(StageError {
                stage,
                kind: FailureKind::Provider,
                message: format!("timed out after {:?}", self.timeout),
            }),
            Ok(Err(_panic)) => {
                error!(stage = %stage, "Stage panicked");
                Err(StageError {
                    stage,
                    kind: stage.fault_kind(),
                    message: "stage panicked".to_string(),
                })
            }
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => Err(StageError {
                stage,
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LektorError;

    fn runner() -> StageRunner {
        StageRunner::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let value = runner()
            .run(Stage::Download, async { Ok(42u32) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_error_is_classified() {
        let err = runner()
            .run(Stage::Transcribe, async {
                Err::<(), _>(LektorError::Provider("quota".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Transcribe);
        assert_eq!(err.kind, FailureKind::Provider);
        assert!(err.message.contains("quota"));
    }

    async fn panicking_stage() -> crate::error::Result<()> {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let err = runner()
            .run(Stage::Render, panicking_stage())
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Io);
        assert!(err.message.contains("panicked"));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_provider_failure() {
        let runner = StageRunner::new(Duration::from_millis(10));
        let err = runner
            .run(Stage::Summarize, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Provider);
        assert!(err.message.contains("timed out"));
    }
}
