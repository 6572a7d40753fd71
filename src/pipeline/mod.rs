//! Pipeline orchestration for Lektor.
//!
//! The controller drives the ordered stage sequence for one request —
//! download, hash, cache check, transcribe, summarize, extract slides,
//! render — consulting the artifact store before running stages and writing
//! results back. Identical-hash re-requests short-circuit on the cached
//! deliverable.

mod stage;

pub use stage::{Stage, StageError, StageRunner};

use crate::completion::{ChatCompleter, OpenAiCompleter};
use crate::config::{Prompts, Settings};
use crate::error::{FailureKind, LektorError, Result};
use crate::media::{validate_url, MediaFetcher, YtDlpFetcher};
use crate::quiz::{Difficulty, QuizGenerator, QuizResult, QuizSpec};
use crate::render::{DocumentRenderer, PdfRenderer};
use crate::slides::{
    FfmpegSceneSplitter, SceneSplitter, SlideExtractor, TesseractExtractor, TextExtractor,
};
use crate::store::{hash_file, ArtifactKind, ArtifactStore};
use crate::summary::{detect_language, Summarizer, NO_SUMMARY};
use crate::transcription::{Transcriber, WhisperTranscriber};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Where a request currently is in its stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Downloading,
    Hashing,
    CacheCheck,
    Transcribing,
    Summarizing,
    SlideExtracting,
    Rendering,
    Done,
    Failed(FailureKind),
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Downloading => write!(f, "downloading"),
            PipelineState::Hashing => write!(f, "hashing"),
            PipelineState::CacheCheck => write!(f, "cache_check"),
            PipelineState::Transcribing => write!(f, "transcribing"),
            PipelineState::Summarizing => write!(f, "summarizing"),
            PipelineState::SlideExtracting => write!(f, "slide_extracting"),
            PipelineState::Rendering => write!(f, "rendering"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// Handle to a cached deliverable.
#[derive(Debug, Clone)]
pub struct DeliverableHandle {
    /// Content hash of the source video.
    pub hash: String,
    /// On-disk location of the rendered document.
    pub path: PathBuf,
}

/// Result of processing a lecture video.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Sanitized summary text.
    pub summary: String,
    /// Detected transcript language (ISO 639-1).
    pub detected_language: String,
    /// The rendered study packet.
    pub deliverable: DeliverableHandle,
    /// Whether the request was served from cache.
    pub cache_hit: bool,
}

/// Result of summarizing caller-provided transcript text.
#[derive(Debug, Clone)]
pub struct TranscriptSummary {
    pub summary: String,
    pub detected_language: String,
}

/// Target language for summary regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryLanguage {
    English,
    Original,
}

impl std::str::FromStr for SummaryLanguage {
    type Err = LektorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(SummaryLanguage::English),
            "original" => Ok(SummaryLanguage::Original),
            other => Err(LektorError::InvalidInput(format!(
                "Unknown summary language '{}': expected english or original",
                other
            ))),
        }
    }
}

/// Removes a request's working directory when the request ends, including
/// when its task is cancelled mid-pipeline.
struct WorkDir(PathBuf);

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %self.0.display(), error = %e, "Failed to clean working directory");
            }
        }
    }
}

/// The main pipeline controller.
pub struct PipelineController {
    settings: Settings,
    store: Arc<ArtifactStore>,
    runner: StageRunner,
    fetcher: Arc<dyn MediaFetcher>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Summarizer,
    slide_extractor: SlideExtractor,
    renderer: Arc<dyn DocumentRenderer>,
    quiz: QuizGenerator,
}

impl PipelineController {
    /// Create a controller with the default providers.
    pub fn new(settings: Settings) -> Result<Self> {
        let store = Arc::new(ArtifactStore::from_settings(&settings.cache)?);
        let fetcher: Arc<dyn MediaFetcher> = Arc::new(YtDlpFetcher::new(&settings.download));
        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(
            &settings.provider,
            &settings.transcription,
        ));
        let completer: Arc<dyn ChatCompleter> = Arc::new(OpenAiCompleter::new(
            &settings.provider,
            &settings.completion,
        ));
        let splitter: Arc<dyn SceneSplitter> = Arc::new(FfmpegSceneSplitter::new());
        let text_extractor: Arc<dyn TextExtractor> =
            Arc::new(TesseractExtractor::new(&settings.slides.ocr_language));
        let renderer: Arc<dyn DocumentRenderer> = Arc::new(PdfRenderer::new(&settings.render));

        Self::with_components(
            settings,
            store,
            fetcher,
            transcriber,
            completer,
            splitter,
            text_extractor,
            renderer,
        )
    }

    /// Create a controller with custom components.
    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        settings: Settings,
        store: Arc<ArtifactStore>,
        fetcher: Arc<dyn MediaFetcher>,
        transcriber: Arc<dyn Transcriber>,
        completer: Arc<dyn ChatCompleter>,
        splitter: Arc<dyn SceneSplitter>,
        text_extractor: Arc<dyn TextExtractor>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let summarizer = Summarizer::new(
            completer.clone(),
            prompts.clone(),
            settings.completion.max_prompt_chars,
        );
        let quiz = QuizGenerator::new(completer, prompts);
        let slide_extractor = SlideExtractor::new(
            splitter,
            text_extractor,
            settings.slides.sensitivity,
            settings.slides.max_concurrent_ocr,
        );
        let runner = StageRunner::new(Duration::from_secs(
            settings.general.stage_timeout_seconds,
        ));

        std::fs::create_dir_all(settings.temp_dir())?;

        Ok(Self {
            settings,
            store,
            runner,
            fetcher,
            transcriber,
            summarizer,
            slide_extractor,
            renderer,
            quiz,
        })
    }

    /// Get the artifact store (shared across requests).
    pub fn store(&self) -> Arc<ArtifactStore> {
        self.store.clone()
    }

    /// Process a lecture video end to end.
    ///
    /// Returns the summary, deliverable handle and detected language, or a
    /// classified failure. Re-requesting a video with identical bytes is a
    /// cache hit and runs no stages.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn process_video(&self, url: &str) -> Result<ProcessOutput> {
        let mut state = PipelineState::Idle;
        let result = self.drive(url, &mut state).await;

        match &result {
            Ok(output) => {
                info!(state = %state, cache_hit = output.cache_hit, "Pipeline finished");
            }
            Err(e) => {
                state = PipelineState::Failed(e.kind());
                error!(state = %state, error = %e, "Pipeline failed");
            }
        }

        result
    }

    fn advance(&self, state: &mut PipelineState, next: PipelineState) {
        debug!(from = %state, to = %next, "State transition");
        *state = next;
    }

    async fn drive(&self, url: &str, state: &mut PipelineState) -> Result<ProcessOutput> {
        // Invalid input fails before anything is touched.
        let url = validate_url(url)?;

        // Download into a per-request working directory.
        self.advance(state, PipelineState::Downloading);
        let workdir = self
            .settings
            .temp_dir()
            .join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&workdir)?;
        let _cleanup = WorkDir(workdir.clone());

        let video_path = workdir.join("lecture.mp4");
        let asset = self
            .runner
            .run(Stage::Download, self.fetcher.fetch(&url, &video_path))
            .await?;

        // Hash the downloaded bytes; this is the cache key.
        self.advance(state, PipelineState::Hashing);
        let digest = hash_file(&asset.path).await?;
        let asset = asset.with_digest(digest.clone());
        debug!(%digest, bytes = asset.bytes, "Media hashed");

        // Serialize all work on this hash so concurrent identical requests
        // cannot race to publish the same artifacts.
        self.advance(state, PipelineState::CacheCheck);
        let entry_lock = self.store.entry_lock(&digest);
        let _entry_guard = entry_lock.lock().await;

        if self.store.has_artifact(&digest, ArtifactKind::Deliverable) {
            info!(%digest, "Cache hit, reusing deliverable");
            self.store.set_current_hash(&digest)?;
            let output = self.cached_output(&digest).await?;
            self.advance(state, PipelineState::Done);
            return Ok(output);
        }

        // Cache miss. Under the single-slot policy a new hash resets the
        // whole cache before this entry is created.
        if self.settings.cache.reset_on_new_video {
            if let Some(current) = self.store.current_hash() {
                if current != digest {
                    info!("New video hash, clearing previous cache");
                    self.store.reset()?;
                }
            }
        }
        self.store.set_current_hash(&digest)?;
        let _pin = self.store.pin(&digest);

        // Transcribe: extract the audio track, run speech-to-text, publish
        // both artifacts.
        self.advance(state, PipelineState::Transcribing);
        let audio_path = workdir.join("audio.mp3");
        self.runner
            .run(
                Stage::ExtractAudio,
                self.fetcher.extract_audio(&asset.path, &audio_path),
            )
            .await?;
        let transcript = self
            .runner
            .run(Stage::Transcribe, self.transcriber.transcribe(&audio_path))
            .await?;

        let audio_bytes = tokio::fs::read(&audio_path).await?;
        self.store
            .write_artifact(&digest, ArtifactKind::Audio, &audio_bytes)
            .await?;
        self.store
            .write_artifact(&digest, ArtifactKind::Transcript, transcript.as_bytes())
            .await?;

        // Summarize in the transcript's own language.
        self.advance(state, PipelineState::Summarizing);
        let language = detect_language(&transcript);
        let summary = self
            .runner
            .run(
                Stage::Summarize,
                self.summarizer.summarize(&transcript, &language),
            )
            .await?;
        self.store
            .write_artifact(&digest, ArtifactKind::Summary, summary.as_bytes())
            .await?;

        // Extract slides; per-slide problems were already degraded to
        // warnings inside the extractor.
        self.advance(state, PipelineState::SlideExtracting);
        let slides_dir = workdir.join("slides");
        let slides = self
            .runner
            .run(
                Stage::DetectSlides,
                self.slide_extractor.extract(&asset.path, &slides_dir),
            )
            .await?;

        for slide in &slides {
            let image = tokio::fs::read(&slide.image_path).await?;
            self.store
                .write_artifact(&digest, ArtifactKind::SlideImage(slide.index), &image)
                .await?;
            self.store
                .write_artifact(
                    &digest,
                    ArtifactKind::SlideText(slide.index),
                    slide.text.as_bytes(),
                )
                .await?;
        }

        // Render and publish the deliverable; once it lands, the entry is
        // complete and immutable.
        self.advance(state, PipelineState::Rendering);
        let deliverable = self
            .runner
            .run(Stage::Render, async { self.renderer.render(&summary, &slides) })
            .await?;
        self.store
            .write_artifact(&digest, ArtifactKind::Deliverable, &deliverable)
            .await?;

        self.store.enforce_limit(self.settings.cache.max_entries)?;

        self.advance(state, PipelineState::Done);
        Ok(ProcessOutput {
            summary,
            detected_language: language,
            deliverable: DeliverableHandle {
                path: self.store.artifact_path(&digest, ArtifactKind::Deliverable),
                hash: digest,
            },
            cache_hit: false,
        })
    }

    /// Build the output for a cache hit from published artifacts.
    async fn cached_output(&self, hash: &str) -> Result<ProcessOutput> {
        let summary = match self.store.read_artifact(hash, ArtifactKind::Summary).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
            Err(_) => NO_SUMMARY.to_string(),
        };

        // Language is a pure function of the transcript, so re-derive it
        // instead of caching a separate artifact.
        let detected_language = match self
            .store
            .read_artifact(hash, ArtifactKind::Transcript)
            .await
        {
            Ok(bytes) => detect_language(&String::from_utf8_lossy(&bytes)),
            Err(_) => "en".to_string(),
        };

        Ok(ProcessOutput {
            summary,
            detected_language,
            deliverable: DeliverableHandle {
                path: self.store.artifact_path(hash, ArtifactKind::Deliverable),
                hash: hash.to_string(),
            },
            cache_hit: true,
        })
    }

    /// Hash of the entry reads should target: the current cursor when it
    /// still exists, otherwise the newest entry by creation time.
    fn resolve_current_entry(&self) -> Result<String> {
        if let Some(hash) = self.store.current_hash() {
            if self.store.has_entry(&hash) {
                return Ok(hash);
            }
        }

        self.store
            .list_entries()?
            .pop()
            .map(|meta| meta.hash)
            .ok_or_else(|| LektorError::NotFound("no cached lecture".to_string()))
    }

    /// Read the cached deliverable document.
    pub async fn cached_deliverable(&self) -> Result<Vec<u8>> {
        let hash = self.resolve_current_entry()?;
        self.store
            .read_artifact(&hash, ArtifactKind::Deliverable)
            .await
    }

    /// Read the cached transcript text.
    pub async fn cached_transcript(&self) -> Result<String> {
        let hash = self.resolve_current_entry()?;
        let bytes = self
            .store
            .read_artifact(&hash, ArtifactKind::Transcript)
            .await?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Generate a quiz from the given text, falling back to the cached
    /// transcript when the text is empty.
    #[instrument(skip(self, source_text))]
    pub async fn generate_quiz(
        &self,
        source_text: &str,
        difficulty: Difficulty,
        question_count: u32,
    ) -> Result<QuizResult> {
        let text = if source_text.trim().is_empty() {
            self.cached_transcript().await.map_err(|_| {
                LektorError::NotFound("no transcript available for quiz generation".to_string())
            })?
        } else {
            source_text.to_string()
        };

        let spec = QuizSpec::new(text, difficulty, question_count)?;
        self.quiz.generate(&spec).await
    }

    /// Translate a summary into a target language.
    pub async fn translate_summary(&self, summary: &str, target: &str) -> Result<String> {
        if summary.trim().is_empty() {
            return Err(LektorError::InvalidInput(
                "No summary available to translate".to_string(),
            ));
        }
        self.summarizer.translate(summary, target).await
    }

    /// Re-summarize the cached transcript in English or its own language.
    #[instrument(skip(self))]
    pub async fn regenerate_summary(&self, language: SummaryLanguage) -> Result<String> {
        let transcript = self.cached_transcript().await?;
        let code = match language {
            SummaryLanguage::English => "en".to_string(),
            SummaryLanguage::Original => detect_language(&transcript),
        };
        self.summarizer.summarize(&transcript, &code).await
    }

    /// Summarize caller-provided transcript text in bullet form.
    #[instrument(skip(self, text))]
    pub async fn summarize_transcript(&self, text: &str) -> Result<TranscriptSummary> {
        let detected_language = detect_language(text);
        let summary = self.summarizer.summarize_bullets(text, "en").await?;
        Ok(TranscriptSummary {
            summary,
            detected_language,
        })
    }

    /// Render a standalone summary document (no slides).
    pub fn render_summary_document(&self, summary: &str) -> Result<Vec<u8>> {
        self.renderer.render(summary, &[])
    }
}
