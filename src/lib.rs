//! Lektor - Lecture Study Packets
//!
//! A CLI tool that turns lecture videos into study packets.
//!
//! The name "Lektor" comes from the Norwegian word for "lecturer."
//!
//! # Overview
//!
//! Lektor allows you to:
//! - Download a lecture video and transcribe its audio
//! - Summarize the lecture in its own language
//! - Capture slide frames at scene changes and OCR their text
//! - Render everything into a PDF study packet
//! - Generate quizzes with learning-resource suggestions
//!
//! Results are cached per video by content hash, so re-processing the same
//! lecture is instant.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `media` - Video download and audio extraction
//! - `store` - Content-addressed artifact cache
//! - `transcription` - Speech-to-text transcription
//! - `completion` - Text completion capability
//! - `summary` - Summarization, translation and language detection
//! - `slides` - Scene detection and OCR
//! - `quiz` - Quiz generation
//! - `render` - Deliverable rendering
//! - `pipeline` - Stage sequencing and caching control
//!
//! # Example
//!
//! ```rust,no_run
//! use lektor::config::Settings;
//! use lektor::pipeline::PipelineController;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let controller = PipelineController::new(settings)?;
//!
//!     let output = controller
//!         .process_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("Summary ({}):\n{}", output.detected_language, output.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod media;
pub mod openai;
pub mod pipeline;
pub mod quiz;
pub mod render;
pub mod slides;
pub mod store;
pub mod summary;
pub mod transcription;

pub use error::{FailureKind, LektorError, Result};
