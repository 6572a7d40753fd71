//! Slide extraction from lecture video.
//!
//! Scene changes are detected, one frame is captured per scene, and each
//! frame is OCR'd. Slides are numbered in detection order starting at 1;
//! per-slide OCR failures keep the image with empty text.

mod ffmpeg;
mod tesseract;

pub use ffmpeg::FfmpegSceneSplitter;
pub use tesseract::TesseractExtractor;

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// An ordered slide: captured frame plus its OCR text.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based, contiguous, in scene order.
    pub index: u32,
    /// Captured frame image.
    pub image_path: PathBuf,
    /// OCR text; empty when extraction failed for this frame.
    pub text: String,
}

/// Capability for detecting scene changes and capturing frames.
#[async_trait]
pub trait SceneSplitter: Send + Sync {
    /// Detect scene-change timestamps (seconds), ordered by scene start.
    ///
    /// `sensitivity` is on a 0-255 pixel-delta scale; failure to open the
    /// video at all is a media-format error.
    async fn detect_scenes(&self, video: &Path, sensitivity: f64) -> Result<Vec<f64>>;

    /// Capture the frame at a timestamp to `dest` as JPEG.
    async fn capture_frame(&self, video: &Path, timestamp: f64, dest: &Path) -> Result<()>;
}

/// Capability for extracting text from a captured frame.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &Path) -> Result<String>;
}

/// Drives scene detection, frame capture and parallel OCR.
pub struct SlideExtractor {
    splitter: Arc<dyn SceneSplitter>,
    extractor: Arc<dyn TextExtractor>,
    sensitivity: f64,
    max_concurrent_ocr: usize,
}

impl SlideExtractor {
    pub fn new(
        splitter: Arc<dyn SceneSplitter>,
        extractor: Arc<dyn TextExtractor>,
        sensitivity: f64,
        max_concurrent_ocr: usize,
    ) -> Self {
        Self {
            splitter,
            extractor,
            sensitivity,
            max_concurrent_ocr: max_concurrent_ocr.max(1),
        }
    }

    /// Extract ordered slides from a video into `output_dir`.
    #[instrument(skip(self, output_dir), fields(video = %video.display()))]
    pub async fn extract(&self, video: &Path, output_dir: &Path) -> Result<Vec<Slide>> {
        std::fs::create_dir_all(output_dir)?;

        let scenes = self.splitter.detect_scenes(video, self.sensitivity).await?;
        info!(scenes = scenes.len(), "Detected scene changes");

        // Capture sequentially so indices stay contiguous even when a frame
        // cannot be read.
        let mut captured: Vec<(u32, PathBuf)> = Vec::with_capacity(scenes.len());
        for timestamp in &scenes {
            let index = captured.len() as u32 + 1;
            let dest = output_dir.join(format!("slide_{}.jpg", index));
            match self.splitter.capture_frame(video, *timestamp, &dest).await {
                Ok(()) => captured.push((index, dest)),
                Err(e) => {
                    warn!(timestamp, error = %e, "Skipping unreadable frame");
                }
            }
        }

        if captured.is_empty() {
            return Ok(Vec::new());
        }

        let pb = ProgressBar::new(captured.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} OCR       [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        // OCR is independent per slide, so it runs in parallel.
        let mut slides: Vec<Slide> = stream::iter(captured.into_iter())
            .map(|(index, image_path)| {
                let extractor = self.extractor.clone();
                let pb = pb.clone();
                async move {
                    let text = match extractor.extract_text(&image_path).await {
                        Ok(text) => text.trim().to_string(),
                        Err(e) => {
                            warn!(slide = index, error = %e, "OCR failed, keeping image with empty text");
                            String::new()
                        }
                    };
                    pb.inc(1);
                    Slide {
                        index,
                        image_path,
                        text,
                    }
                }
            })
            .buffer_unordered(self.max_concurrent_ocr)
            .collect()
            .await;

        pb.finish_and_clear();

        slides.sort_by_key(|s| s.index);
        info!(slides = slides.len(), "Slide extraction complete");
        Ok(slides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LektorError;
    use tempfile::TempDir;

    struct FakeSplitter {
        scenes: Vec<f64>,
        fail_at: Option<f64>,
    }

    #[async_trait]
    impl SceneSplitter for FakeSplitter {
        async fn detect_scenes(&self, _video: &Path, _sensitivity: f64) -> Result<Vec<f64>> {
            Ok(self.scenes.clone())
        }

        async fn capture_frame(&self, _video: &Path, ts: f64, dest: &Path) -> Result<()> {
            if Some(ts) == self.fail_at {
                return Err(LektorError::MediaFormat("bad frame".into()));
            }
            std::fs::write(dest, format!("frame@{ts}"))?;
            Ok(())
        }
    }

    struct FakeOcr {
        fail_on: Option<u32>,
    }

    #[async_trait]
    impl TextExtractor for FakeOcr {
        async fn extract_text(&self, image: &Path) -> Result<String> {
            let name = image.file_name().unwrap().to_string_lossy().to_string();
            if let Some(n) = self.fail_on {
                if name.contains(&format!("slide_{}", n)) {
                    return Err(LektorError::Provider("ocr broke".into()));
                }
            }
            Ok(format!("text of {}", name))
        }
    }

    #[tokio::test]
    async fn test_slides_ordered_and_contiguous() {
        let tmp = TempDir::new().unwrap();
        let extractor = SlideExtractor::new(
            Arc::new(FakeSplitter {
                scenes: vec![0.0, 12.5, 60.0],
                fail_at: None,
            }),
            Arc::new(FakeOcr { fail_on: None }),
            30.0,
            2,
        );

        let slides = extractor
            .extract(Path::new("video.mp4"), tmp.path())
            .await
            .unwrap();

        assert_eq!(slides.len(), 3);
        assert_eq!(
            slides.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(slides[1].text.contains("slide_2.jpg"));
    }

    #[tokio::test]
    async fn test_unreadable_frame_keeps_indices_contiguous() {
        let tmp = TempDir::new().unwrap();
        let extractor = SlideExtractor::new(
            Arc::new(FakeSplitter {
                scenes: vec![0.0, 12.5, 60.0],
                fail_at: Some(12.5),
            }),
            Arc::new(FakeOcr { fail_on: None }),
            30.0,
            2,
        );

        let slides = extractor
            .extract(Path::new("video.mp4"), tmp.path())
            .await
            .unwrap();

        assert_eq!(slides.len(), 2);
        assert_eq!(
            slides.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn test_ocr_failure_keeps_image_with_empty_text() {
        let tmp = TempDir::new().unwrap();
        let extractor = SlideExtractor::new(
            Arc::new(FakeSplitter {
                scenes: vec![0.0, 30.0],
                fail_at: None,
            }),
            Arc::new(FakeOcr { fail_on: Some(2) }),
            30.0,
            2,
        );

        let slides = extractor
            .extract(Path::new("video.mp4"), tmp.path())
            .await
            .unwrap();

        assert_eq!(slides.len(), 2);
        assert!(!slides[0].text.is_empty());
        assert!(slides[1].text.is_empty());
        assert!(slides[1].image_path.exists());
    }
}
