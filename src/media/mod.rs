//! Media acquisition for the pipeline.
//!
//! Downloading is a capability boundary: the pipeline asks a [`MediaFetcher`]
//! for "best-effort media given a URL" and gets back a local file or a
//! failure. The default implementation drives yt-dlp and ffmpeg.

mod downloader;

pub use downloader::YtDlpFetcher;

use crate::error::{LektorError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// A downloaded video file in transient storage.
///
/// The content hash is computed once, after download, and never changes.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Local path of the downloaded file.
    pub path: PathBuf,
    /// Size in bytes.
    pub bytes: u64,
    /// Hex SHA-256 digest, set once hashing has run.
    pub digest: Option<String>,
}

impl MediaAsset {
    pub fn new(path: PathBuf, bytes: u64) -> Self {
        Self {
            path,
            bytes,
            digest: None,
        }
    }

    /// Attach the content digest. Ignored if one is already set.
    pub fn with_digest(mut self, digest: String) -> Self {
        if self.digest.is_none() {
            self.digest = Some(digest);
        }
        self
    }
}

/// Capability for fetching media and deriving its audio track.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download the video behind `url` to `dest`, returning the local file.
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<MediaAsset>;

    /// Extract the audio track of a local video file as MP3.
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<()>;
}

/// Validate a request URL: only http/https schemes enter the pipeline.
pub fn validate_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim())
        .map_err(|e| LektorError::InvalidInput(format!("Invalid video URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LektorError::InvalidInput(format!(
            "Unsupported URL scheme '{}': expected http or https",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_schemes() {
        assert!(validate_url("https://www.youtube.com/watch?v=abc123").is_ok());
        assert!(validate_url("http://example.com/lecture.mp4").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_other_input() {
        assert!(validate_url("ftp://example.com/video").is_err());
        assert!(validate_url("file:///tmp/video.mp4").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_media_asset_digest_set_once() {
        let asset = MediaAsset::new(PathBuf::from("/tmp/v.mp4"), 10)
            .with_digest("aaa".into())
            .with_digest("bbb".into());
        assert_eq!(asset.digest.as_deref(), Some("aaa"));
    }
}
