//! yt-dlp backed media fetching.
//!
//! Downloads walk an ordered list of format preferences and accept the first
//! attempt that produces a non-trivial file; audio extraction re-encodes the
//! track to MP3 with ffmpeg.

use super::{MediaAsset, MediaFetcher};
use crate::config::DownloadSettings;
use crate::error::{LektorError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Media fetcher shelling out to yt-dlp and ffmpeg.
pub struct YtDlpFetcher {
    formats: Vec<String>,
    min_file_bytes: u64,
    socket_timeout_seconds: u32,
    retries: u32,
}

impl YtDlpFetcher {
    pub fn new(settings: &DownloadSettings) -> Self {
        Self {
            formats: settings.formats.clone(),
            min_file_bytes: settings.min_file_bytes,
            socket_timeout_seconds: settings.socket_timeout_seconds,
            retries: settings.retries,
        }
    }

    /// Run one yt-dlp attempt with a specific format preference.
    async fn try_format(&self, url: &url::Url, dest: &Path, format: &str) -> Result<()> {
        debug!(%format, "Trying download format");

        let result = Command::new("yt-dlp")
            .arg("--format").arg(format)
            .arg("--merge-output-format").arg("mp4")
            .arg("--output").arg(dest.to_str().unwrap_or_default())
            .arg("--no-playlist")
            .arg("--geo-bypass")
            .arg("--socket-timeout").arg(self.socket_timeout_seconds.to_string())
            .arg("--retries").arg(self.retries.to_string())
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LektorError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(LektorError::Download(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LektorError::Download(format!("yt-dlp failed: {stderr}")));
        }

        Ok(())
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    /// Download with format fallback.
    ///
    /// Each format preference is attempted in order; the first attempt that
    /// leaves a file above the minimum size wins. Exhausting the list is a
    /// terminal failure for the request.
    #[instrument(skip(self, dest), fields(url = %url))]
    async fn fetch(&self, url: &url::Url, dest: &Path) -> Result<MediaAsset> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut last_error = None;

        for format in &self.formats {
            match self.try_format(url, dest, format).await {
                Ok(()) => {
                    let size = std::fs::metadata(dest).map(|m| m.len()).unwrap_or(0);
                    if size > self.min_file_bytes {
                        info!(bytes = size, "Video downloaded");
                        return Ok(MediaAsset::new(dest.to_path_buf(), size));
                    }
                    warn!(%format, bytes = size, "Download produced a trivial file, trying next format");
                    let _ = std::fs::remove_file(dest);
                }
                Err(e @ LektorError::ToolNotFound(_)) => return Err(e),
                Err(e) => {
                    warn!(%format, error = %e, "Download attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LektorError::Download("All download format attempts failed".into())
        }))
    }

    /// Strip the audio track to MP3.
    #[instrument(skip_all)]
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<()> {
        let result = Command::new("ffmpeg")
            .arg("-i").arg(video)
            .arg("-vn")
            .arg("-codec:a").arg("libmp3lame")
            .arg("-qscale:a").arg("2")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(audio)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(LektorError::MediaFormat(format!(
                    "ffmpeg audio extraction failed: {err}"
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LektorError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(LektorError::MediaFormat(format!("ffmpeg error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DownloadSettings;

    #[test]
    fn test_fetcher_takes_format_chain_from_settings() {
        let fetcher = YtDlpFetcher::new(&DownloadSettings::default());
        assert_eq!(fetcher.formats.len(), 4);
        assert_eq!(fetcher.formats[0], "bestvideo[ext=mp4]+bestaudio[ext=m4a]/mp4");
        assert_eq!(fetcher.min_file_bytes, 1024);
    }
}
