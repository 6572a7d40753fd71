//! Scene detection and frame capture via ffmpeg.

use super::SceneSplitter;
use crate::error::{LektorError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Scene splitter shelling out to ffmpeg's scene filter.
pub struct FfmpegSceneSplitter;

impl FfmpegSceneSplitter {
    pub fn new() -> Self {
        Self
    }

    /// Parse `pts_time:` values out of showinfo filter output.
    fn parse_timestamps(stderr: &str) -> Vec<f64> {
        let mut timestamps = Vec::new();
        for line in stderr.lines() {
            if !line.contains("pts_time:") {
                continue;
            }
            if let Some(rest) = line.split("pts_time:").nth(1) {
                let value: String = rest
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                if let Ok(ts) = value.parse::<f64>() {
                    timestamps.push(ts);
                }
            }
        }
        timestamps
    }
}

impl Default for FfmpegSceneSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneSplitter for FfmpegSceneSplitter {
    /// Detect scene changes with the ffmpeg `scene` score.
    ///
    /// The configured sensitivity is on a 0-255 pixel-delta scale and maps
    /// onto ffmpeg's 0-1 score. The opening frame is always included: the
    /// filter only reports change points, while the first slide starts at 0.
    #[instrument(skip(self), fields(video = %video.display()))]
    async fn detect_scenes(&self, video: &Path, sensitivity: f64) -> Result<Vec<f64>> {
        let threshold = (sensitivity / 255.0).clamp(0.0, 1.0);
        let filter = format!("select='gt(scene,{:.4})',showinfo", threshold);

        let result = Command::new("ffmpeg")
            .arg("-i").arg(video)
            .arg("-vf").arg(&filter)
            .arg("-an")
            .arg("-f").arg("null")
            .arg("-")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LektorError::ToolNotFound("ffmpeg".into()));
            }
            Err(e) => {
                return Err(LektorError::MediaFormat(format!("ffmpeg failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LektorError::MediaFormat(format!(
                "Cannot open video for scene detection: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut timestamps = Self::parse_timestamps(&stderr);

        if timestamps.first().map_or(true, |first| *first > 0.1) {
            timestamps.insert(0, 0.0);
        }

        debug!(scenes = timestamps.len(), threshold, "Scene detection finished");
        Ok(timestamps)
    }

    /// Capture a single frame as JPEG.
    async fn capture_frame(&self, video: &Path, timestamp: f64, dest: &Path) -> Result<()> {
        let result = Command::new("ffmpeg")
            .arg("-ss").arg(format!("{:.3}", timestamp))
            .arg("-i").arg(video)
            .arg("-frames:v").arg("1")
            .arg("-q:v").arg("2")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() && dest.exists() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(LektorError::MediaFormat(format!(
                    "Frame capture at {:.3}s failed: {}",
                    timestamp,
                    err.trim()
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

    #[test]
    fn test_parse_timestamps() {
        let stderr = "\
[Parsed_showinfo_1 @ 0x55] n:   0 pts:  90090 pts_time:3.003 duration:0.033
[Parsed_showinfo_1 @ 0x55] n:   1 pts: 270270 pts_time:9.009 duration:0.033
[out#0/null @ 0x56] video:123KiB audio:0KiB";

        let timestamps = FfmpegSceneSplitter::parse_timestamps(stderr);
        assert_eq!(timestamps, vec![3.003, 9.009]);
    }

    #[test]
    fn test_parse_timestamps_ignores_noise() {
        assert!(FfmpegSceneSplitter::parse_timestamps("no matches here").is_empty());
    }
}
