//! OCR via the tesseract CLI.

use super::TextExtractor;
use crate::error::{LektorError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Text extractor shelling out to tesseract.
pub struct TesseractExtractor {
    language: String,
}

impl TesseractExtractor {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, image: &Path) -> Result<String> {
        let result = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l").arg(&self.language)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LektorError::ToolNotFound("tesseract".into()));
            }
            Err(e) => {
                return Err(LektorError::Provider(format!("tesseract failed: {e}")));
            }
        };

        if !output.status.success() {
            return Err(LektorError::Provider(format!(
                "tesseract exited with status {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
