//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{LektorError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Full pipeline: download, transcribe, OCR, render.
    Process,
    /// Completion-only operations (quiz, summarize, translate).
    Complete,
    /// Cache reads only.
    Export,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Process => {
            check_api_key(settings)?;
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
            check_tool("tesseract")?;
        }
        Operation::Complete => {
            check_api_key(settings)?;
        }
        Operation::Export => {
            // No external requirements for cache reads
        }
    }
    Ok(())
}

/// Check if the provider API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    let var = &settings.provider.api_key_env;
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(LektorError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(LektorError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(LektorError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LektorError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(LektorError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_export_no_requirements() {
        // Export should always pass pre-flight (no external requirements)
        let settings = Settings::default();
        assert!(check(Operation::Export, &settings).is_ok());
    }
}
