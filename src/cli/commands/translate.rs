//! Translate command - translate summary text into another language.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::PipelineController;
use std::io::Read;

pub async fn run_translate(
    target: &str,
    file: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Complete, &settings)?;

    let text = match &file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let controller = PipelineController::new(settings)?;

    let spinner = Output::spinner("Translating...");
    match controller.translate_summary(&text, target).await {
        Ok(translated) => {
            spinner.finish_and_clear();
            println!("{}", translated);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Translation failed ({}): {}", e.kind(), e));
            std::process::exit(1);
        }
    }
}
