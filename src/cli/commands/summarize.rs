//! Summarize command - bullet-point summary of a transcript file.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::PipelineController;

pub async fn run_summarize(
    file: &str,
    pdf: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Complete, &settings)?;

    let text = std::fs::read_to_string(file)?;
    let controller = PipelineController::new(settings)?;

    let spinner = Output::spinner("Summarizing transcript...");
    match controller.summarize_transcript(&text).await {
        Ok(result) => {
            spinner.finish_and_clear();

            Output::header("Summary");
            println!("{}", result.summary);
            println!();
            Output::kv("Detected language", &result.detected_language);

            if let Some(dest) = pdf {
                let bytes = controller.render_summary_document(&result.summary)?;
                std::fs::write(&dest, &bytes)?;
                Output::success(&format!("Summary PDF written to {}", dest));
            }

            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Summarization failed ({}): {}", e.kind(), e));
            std::process::exit(1);
        }
    }
}
