//! Process command - run the full pipeline on a video URL.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::PipelineController;

pub async fn run_process(
    url: &str,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Process, &settings)?;

    let controller = PipelineController::new(settings)?;

    Output::info(&format!("Processing {}", url));
    let spinner = Output::spinner("Running pipeline...");

    match controller.process_video(url).await {
        Ok(result) => {
            spinner.finish_and_clear();

            if result.cache_hit {
                Output::info("Using cached results");
            }

            Output::header("Summary");
            println!("{}", result.summary);
            println!();
            Output::kv("Language", &result.detected_language);
            Output::kv("Content hash", &result.deliverable.hash);

            if let Some(dest) = output {
                std::fs::copy(&result.deliverable.path, &dest)?;
                Output::success(&format!("Study packet written to {}", dest));
            } else {
                Output::kv(
                    "Study packet",
                    &result.deliverable.path.display().to_string(),
                );
            }

            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Processing failed ({}): {}", e.kind(), e));
            std::process::exit(1);
        }
    }
}
