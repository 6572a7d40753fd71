//! Regenerate command - re-summarize the cached transcript.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{PipelineController, SummaryLanguage};

pub async fn run_regenerate(language: &str, settings: Settings) -> anyhow::Result<()> {
    preflight::check(Operation::Complete, &settings)?;

    let language: SummaryLanguage = language.parse()?;
    let controller = PipelineController::new(settings)?;

    let spinner = Output::spinner("Regenerating summary...");
    match controller.regenerate_summary(language).await {
        Ok(summary) => {
            spinner.finish_and_clear();
            Output::header("Summary");
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Summary regeneration failed ({}): {}", e.kind(), e));
            std::process::exit(1);
        }
    }
}
