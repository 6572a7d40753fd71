//! Export command - read cached artifacts.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::PipelineController;

pub async fn run_export(
    what: &str,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Export, &settings)?;

    let controller = PipelineController::new(settings)?;

    match what.to_lowercase().as_str() {
        "transcript" => {
            let transcript = controller.cached_transcript().await?;
            match output {
                Some(dest) => {
                    std::fs::write(&dest, &transcript)?;
                    Output::success(&format!("Transcript written to {}", dest));
                }
                None => println!("{}", transcript),
            }
        }

        "packet" | "pdf" => {
            let bytes = controller.cached_deliverable().await?;
            let dest = output.unwrap_or_else(|| "LectureNotes.pdf".to_string());
            std::fs::write(&dest, &bytes)?;
            Output::success(&format!("Study packet written to {}", dest));
        }

        other => {
            Output::error(&format!(
                "Unknown export target '{}': expected transcript or packet",
                other
            ));
            std::process::exit(1);
        }
    }

    Ok(())
}
