//! Quiz command - generate a quiz from the cached lecture or a file.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::PipelineController;
use crate::quiz::Difficulty;

pub async fn run_quiz(
    difficulty: &str,
    count: u32,
    from_file: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Complete, &settings)?;

    let difficulty: Difficulty = difficulty.parse()?;
    let source_text = match &from_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };

    let controller = PipelineController::new(settings)?;

    let spinner = Output::spinner("Generating quiz...");
    match controller
        .generate_quiz(&source_text, difficulty, count)
        .await
    {
        Ok(quiz) => {
            spinner.finish_and_clear();

            let json = serde_json::to_string_pretty(&quiz)?;
            match output {
                Some(dest) => {
                    std::fs::write(&dest, &json)?;
                    Output::success(&format!(
                        "Wrote {} questions to {}",
                        quiz.quiz.len(),
                        dest
                    ));
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Quiz generation failed ({}): {}", e.kind(), e));
            std::process::exit(1);
        }
    }
}
