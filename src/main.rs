//! Lektor CLI entry point.

use anyhow::Result;
use clap::Parser;
use lektor::cli::{commands, Cli, Commands};
use lektor::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lektor={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Process { url, output } => {
            commands::run_process(url, output.clone(), settings).await?;
        }

        Commands::Quiz {
            difficulty,
            count,
            from_file,
            output,
        } => {
            commands::run_quiz(difficulty, *count, from_file.clone(), output.clone(), settings)
                .await?;
        }

        Commands::Export { what, output } => {
            commands::run_export(what, output.clone(), settings).await?;
        }

        Commands::Summarize { file, pdf } => {
            commands::run_summarize(file, pdf.clone(), settings).await?;
        }

        Commands::Translate { target, file } => {
            commands::run_translate(target, file.clone(), settings).await?;
        }

        Commands::Regenerate { language } => {
            commands::run_regenerate(language, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
