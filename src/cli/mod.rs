//! CLI module for Lektor.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lektor - Lecture Study Packets
///
/// A CLI tool that turns lecture videos into summarized study packets with
/// slides, OCR text and quizzes. The name "Lektor" comes from the Norwegian
/// word for "lecturer."
#[derive(Parser, Debug)]
#[command(name = "lektor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Lektor and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Process a lecture video into a study packet
    Process {
        /// Video URL (http/https)
        url: String,

        /// Copy the rendered PDF to this path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate a quiz from the cached lecture (or a transcript file)
    Quiz {
        /// Quiz difficulty (easy, medium, hard)
        #[arg(short, long, default_value = "medium")]
        difficulty: String,

        /// Number of questions (1-20)
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,

        /// Read source text from a file instead of the cached transcript
        #[arg(long)]
        from_file: Option<String>,

        /// Write quiz JSON to a file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export cached artifacts
    Export {
        /// What to export (transcript, packet)
        what: String,

        /// Output file (stdout for transcript if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Summarize a transcript file in bullet points
    Summarize {
        /// Path to a transcript text file
        file: String,

        /// Also render the summary as a PDF at this path
        #[arg(long)]
        pdf: Option<String>,
    },

    /// Translate summary text into another language
    Translate {
        /// Target language (e.g. "es", "French")
        #[arg(short, long)]
        target: String,

        /// Read text from a file (stdin if not specified)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Re-summarize the cached transcript
    Regenerate {
        /// Summary language (english, original)
        #[arg(short, long, default_value = "english")]
        language: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
