//! CLI command implementations.

mod config;
mod doctor;
mod export;
mod init;
mod process;
mod quiz;
mod regenerate;
mod summarize;
mod translate;

pub use config::run_config;
pub use doctor::run_doctor;
pub use export::run_export;
pub use init::run_init;
pub use process::run_process;
pub use quiz::run_quiz;
pub use regenerate::run_regenerate;
pub use summarize::run_summarize;
pub use translate::run_translate;
