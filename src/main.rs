//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `datastore_export` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use datastore_export::config::Opt;
use datastore_export::initialization::init_logger_with;
use datastore_export::{run_export, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // DATASTORE_API_KEY may come from a .env file in the working directory
    // or next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_export(config).await {
        Ok(report) => {
            match report.documents_found {
                Some(found) => println!(
                    "Exported {} page file{} ({} matching document{}) in {:.1}s",
                    report.pages_written(),
                    if report.pages_written() == 1 { "" } else { "s" },
                    found,
                    if found == 1 { "" } else { "s" },
                    report.elapsed_seconds
                ),
                None => println!(
                    "Exported {} page file{} ({} document{}) in {:.1}s",
                    report.pages_written(),
                    if report.pages_written() == 1 { "" } else { "s" },
                    report.documents_written,
                    if report.documents_written == 1 { "" } else { "s" },
                    report.elapsed_seconds
                ),
            }
            if let Some(dir) = report.files.first().and_then(|f| f.parent()) {
                println!("Results saved in {}", dir.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("datastore_export error: {:#}", e);
            process::exit(1);
        }
    }
}
