// Entrypoint for the repricing CLI.
// - Logs go to a file so they do not interleave with the prompts.
// - Any error that reaches `main` is logged in full and shown to the user
//   as a short message; the process exits with status 1.

use anyhow::{Context, Result};
use catalog_repricer::{
    api::ApiClient,
    config::Settings,
    pipeline::Pipeline,
    ui::{self, Spinning, TerminalConsole},
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "catalog-repricer.log";

fn init_logging() -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)
        .with_context(|| format!("Failed to create log file {}", LOG_FILE))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_repricer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

fn run() -> Result<bool> {
    let settings = Settings::load()?;
    let api = ApiClient::new(&settings.api.base_url, settings.timeout())?;
    tracing::info!(base_url = api.base_url(), "application started");

    let mut pipeline = Pipeline::new(
        Spinning::new(api),
        TerminalConsole,
        settings.pipeline_options(),
    );
    match pipeline.run() {
        Ok(report) => {
            ui::print_summary(&report);
            tracing::info!(stage = ?pipeline.stage(), "application terminated");
            Ok(true)
        }
        Err(e) => {
            tracing::error!(stage = ?pipeline.stage(), error = ?e, "run aborted");
            ui::print_failure(&ui::failure_message(&e));
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("unhandled error: {:#}", e);
            ui::print_failure(&format!("An error occurred: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
