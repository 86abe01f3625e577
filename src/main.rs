//! Command-line entry point: run one selection and print the comparison.
//!
//! Configuration comes from the environment (see
//! [`PipelineOptions::from_env`]); log verbosity from `RUST_LOG`, defaulting
//! to `info`. Logs go to stderr, the report to stdout.
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use visit_forecast::data::SqliteVisitStore;
use visit_forecast::selection::{PipelineOptions, PipelineResult, run_pipeline};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "model selection failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let options = PipelineOptions::from_env()?;
    let source = SqliteVisitStore::new(&options.db_path, &options.username);
    let outcome = run_pipeline(&options, &source)?;
    print!("{outcome}");
    Ok(())
}
