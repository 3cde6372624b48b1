//! Account credential preview CLI.
//!
//! This binary delegates to `account_credentials::preview_cli` for loading,
//! validation, and rendering, keeping the behaviour testable without
//! spawning a process. Logs go to stderr as JSON; the preview goes to stdout.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use account_credentials::preview_cli::{CliError, load_config, render_outcome, run_preview};
use mockable::DefaultClock;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool, CliError> {
    let config = load_config(env::args_os())?;
    let outcome = run_preview(&config, Arc::new(DefaultClock))?;
    let rendered = render_outcome(&outcome)?;
    if let Err(err) = write!(io::stdout().lock(), "{}", with_newline(&rendered)) {
        drop(err);
    }
    Ok(outcome.is_created())
}

fn with_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_owned()
    } else {
        format!("{text}\n")
    }
}
