// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, build the API client, parse the
//   arguments and hand everything to `talks_cli::run`.
// - Logs go to stderr so stdout carries only the command output.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use talks_cli::{ApiClient, Cli, TalksError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse first: usage errors, --help and --version exit here.
    let cli = Cli::parse();

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let api = ApiClient::from_env().context("could not configure the registry client")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    talks_cli::run(cli, &api, &mut out)?;
    out.flush()?;
    Ok(())
}

fn report(err: anyhow::Error) -> ExitCode {
    match err.downcast_ref::<TalksError>() {
        // Missing input is reported on stdout, not as a failure dump.
        Some(TalksError::MissingField) => {
            println!("Error: {}", TalksError::MissingField);
            ExitCode::from(TalksError::MissingField.exit_code())
        }
        Some(talks_err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(talks_err.exit_code())
        }
        None => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
