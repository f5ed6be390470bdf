use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod fetch;
mod layout;
mod plan;
mod prompt;
mod report;
mod util;
mod workflow;

use cli::{Command, RootArgs};

fn main() -> ExitCode {
    let args = match RootArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // `--help` and `--version` land here too and must still exit 0.
            if let Err(print_err) = err.print() {
                eprintln!("error: {print_err}");
            }
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing();

    let result = match &args.command {
        Command::Download(download) => commands::run_download(download),
        Command::FixWorkflows(fix) => commands::run_fix_workflows(fix),
        Command::Families => commands::run_families(),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Structured logs go to stderr; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
