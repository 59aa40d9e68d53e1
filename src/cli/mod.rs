//! Command-line interface layer.

pub mod args;
pub mod commands;
mod exit_status;
pub mod report;
mod run;

use std::process::ExitCode;

use anyhow::Result;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;
pub use run::run;

/// Run the CLI end to end: execute the command, print the report and the
/// summary, and map the outcome to an exit code.
pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let result = run(args)?;
    report::report(&result.issues);
    report::print_summary(&result);

    let status = if result.issues.is_empty() {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    };
    Ok(status.into())
}
