// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! man-test - check the examples in man pages against the tool they document.

mod harness;
mod logging;
mod output;
mod report;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use mantest::{Runner, RunnerConfig};
use thiserror::Error;

use crate::harness::Harness;
use crate::output::ColorMode;
use crate::report::Reporter;

const EXIT_USAGE: u8 = 2;

/// Run the tagged examples in man page sources and compare the tool's
/// output with the documented output.
#[derive(Debug, Parser)]
#[command(name = "man-test", version)]
struct Cli {
    /// Directory to stage test cases in
    work_dir: PathBuf,

    /// Tool under test
    tool: PathBuf,

    /// Man page sources (e.g. ctags-lang-python.7.rst.in)
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Line diff program; must accept -uN and --strip-trailing-cr
    #[arg(long, env = "MAN_TEST_DIFF", default_value = "diff")]
    diff: PathBuf,

    /// Keep the staging directory of failed test cases
    #[arg(long, env = "MAN_TEST_KEEP_FAILED")]
    keep_failed: bool,

    /// When to color the report
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[source] io::Error),
    #[error("cannot write report: {0}")]
    Report(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::DisplayVersion => {
            print!("{err}");
            return ExitCode::SUCCESS;
        }
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            eprint!("{}", Cli::command().render_help());
            return ExitCode::from(EXIT_USAGE);
        }
        Err(err) => {
            eprint!("{err}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let _log_guard = logging::init("warn");

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{}: {}", output::error_label(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, CliError> {
    let color = output::init(cli.color);
    let cwd = std::env::current_dir().map_err(CliError::CurrentDir)?;

    let config = RunnerConfig::new(cli.work_dir, cli.tool)
        .with_tool_anchored(&cwd)
        .with_diff(cli.diff)
        .with_keep_failed(cli.keep_failed);
    tracing::debug!(?config, documents = cli.documents.len(), "starting");

    let reporter = Reporter::new(io::stdout().lock(), io::stderr(), color);
    let summary = Harness::new(Runner::new(config), reporter).run(&cli.documents)?;
    Ok(summary.is_ok())
}
