// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostic log setup.
//!
//! `MAN_TEST_LOG` holds an `EnvFilter` directive such as `mantest=debug`.
//! `MAN_TEST_LOG_FILE` sends the log to a file instead of stderr, so it
//! does not interleave with the report. An empty value counts as unset.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const FILTER_VAR: &str = "MAN_TEST_LOG";
const FILE_VAR: &str = "MAN_TEST_LOG_FILE";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sink {
    Stderr,
    File(PathBuf),
}

impl Sink {
    fn from_var(value: Option<OsString>) -> Sink {
        match value {
            Some(path) if !path.is_empty() => Sink::File(PathBuf::from(path)),
            _ => Sink::Stderr,
        }
    }
}

/// Install the global subscriber. Hold the returned guard until exit;
/// dropping it flushes the log file.
pub fn init(default_directive: &str) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_env(FILTER_VAR).unwrap_or_else(|_| EnvFilter::new(default_directive));

    let file = match Sink::from_var(std::env::var_os(FILE_VAR)) {
        Sink::Stderr => None,
        Sink::File(path) => match open_log(&path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("warning: cannot open log file {}: {err}; logging to stderr", path.display());
                None
            }
        },
    };

    match file {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            install(filter, writer, false).then_some(guard)
        }
        None => {
            install(filter, io::stderr, io::stderr().is_terminal());
            None
        }
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// False when a subscriber is already set.
fn install<W>(filter: EnvFilter, writer: W, ansi: bool) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sink_from_var() {
        assert_eq!(Sink::from_var(None), Sink::Stderr);
        assert_eq!(Sink::from_var(Some(OsString::new())), Sink::Stderr);
        assert_eq!(
            Sink::from_var(Some(OsString::from("/tmp/man-test.log"))),
            Sink::File(PathBuf::from("/tmp/man-test.log"))
        );
    }

    #[test]
    fn test_log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("man-test.log");
        fs::write(&path, "earlier run\n").unwrap();

        let mut file = open_log(&path).unwrap();
        io::Write::write_all(&mut file, b"this run\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier run\nthis run\n");
    }
}
