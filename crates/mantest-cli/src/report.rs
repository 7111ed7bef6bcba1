// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Progress lines and failure transcripts.
//!
//! The layout is Markdown so a CI log can be pasted into an issue as is:
//!
//! ````text
//! # Run test cases in ctags-lang-c.7.rst.in
//! ```
//! ctags-lang-c.7.rst.in[0]:12...passed
//! ```
//! ````

use std::fmt::Display;
use std::io::{self, Write};

use mantest::{Outcome, TestCase};

use crate::output;

/// Writes the report to `out` and diagnostics to `err`.
pub struct Reporter<O, E> {
    out: O,
    err: E,
    color: bool,
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E, color: bool) -> Self {
        Reporter { out, err, color }
    }

    pub fn begin_document(&mut self, document: &str) -> io::Result<()> {
        let title = format!("# Run test cases in {document}");
        writeln!(self.out, "{}", self.heading(&title))?;
        writeln!(self.out, "```")
    }

    /// `<document>[<index>]:<start_line>...<passed|failed>`
    pub fn progress(&mut self, case: &TestCase) -> io::Result<()> {
        let word = match (case.outcome(), self.color) {
            (Outcome::Passed, true) => output::passed().to_string(),
            (Outcome::Failed { .. }, true) => output::failed().to_string(),
            (outcome, _) => outcome.label().to_string(),
        };
        writeln!(self.out, "{}...{}", case.locator(), word)?;
        self.out.flush()
    }

    /// Close the progress block and print a transcript per failure.
    pub fn end_document(&mut self, failures: &[TestCase]) -> io::Result<()> {
        writeln!(self.out, "```")?;
        if failures.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", self.heading("# Failed test case(s)"))?;
        for case in failures {
            self.transcript(case)?;
        }
        Ok(())
    }

    fn transcript(&mut self, case: &TestCase) -> io::Result<()> {
        writeln!(self.out, "## {}", case.locator())?;
        let (actual, diff) = match case.outcome() {
            Outcome::Failed { actual, diff } => (actual.as_str(), diff.as_str()),
            _ => ("", ""),
        };
        self.section("input", case.source.as_deref().unwrap_or_default())?;
        self.section("cmdline", case.command_line.as_deref().unwrap_or_default())?;
        self.section("expected tags", case.expected.as_deref().unwrap_or_default())?;
        self.section("actual tags", actual)?;
        self.section("diff of tag files", diff)
    }

    fn section(&mut self, title: &str, body: &str) -> io::Result<()> {
        writeln!(self.out, "### {title}")?;
        writeln!(self.out, "```")?;
        writeln!(self.out, "{body}")?;
        writeln!(self.out, "```")
    }

    /// `error: <message>` on the diagnostic stream.
    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.err, "{}: {}", output::error_label(), message)
        } else {
            writeln!(self.err, "error: {}", message)
        }
    }

    /// Final `OK` or `FAILED`.
    pub fn verdict(&mut self, ok: bool) -> io::Result<()> {
        let word = match (ok, self.color) {
            (true, true) => output::banner_ok().to_string(),
            (false, true) => output::banner_fail().to_string(),
            (true, false) => "OK".to_string(),
            (false, false) => "FAILED".to_string(),
        };
        writeln!(self.out, "{word}")?;
        self.out.flush()
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            output::heading(text).to_string()
        } else {
            text.to_string()
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
