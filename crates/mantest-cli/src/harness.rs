// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Drive every document through extract, validate, run and report.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use mantest::{test_cases, validate, Runner, TestCase};

use crate::report::Reporter;

/// Counts for a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub documents: usize,
    pub unreadable: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Cases rejected by validation
    pub invalid: usize,
    /// Cases that could not be staged or run
    pub errored: usize,
}

impl Summary {
    pub fn add(&mut self, case: &TestCase) {
        self.total += 1;
        if case.outcome().is_passed() {
            self.passed += 1;
        } else if case.outcome().is_failed() {
            self.failed += 1;
        }
    }

    pub fn is_ok(&self) -> bool {
        self.unreadable == 0 && self.failed == 0 && self.invalid == 0 && self.errored == 0
    }
}

/// Runs documents one after another; a failure never stops the run.
pub struct Harness<O, E> {
    runner: Runner,
    reporter: Reporter<O, E>,
    summary: Summary,
}

impl<O: Write, E: Write> Harness<O, E> {
    pub fn new(runner: Runner, reporter: Reporter<O, E>) -> Self {
        Harness {
            runner,
            reporter,
            summary: Summary::default(),
        }
    }

    /// Test all documents and print the final verdict.
    pub fn run<P: AsRef<Path>>(mut self, documents: &[P]) -> io::Result<Summary> {
        for document in documents {
            self.run_document(document.as_ref())?;
        }
        let ok = self.summary.is_ok();
        self.reporter.verdict(ok)?;
        tracing::info!(summary = ?self.summary, "run finished");
        Ok(self.summary)
    }

    fn run_document(&mut self, path: &Path) -> io::Result<()> {
        let document = path.display().to_string();
        let _span = tracing::info_span!("document", %document).entered();
        self.summary.documents += 1;

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                self.summary.unreadable += 1;
                return self.reporter.error(format_args!("reading {document}: {err}"));
            }
        };

        self.reporter.begin_document(&document)?;
        let mut failures = Vec::new();

        for mut case in test_cases(document.as_str(), &text) {
            let result = match validate(&case) {
                Ok(valid) => self.runner.run(valid),
                Err(err) => {
                    self.summary.invalid += 1;
                    self.reporter.error(err)?;
                    continue;
                }
            };
            match result {
                Ok(outcome) => {
                    case.record(outcome);
                }
                Err(err) => {
                    // The reporter prints it; at debug level it stays out of the default log.
                    tracing::debug!(case = %case.locator(), error = %err, "cannot run test case");
                    self.summary.errored += 1;
                    self.reporter.error(format_args!("{}: {}", case.locator(), err))?;
                    continue;
                }
            }

            self.reporter.progress(&case)?;
            self.summary.add(&case);
            if case.outcome().is_failed() {
                failures.push(case);
            }
        }

        self.reporter.end_document(&failures)
    }
}
