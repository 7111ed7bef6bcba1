// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Test case records shared by the extractor, validator and runner.

use std::fmt;

/// Result of running a test case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Not run yet.
    #[default]
    Unrun,
    /// The tool's output matched the documented output.
    Passed,
    /// The tool's output differed. Carries what the tool printed and the
    /// comparator's unified diff.
    Failed { actual: String, diff: String },
}

impl Outcome {
    pub fn is_unrun(&self) -> bool {
        matches!(self, Outcome::Unrun)
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// Word used in progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Unrun => "unrun",
            Outcome::Passed => "passed",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// One documented (input, command line, expected output) example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Document the case was extracted from
    pub document: String,
    /// 0-based position of the case within its document
    pub index: usize,
    /// Line of the `"input.<ext>"` marker (1-indexed)
    pub start_line: usize,
    /// Line that closed the expected-output block (1-indexed)
    pub end_line: usize,
    /// File name the snippet is staged under
    pub input_file_name: String,
    /// Snippet fed to the tool
    pub source: Option<String>,
    /// Documented invocation, verbatim
    pub command_line: Option<String>,
    /// Documented tool output
    pub expected: Option<String>,
    outcome: Outcome,
}

impl TestCase {
    /// An empty skeleton opened by an input marker.
    pub fn new(document: impl Into<String>, start_line: usize, input_file_name: impl Into<String>) -> Self {
        TestCase {
            document: document.into(),
            index: 0,
            start_line,
            end_line: start_line,
            input_file_name: input_file_name.into(),
            source: None,
            command_line: None,
            expected: None,
            outcome: Outcome::Unrun,
        }
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Record the runner's verdict. The first recorded outcome sticks;
    /// later attempts are ignored.
    pub fn record(&mut self, outcome: Outcome) -> bool {
        if !self.outcome.is_unrun() {
            tracing::warn!(
                case = %self.locator(),
                existing = self.outcome.label(),
                ignored = outcome.label(),
                "outcome already recorded"
            );
            return false;
        }
        self.outcome = outcome;
        true
    }

    /// `<document>[<index>]:<start_line>`, the handle used in every report line.
    pub fn locator(&self) -> Locator<'_> {
        Locator(self)
    }
}

/// Display adapter for [`TestCase::locator`].
pub struct Locator<'a>(&'a TestCase);

impl fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]:{}", self.0.document, self.0.index, self.0.start_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_format() {
        let mut case = TestCase::new("ctags-lang-c.7.rst.in", 12, "input.c");
        case.index = 3;
        assert_eq!(case.locator().to_string(), "ctags-lang-c.7.rst.in[3]:12");
    }

    #[test]
    fn test_outcome_is_recorded_once() {
        let mut case = TestCase::new("doc", 1, "input.c");
        assert!(case.outcome().is_unrun());

        assert!(case.record(Outcome::Passed));
        assert!(!case.record(Outcome::Failed {
            actual: String::new(),
            diff: "x".to_string(),
        }));
        assert_eq!(case.outcome(), &Outcome::Passed);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Unrun.label(), "unrun");
        assert_eq!(Outcome::Passed.label(), "passed");
        let failed = Outcome::Failed { actual: String::new(), diff: String::new() };
        assert_eq!(failed.label(), "failed");
        assert!(failed.is_failed());
        assert!(!failed.is_passed());
    }
}
