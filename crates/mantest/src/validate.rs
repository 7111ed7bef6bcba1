// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Structural checks run before a test case is staged.

use thiserror::Error;

use crate::case::TestCase;

/// A test case that has everything needed to run.
#[derive(Debug, Clone, Copy)]
pub struct ValidCase<'a> {
    pub case: &'a TestCase,
    pub input_file_name: &'a str,
    pub source: &'a str,
    pub command_line: &'a str,
    pub expected: &'a str,
}

/// Why a test case cannot run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("cannot find input lines")]
    MissingSource,
    #[error("cannot find expected tags output")]
    MissingExpected,
    #[error("cannot find command line")]
    MissingCommandLine,
    #[error("invalid input file name \"{0}\"")]
    BadInputFileName(String),
}

/// A structural error, located in its document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{document}[{index}]:{start_line}: {problem}")]
pub struct ValidationError {
    pub document: String,
    pub index: usize,
    pub start_line: usize,
    pub problem: Problem,
}

/// Check that a test case is complete. The first missing piece is reported.
pub fn validate(case: &TestCase) -> Result<ValidCase<'_>, ValidationError> {
    let fail = |problem| ValidationError {
        document: case.document.clone(),
        index: case.index,
        start_line: case.start_line,
        problem,
    };

    let source = case.source.as_deref().ok_or_else(|| fail(Problem::MissingSource))?;
    let expected = case.expected.as_deref().ok_or_else(|| fail(Problem::MissingExpected))?;
    let command_line = case
        .command_line
        .as_deref()
        .ok_or_else(|| fail(Problem::MissingCommandLine))?;

    if !is_plain_input_name(&case.input_file_name) {
        return Err(fail(Problem::BadInputFileName(case.input_file_name.clone())));
    }

    Ok(ValidCase {
        case,
        input_file_name: &case.input_file_name,
        source,
        command_line,
        expected,
    })
}

/// `input.<ext>` with no way to climb out of the staging directory.
fn is_plain_input_name(name: &str) -> bool {
    match name.strip_prefix("input.") {
        Some(ext) => !ext.is_empty() && !name.contains(['/', '\\']) && !name.contains(".."),
        None => false,
    }
}
