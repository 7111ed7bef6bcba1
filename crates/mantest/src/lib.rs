// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Executable examples for tool man pages.
//!
//! Man pages for a tag generator document examples as an input snippet,
//! the command line it was run with and the tags it produced. This crate
//! pulls those triples out of the page source and replays them against a
//! real build of the tool.
//!
//! # Document Format
//!
//! ```rst
//! "input.py"
//!
//! .. code-block:: Python
//!
//! 	def f(): pass
//!
//! "output.tags"
//! with "--options=NONE -o - --sort=no input.py"
//!
//! .. code-block:: tags
//!
//! 	f	input.py	/^def f(): pass$/;"	f
//! ```
//!
//! Each literal block may be indented by any whitespace as long as it is
//! consistent within the block, and a trailing `\` joins a block line to
//! the next one.
//!
//! # Pipeline
//!
//! - [`extract`] turns a document into [`TestCase`]s
//! - [`validate()`] checks that a case has all three parts
//! - [`Runner`] stages the case, runs the tool and diffs its output

pub mod case;
pub mod error;
pub mod extract;
pub mod options;
pub mod runner;
pub mod validate;

pub use case::{Outcome, TestCase};
pub use error::RunError;
pub use extract::{extract_tests, test_cases, Parser, State, TestCases};
pub use options::OptionsFile;
pub use runner::{Runner, RunnerConfig};
pub use validate::{validate, Problem, ValidCase, ValidationError};
