// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Extract test cases from man page sources.
//!
//! A test case is four markers in a row, each block indented by any
//! consistent whitespace:
//! ```rst
//! "input.c"
//!
//! .. code-block:: C
//!
//! 	int main(void) { return 0; }
//!
//! "output.tags"
//! with "--options=NONE -o - --sort=no input.c"
//!
//! .. code-block:: tags
//!
//! 	main	input.c	/^int main(void) { return 0; }$/;"	f
//! ```
//! Scanning is a single pass: a line that closes a block is re-tested
//! against the next state's entry condition, so nothing is read twice.

use std::sync::LazyLock;

use regex::Regex;

use crate::case::TestCase;

static INPUT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(input\.[^"]+)"$"#).expect("invalid input marker regex"));

static WITH_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"with[ \t]"([^"]+)""#).expect("invalid command line regex"));

static TAGS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\. code-block:: *tags$").expect("invalid tags block regex"));

const CODE_BLOCK: &str = ".. code-block::";
const OUTPUT_MARKER: &str = "\"output.tags\"";

/// Where the scanner is inside the current test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Looking for `"input.<ext>"`
    Start,
    /// Looking for the `.. code-block::` that holds the snippet
    AwaitingCode,
    /// Inside the snippet block
    ReadingCode,
    /// Looking for `"output.tags"`
    CodeClosed,
    /// Looking for `with "<command line>"`
    AwaitingCommand,
    /// Looking for `::` or `.. code-block:: tags`
    AwaitingTags,
    /// Inside the expected-output block
    ReadingTags,
}

/// Accumulates one indented literal block.
#[derive(Debug, Default)]
struct Block {
    text: String,
    prefix: Option<String>,
}

impl Block {
    fn reset(&mut self) {
        self.text.clear();
        self.prefix = None;
    }

    /// Take one line into the block. Returns false when the line is not
    /// part of the block, which ends it.
    fn feed(&mut self, line: &str) -> bool {
        match &self.prefix {
            Some(prefix) => {
                if let Some(rest) = line.strip_prefix(prefix.as_str()) {
                    push_segment(&mut self.text, rest);
                    true
                } else if line.is_empty() {
                    self.text.push('\n');
                    true
                } else {
                    false
                }
            }
            None => {
                let rest = line.trim_start_matches([' ', '\t']);
                if rest.is_empty() {
                    // Blank lines before the first indented line don't count.
                    true
                } else if rest.len() < line.len() {
                    let prefix = &line[..line.len() - rest.len()];
                    self.prefix = Some(prefix.to_string());
                    push_segment(&mut self.text, rest);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Finish the block with exactly one trailing newline.
    fn finish(&mut self) -> String {
        let text = self.text.trim_end_matches(['\r', '\n']);
        let mut out = String::with_capacity(text.len() + 1);
        out.push_str(text);
        out.push('\n');
        self.reset();
        out
    }
}

/// A trailing backslash joins a line with the next one.
fn push_segment(text: &mut String, segment: &str) {
    match segment.strip_suffix('\\') {
        Some(joined) => text.push_str(joined),
        None => {
            text.push_str(segment);
            text.push('\n');
        }
    }
}

/// Line-at-a-time test case scanner for one document.
#[derive(Debug)]
pub struct Parser {
    document: String,
    state: State,
    line: usize,
    next_index: usize,
    pending: Option<TestCase>,
    block: Block,
}

impl Parser {
    pub fn new(document: impl Into<String>) -> Self {
        Parser {
            document: document.into(),
            state: State::Start,
            line: 0,
            next_index: 0,
            pending: None,
            block: Block::default(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of the last line fed (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Advance over one physical line. Returns a test case when this line
    /// closed its expected-output block.
    pub fn feed(&mut self, raw: &str) -> Option<TestCase> {
        self.line += 1;
        let line = raw.trim_end_matches(['\r', '\n']);
        let mut completed = None;

        match self.state {
            State::ReadingCode => {
                if self.block.feed(line) {
                    return None;
                }
                let source = self.block.finish();
                if let Some(case) = self.pending.as_mut() {
                    case.source = Some(source);
                }
                self.state = State::CodeClosed;
            }
            State::ReadingTags => {
                if self.block.feed(line) {
                    return None;
                }
                let expected = self.block.finish();
                completed = self.pending.take().map(|mut case| {
                    case.expected = Some(expected);
                    case.index = self.next_index;
                    case.end_line = self.line;
                    case
                });
                self.next_index += 1;
                self.state = State::Start;
            }
            _ => {}
        }

        self.enter(line);
        completed
    }

    /// Test `line` against the entry condition of the current state.
    fn enter(&mut self, line: &str) {
        match self.state {
            State::Start => {
                if let Some(caps) = INPUT_MARKER.captures(line) {
                    self.pending = Some(TestCase::new(self.document.clone(), self.line, &caps[1]));
                    self.state = State::AwaitingCode;
                }
            }
            State::AwaitingCode => {
                if line.starts_with(CODE_BLOCK) {
                    self.block.reset();
                    self.state = State::ReadingCode;
                }
            }
            State::CodeClosed => {
                if line == OUTPUT_MARKER {
                    self.state = State::AwaitingCommand;
                }
            }
            State::AwaitingCommand => {
                if let Some(caps) = WITH_COMMAND.captures(line) {
                    if let Some(case) = self.pending.as_mut() {
                        case.command_line = Some(caps[1].to_string());
                    }
                    self.state = State::AwaitingTags;
                }
            }
            State::AwaitingTags => {
                if line == "::" || TAGS_BLOCK.is_match(line) {
                    self.block.reset();
                    self.state = State::ReadingTags;
                }
            }
            State::ReadingCode | State::ReadingTags => {}
        }
    }
}

/// Lazy iterator over the test cases in a stream of lines.
pub struct TestCases<I> {
    lines: I,
    parser: Parser,
    exhausted: bool,
}

impl<I> TestCases<I> {
    pub fn new(document: impl Into<String>, lines: I) -> Self {
        TestCases {
            lines,
            parser: Parser::new(document),
            exhausted: false,
        }
    }
}

impl<I, S> Iterator for TestCases<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = TestCase;

    fn next(&mut self) -> Option<TestCase> {
        if self.exhausted {
            return None;
        }
        for line in self.lines.by_ref() {
            if let Some(case) = self.parser.feed(line.as_ref()) {
                return Some(case);
            }
        }
        self.exhausted = true;
        if self.parser.state() != State::Start {
            tracing::debug!(
                document = %self.parser.document,
                state = ?self.parser.state(),
                line = self.parser.line(),
                "dropping incomplete test case at end of document"
            );
        }
        None
    }
}

/// Iterate the test cases in a document's text.
pub fn test_cases<'a>(document: impl Into<String>, text: &'a str) -> TestCases<std::str::Lines<'a>> {
    TestCases::new(document, text.lines())
}

/// Extract all test cases from a document's text.
pub fn extract_tests(document: impl Into<String>, text: &str) -> Vec<TestCase> {
    test_cases(document, text).collect()
}
