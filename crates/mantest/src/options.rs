// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rebuild an options file from a documented command line.
//!
//! The documented command line is one string. The tool instead gets an
//! options file with one directive per line, plus the input file as a
//! positional argument. Pattern options (`--regex-<LANG>=/.../.../`) may
//! hold spaces, so the tokens after one are glued back onto it until the
//! next token that looks like an option.
//!
//! Known limits of that guess: runs of whitespace inside a pattern collapse
//! to one space, and a pattern word that contains `--x` is taken for a new
//! option.

use std::sync::LazyLock;

use regex::Regex;

/// Dropped; the runner always passes it itself.
pub const NO_DEFAULT_OPTIONS: &str = "--options=NONE";

/// Options whose value may contain whitespace.
pub const PATTERN_OPTION_PREFIXES: &[&str] = &["--regex-", "--mline-regex-", "--_mtable-regex-"];

static LONG_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[a-z_]").expect("invalid long option regex"));

static SHORT_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-[a-z]$").expect("invalid short option regex"));

/// Options file contents plus the positional input argument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionsFile {
    pub lines: Vec<String>,
    pub input: Option<String>,
}

impl OptionsFile {
    /// Parse a documented command line.
    pub fn from_command_line(command_line: &str) -> Self {
        let mut file = OptionsFile::default();
        let mut pattern: Option<String> = None;

        for token in command_line.split_whitespace() {
            if token == NO_DEFAULT_OPTIONS {
                continue;
            }
            if token.starts_with("input.") {
                file.input = Some(token.to_string());
                continue;
            }
            if is_pattern_option(token) {
                file.lines.extend(pattern.take());
                pattern = Some(token.to_string());
                continue;
            }
            if !looks_like_option(token) {
                if let Some(value) = pattern.as_mut() {
                    value.push(' ');
                    value.push_str(token);
                    continue;
                }
            }
            file.lines.extend(pattern.take());
            file.lines.push(token.to_string());
        }
        file.lines.extend(pattern);
        file
    }

    /// File contents, one directive per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// `--word...` anywhere in the token, or a lone `-x`.
pub fn looks_like_option(token: &str) -> bool {
    LONG_OPTION.is_match(token) || SHORT_OPTION.is_match(token)
}

fn is_pattern_option(token: &str) -> bool {
    PATTERN_OPTION_PREFIXES.iter().any(|prefix| token.starts_with(prefix))
}
