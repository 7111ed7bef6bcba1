// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.
//! Colors are disabled when stdout is not a terminal unless forced.

use std::io::IsTerminal;

use clap::ValueEnum;
use colored::{ColoredString, Colorize};

/// `--color` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Decide whether to color stdout and tell `colored` about it.
/// Call once at startup.
pub fn init(mode: ColorMode) -> bool {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            if std::env::var_os("NO_COLOR").is_some() {
                false
            } else if std::env::var_os("FORCE_COLOR").is_some() {
                true
            } else {
                std::io::stdout().is_terminal()
            }
        }
    };
    colored::control::set_override(enabled);
    enabled
}

// === Labels ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn passed() -> ColoredString {
    "passed".green()
}

pub fn failed() -> ColoredString {
    "failed".red()
}

pub fn banner_ok() -> ColoredString {
    "OK".green().bold()
}

pub fn banner_fail() -> ColoredString {
    "FAILED".red().bold()
}

pub fn heading(text: &str) -> ColoredString {
    text.yellow().bold()
}
