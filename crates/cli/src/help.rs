// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code: u8| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));

    Styles::styled()
        .header(fg(colors::codes::HEADER))
        .usage(fg(colors::codes::HEADER))
        .literal(fg(colors::codes::LITERAL))
        .placeholder(fg(colors::codes::CONTEXT))
        .valid(fg(colors::codes::CONTEXT))
}

/// Quickstart shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  epicscope import ./export/             Load scraped records
  epicscope tree EPIC-1                  Show the hierarchy
  epicscope analyze EPIC-1 --only scope  Run one analyzer
  epicscope report EPIC-1                Build or reuse the composite",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
