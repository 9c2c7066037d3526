// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! External summariser process.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use epicscope_core::{Error, Result, SharedTextGenerator, TextGenerator, Unavailable};
use tracing::debug;

/// Runs a configured program: context on stdin, summary on stdout.
#[derive(Debug, Clone)]
pub struct CommandTextGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandTextGenerator {
    /// Returns `None` for an empty command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(CommandTextGenerator {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl TextGenerator for CommandTextGenerator {
    fn summarize(&self, context: &str) -> Result<String> {
        debug!(program = %self.program, bytes = context.len(), "running text generator");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::TextGeneration(format!("failed to spawn '{}': {}", self.program, e)))?;

        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            if let Some(mut stdin) = stdin {
                // A generator may exit without reading its input.
                scope.spawn(move || {
                    let _ = stdin.write_all(context.as_bytes());
                });
            }
            child.wait_with_output()
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::TextGeneration(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(Error::TextGeneration(format!(
                "'{}' produced no output",
                self.program
            )));
        }
        Ok(text)
    }
}

/// Generator for a configured command line, or [`Unavailable`] when empty.
pub fn text_generator(command: &[String]) -> SharedTextGenerator {
    match CommandTextGenerator::from_argv(command) {
        Some(generator) => Arc::new(generator),
        None => Arc::new(Unavailable),
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
