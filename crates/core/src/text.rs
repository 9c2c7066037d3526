// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text-generation seam.
//!
//! Narratives and the qualitative summary come from an opaque, possibly
//! failing collaborator. Callers treat a failure as "no text" and carry on.

use std::sync::Arc;

use crate::error::{Error, Result};

/// Turns a context document into prose.
pub trait TextGenerator: Send + Sync {
    fn summarize(&self, context: &str) -> Result<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn summarize(&self, context: &str) -> Result<String> {
        (**self).summarize(context)
    }
}

/// Generator used when nothing is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl TextGenerator for Unavailable {
    fn summarize(&self, _context: &str) -> Result<String> {
        Err(Error::TextGeneration(
            "no text generator configured".to_string(),
        ))
    }
}

/// Shared handle passed to analyzers and the pipeline.
pub type SharedTextGenerator = Arc<dyn TextGenerator>;

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
