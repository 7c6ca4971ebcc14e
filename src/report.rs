//! Document assembly.
//!
//! A [`Document`] is built on the controlling thread one section at a time.
//! [`Document::serialize`] consumes it, so a document can be finalized only
//! once and never mutated afterwards.

use crate::{
    config::OutputFormat,
    error::Result,
    template::TemplateEngine,
    writer::Writer,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Replacement for characters outside Latin-1.
pub const REPLACEMENT_CHAR: char = '?';

/// One titled section of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Section title, `File: <path>`
    pub title: String,
    /// Section body
    pub body: String,
}

/// Document under construction.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    format: OutputFormat,
    sections: Vec<Section>,
}

/// A document that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedDocument {
    /// Where the document was written
    pub path: PathBuf,
    /// Number of sections written
    pub sections: usize,
    /// Size of the artifact in bytes
    pub bytes: usize,
}

impl Document {
    /// Starts an empty document.
    #[must_use]
    pub fn new(title: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            title: sanitize_latin1(&title.into()),
            format,
            sections: Vec::new(),
        }
    }

    /// Appends a section. Characters outside Latin-1 are replaced with
    /// [`REPLACEMENT_CHAR`].
    pub fn add_section(&mut self, title: &str, body: &str) {
        self.sections.push(Section {
            title: sanitize_latin1(title),
            body: sanitize_latin1(body),
        });
    }

    /// Sections in insertion order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if no section was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Renders the document and writes it to `path` as Latin-1.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails. No file is left at
    /// `path` in that case.
    pub fn serialize(self, path: &Path) -> Result<FinalizedDocument> {
        let rendered = TemplateEngine::new(self.format)?.render(&self.title, &self.sections)?;
        let bytes = encode_latin1(&rendered);

        Writer::write_atomic(path, &bytes)?;

        info!(
            "Wrote {} sections ({} bytes) to {}",
            self.sections.len(),
            bytes.len(),
            path.display()
        );

        Ok(FinalizedDocument {
            path: path.to_path_buf(),
            sections: self.sections.len(),
            bytes: bytes.len(),
        })
    }
}

/// Replaces every character above U+00FF with [`REPLACEMENT_CHAR`].
#[must_use]
pub fn sanitize_latin1(text: &str) -> String {
    text.chars()
        .map(|c| if u32::from(c) <= 0xFF { c } else { REPLACEMENT_CHAR })
        .collect()
}

fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT_CHAR as u8))
        .collect()
}
