use crate::analyzer::AnalysisOutcome;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Marker substituted for inference and analysis when a file is not valid UTF-8.
pub const DECODE_ERROR_MARKER: &str = "Error reading file: UnicodeDecodeError";

/// Sentinel returned by the inference client when every attempt failed.
pub const INFERENCE_FAILURE: &str = "Error generating documentation: Request failed";

/// Contents of a source file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceText {
    /// Decoded UTF-8 text
    Text(String),

    /// The file could not be read as text
    Unreadable {
        /// Marker placed in the report body
        marker: String,
    },

    /// Processing stopped before the file was fully handled
    Aborted {
        /// Marker placed in the report body
        marker: String,
    },
}

impl SourceText {
    /// Reads a whole file as UTF-8.
    ///
    /// Decode and IO failures are returned as [`SourceText::Unreadable`]
    /// rather than as errors so the file still gets a section.
    #[must_use]
    pub fn read(path: &Path) -> Self {
        match read_utf8(path) {
            Ok(text) => Self::Text(text),
            Err(Error::InvalidUtf8 { .. }) => Self::Unreadable {
                marker: DECODE_ERROR_MARKER.to_string(),
            },
            Err(e) => Self::Unreadable {
                marker: format!("Error reading file: {e}"),
            },
        }
    }

    /// Returns the text if the file was decoded.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Unreadable { .. } | Self::Aborted { .. } => None,
        }
    }
}

fn read_utf8(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            Error::invalid_utf8(path)
        } else {
            Error::io(path, e)
        }
    })
}

/// Result of processing one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Path as discovered
    pub path: PathBuf,

    /// Position in discovery order
    pub index: usize,

    /// Model output or a failure marker
    pub inference: String,

    /// Static analysis result
    pub analysis: AnalysisOutcome,

    /// Raw source text
    pub source: SourceText,
}

impl FileReport {
    /// Creates a report for a file whose contents could not be read.
    #[must_use]
    pub fn unreadable(path: PathBuf, index: usize, marker: &str) -> Self {
        Self {
            path,
            index,
            inference: marker.to_string(),
            analysis: AnalysisOutcome::Failed {
                reason: marker.to_string(),
            },
            source: SourceText::Unreadable {
                marker: marker.to_string(),
            },
        }
    }

    /// Creates a report for a file whose processing was aborted, e.g. by a
    /// panic in a worker.
    #[must_use]
    pub fn aborted(path: PathBuf, index: usize, marker: &str) -> Self {
        Self {
            path,
            index,
            inference: marker.to_string(),
            analysis: AnalysisOutcome::Skipped,
            source: SourceText::Aborted {
                marker: marker.to_string(),
            },
        }
    }

    /// Section title for this file.
    #[must_use]
    pub fn title(&self) -> String {
        format!("File: {}", self.path.display())
    }

    /// Section body: analysis, inference and source separated by blank lines.
    /// Empty parts are left out. For unreadable files the marker shared by
    /// analysis and inference is printed once.
    #[must_use]
    pub fn body(&self) -> String {
        let analysis = self.analysis.to_text();
        let analysis = if self.is_unreadable() && analysis == self.inference {
            ""
        } else {
            analysis.as_str()
        };
        let source = self.source.as_text().unwrap_or_default();

        [analysis, self.inference.as_str(), source]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Returns true if the file could not be read as text.
    #[must_use]
    pub const fn is_unreadable(&self) -> bool {
        matches!(self.source, SourceText::Unreadable { .. })
    }

    /// Returns true if processing was aborted before completion.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.source, SourceText::Aborted { .. })
    }

    /// Returns true if inference fell back to the sentinel.
    #[must_use]
    pub fn inference_failed(&self) -> bool {
        self.inference == INFERENCE_FAILURE
    }
}
