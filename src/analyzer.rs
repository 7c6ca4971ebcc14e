//! Optional static analysis through an external linter.
//!
//! The linter is probed once at startup. A missing program yields
//! [`Analyzer::Unavailable`], and a program that fails to launch for a given
//! file yields [`AnalysisOutcome::Failed`] for that file only.

use crate::config::LinterConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Result of analyzing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Standard output of the linter, exit status ignored
    Output(String),

    /// Analysis disabled or not applicable to the file type
    Skipped,

    /// The linter could not be run
    Failed {
        /// Why the linter could not be run
        reason: String,
    },
}

impl AnalysisOutcome {
    /// Text placed in the report body. Empty when skipped.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Output(text) => text.trim_end().to_string(),
            Self::Skipped => String::new(),
            Self::Failed { reason } => reason.clone(),
        }
    }

    /// Returns true if the linter could not be run.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// External linting program.
#[derive(Debug, Clone)]
pub struct ExternalLinter {
    name: String,
    program: PathBuf,
    extensions: Vec<String>,
}

impl ExternalLinter {
    /// Creates a linter that runs `program <file>`.
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            extensions,
        }
    }

    /// Returns true if the linter understands this file type.
    #[must_use]
    pub fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Runs the linter and captures its standard output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnalyzerLaunch`] if the process cannot be started.
    pub fn run(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::analyzer(&self.name, &e))?;

        debug!(
            "{} exited with {} for {}",
            self.name,
            output.status,
            path.display()
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Static analysis capability.
#[derive(Debug, Clone)]
pub enum Analyzer {
    /// Linter found and runnable
    Available(ExternalLinter),

    /// Linter could not be located
    Unavailable {
        /// Configured program name
        program: String,
        /// Why it is unavailable
        reason: String,
    },
}

impl Analyzer {
    /// Locates the configured linter on `PATH`.
    #[must_use]
    pub fn detect(config: &LinterConfig) -> Self {
        match which::which(&config.program) {
            Ok(program) => {
                debug!("Using static analyzer {}", program.display());
                Self::Available(ExternalLinter::new(
                    &config.program,
                    program,
                    config.extensions.clone(),
                ))
            }
            Err(e) => {
                warn!(
                    "Static analyzer '{}' not available: {}; analysis sections will be marked",
                    config.program, e
                );
                Self::Unavailable {
                    program: config.program.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Returns true if the linter can be run.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Analyzes one file. Never fails: launch problems become
    /// [`AnalysisOutcome::Failed`].
    #[must_use]
    pub fn analyze(&self, path: &Path) -> AnalysisOutcome {
        match self {
            Self::Available(linter) => {
                if !linter.supports(path) {
                    return AnalysisOutcome::Skipped;
                }
                match linter.run(path) {
                    Ok(output) => AnalysisOutcome::Output(output),
                    Err(e) => {
                        warn!("Static analysis failed for {}: {}", path.display(), e);
                        AnalysisOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Self::Unavailable { program, reason } => AnalysisOutcome::Failed {
                reason: format!("Static analyzer '{program}' unavailable: {reason}"),
            },
        }
    }
}
