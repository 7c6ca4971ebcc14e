//! # llm-docgen
//!
//! Walks a source tree, asks a locally hosted language model for a debug
//! report or documentation of every file, optionally runs a linter over each
//! file, and assembles everything into a single paginated document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use llm_docgen::{Config, Pipeline, ReportKind};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./my-project")
//!     .kind(ReportKind::Documentation)
//!     .extensions(["py", "rs"])
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Scanner**: Discovers files matching the extension allow-list
//! 2. **Worker pool**: Runs the file processor on a fixed number of threads
//! 3. **File processor**: Reads a file, queries the model, runs the linter
//! 4. **Document**: Collects one section per file and writes it atomically

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod analyzer;
mod client;
mod config;
mod error;
mod file;
mod pipeline;
mod pool;
mod processor;
mod progress;
mod report;
mod scanner;
mod template;
mod writer;

pub mod preset;

pub use analyzer::{AnalysisOutcome, Analyzer, ExternalLinter};
pub use client::{accumulate_stream, Generator, InferenceClient, InferenceRequest};
pub use config::{Config, ConfigBuilder, InferenceConfig, LinterConfig, OutputFormat, SectionOrder};
pub use error::{Error, Result};
pub use file::{FileReport, SourceText, DECODE_ERROR_MARKER, INFERENCE_FAILURE};
pub use pipeline::{Pipeline, PipelineStats};
pub use pool::{Progress, WorkerPool};
pub use preset::{ReportKind, ReportPreset};
pub use processor::FileProcessor;
pub use report::{sanitize_latin1, Document, FinalizedDocument, Section, REPLACEMENT_CHAR};

/// Runs the complete pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be created, or the document cannot be written.
///
/// # Examples
///
/// ```no_run
/// use llm_docgen::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<PipelineStats> {
    Pipeline::new(config)?.run()
}
