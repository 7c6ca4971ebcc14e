use crate::{
    analyzer::Analyzer,
    client::{Generator, InferenceClient},
    config::{Config, SectionOrder},
    error::Result,
    file::FileReport,
    pool::WorkerPool,
    processor::FileProcessor,
    progress::ProgressReporter,
    report::Document,
    scanner::Scanner,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Files discovered
    pub total_files: usize,

    /// Files read and sent to the model successfully
    pub succeeded: usize,

    /// Files that could not be read as text
    pub unreadable_files: usize,

    /// Files whose inference fell back to the failure sentinel
    pub inference_failures: usize,

    /// Files whose static analysis could not run
    pub analysis_failures: usize,

    /// Files whose processing was aborted by a worker panic
    pub aborted_files: usize,

    /// Sections written to the document
    pub sections: usize,

    /// Size of the document in bytes
    pub bytes_written: usize,

    /// Total execution time
    pub duration: Duration,

    /// Time spent processing files
    pub process_duration: Duration,

    /// Path of the generated document
    pub output_path: PathBuf,
}

impl PipelineStats {
    fn tally(reports: &[FileReport]) -> Tally {
        let processed = |r: &&FileReport| !r.is_unreadable() && !r.is_aborted();
        Tally {
            succeeded: reports
                .iter()
                .filter(processed)
                .filter(|r| !r.inference_failed())
                .count(),
            unreadable: reports.iter().filter(|r| r.is_unreadable()).count(),
            inference_failures: reports.iter().filter(|r| r.inference_failed()).count(),
            analysis_failures: reports
                .iter()
                .filter(processed)
                .filter(|r| r.analysis.is_failed())
                .count(),
            aborted: reports.iter().filter(|r| r.is_aborted()).count(),
        }
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║               Report Generation Summary               ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Files Discovered:     {:>8}                        ║",
            self.total_files
        );
        println!(
            "║   - Succeeded:        {:>8}                        ║",
            self.succeeded
        );
        println!(
            "║   - Unreadable:       {:>8}                        ║",
            self.unreadable_files
        );
        println!(
            "║   - Inference failed: {:>8}                        ║",
            self.inference_failures
        );
        println!(
            "║   - Analysis failed:  {:>8}                        ║",
            self.analysis_failures
        );
        println!(
            "║   - Aborted:          {:>8}                        ║",
            self.aborted_files
        );
        println!("║                                                       ║");
        println!(
            "║ Sections Written:     {:>8}                        ║",
            self.sections
        );
        println!(
            "║ Processing Time:      {:>8.2}s                       ║",
            self.process_duration.as_secs_f64()
        );
        println!(
            "║ Total Time:           {:>8.2}s                       ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }

    /// Returns the throughput in files per second.
    #[must_use]
    pub fn throughput_files_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_files as f64 / secs
        } else {
            0.0
        }
    }
}

struct Tally {
    succeeded: usize,
    unreadable: usize,
    inference_failures: usize,
    analysis_failures: usize,
    aborted: usize,
}

/// Orchestrates discovery, per-file processing and document assembly.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    processor: FileProcessor,
    pool: WorkerPool,
}

impl Pipeline {
    /// Creates a pipeline that talks to the configured inference endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        let client = InferenceClient::new(config.inference.clone())?;
        Self::with_generator(config, Arc::new(client))
    }

    /// Creates a pipeline with a custom text generator.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_generator(config: Config, generator: Arc<dyn Generator>) -> Result<Self> {
        config.validate()?;

        let analyzer = config
            .linter
            .as_ref()
            .map(|linter| Arc::new(Analyzer::detect(linter)));

        Ok(Self {
            scanner: Scanner::new(&config),
            processor: FileProcessor::new(generator, analyzer),
            pool: WorkerPool::new(config.workers),
            config,
        })
    }

    /// Executes the complete pipeline and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Scan**: Discovers matching files under the root directory
    /// 2. **Process**: Runs every file through the worker pool
    /// 3. **Assemble**: Builds one section per file and writes the document
    ///
    /// # Errors
    ///
    /// Only fails if the document cannot be written. Per-file failures are
    /// recorded in the document.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use llm_docgen::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./src")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run()?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        info!("Stage 1/3: Scanning repository...");
        let files = self.scanner.scan();
        let total_files = files.len();
        info!("✓ Found {} files", total_files);

        info!(
            "Stage 2/3: Processing files with {} workers...",
            self.pool.workers()
        );
        let process_start = Instant::now();
        let reports = self.process(files);
        let process_duration = process_start.elapsed();

        if reports.len() != total_files {
            warn!(
                "Expected {} reports but received {}",
                total_files,
                reports.len()
            );
        }
        info!(
            "✓ Processed {} files in {:.2}s",
            reports.len(),
            process_duration.as_secs_f64()
        );

        info!("Stage 3/3: Writing document...");
        let tally = PipelineStats::tally(&reports);

        let mut document = Document::new(self.config.kind.preset().document_title, self.config.format);
        for report in &reports {
            document.add_section(&report.title(), &report.body());
        }
        let finalized = document.serialize(&self.config.output_path)?;

        let stats = PipelineStats {
            total_files,
            succeeded: tally.succeeded,
            unreadable_files: tally.unreadable,
            inference_failures: tally.inference_failures,
            analysis_failures: tally.analysis_failures,
            aborted_files: tally.aborted,
            sections: finalized.sections,
            bytes_written: finalized.bytes,
            duration: start_time.elapsed(),
            process_duration,
            output_path: finalized.path,
        };

        info!(
            "✓ Pipeline completed in {:.2}s",
            stats.duration.as_secs_f64()
        );

        Ok(stats)
    }

    /// Runs every file through the pool and returns the reports in the
    /// configured section order.
    fn process(&self, files: Vec<PathBuf>) -> Vec<FileReport> {
        let reporter = ProgressReporter::new(files.len(), self.config.show_progress);
        let mut reports = Vec::with_capacity(files.len());

        self.pool.run(files, &self.processor, |report, progress| {
            debug!(
                "Completed {}/{}: {}",
                progress.completed,
                progress.total,
                report.path.display()
            );
            reporter.update(progress, &report.path);
            reports.push(report);
        });
        reporter.finish("done");

        if self.config.section_order == SectionOrder::Discovery {
            reports.sort_by_key(|r| r.index);
        }

        reports
    }
}
