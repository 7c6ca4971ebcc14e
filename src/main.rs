use anyhow::Context;
use clap::Parser;
use llm_docgen::{Config, LinterConfig, OutputFormat, Pipeline, ReportKind, SectionOrder};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "llm-docgen",
    version,
    author,
    about = "Generate per-file debug reports or documentation with a local LLM",
    long_about = "Walk a source tree, send every matching file to a local model-serving \
    endpoint (Ollama-compatible /api/generate) and collect the answers into one \
    paginated document, one section per file.\n\n\
    USAGE EXAMPLES:\n  \
      # Debug report for every Python file in the current directory\n  \
      llm-docgen\n\n  \
      # Documentation for a Rust project, written as Markdown\n  \
      llm-docgen --dir ./my-project --ext rs --kind documentation --format markdown\n\n  \
      # Include pylint output in every section\n  \
      llm-docgen --dir ./src --analyze --linter pylint"
)]
struct Cli {
    /// Root directory to scan for source files
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    dir: PathBuf,

    /// Output document path [default: <dir>/<report>.<ext>]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Kind of report to generate
    #[arg(short, long, value_enum, default_value = "debug")]
    kind: CliKind,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: CliFormat,

    /// File extensions to process (repeatable)
    #[arg(short, long = "ext", value_name = "EXT", default_value = "py")]
    extensions: Vec<String>,

    /// Number of files processed concurrently
    #[arg(short, long, default_value_t = 10)]
    workers: usize,

    /// Generation endpoint
    #[arg(
        long,
        env = "LLM_DOCGEN_ENDPOINT",
        default_value = "http://localhost:11434/api/generate"
    )]
    endpoint: String,

    /// Model name [default: depends on --kind]
    #[arg(short, long, env = "LLM_DOCGEN_MODEL")]
    model: Option<String>,

    /// Sampling temperature [default: depends on --kind]
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum output size per file [default: depends on --kind]
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 300, value_name = "SECS")]
    timeout: u64,

    /// Retries for failed requests
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Run a static analyzer over every file
    #[arg(short, long)]
    analyze: bool,

    /// Static analyzer program (used with --analyze)
    #[arg(long, default_value = "pylint", value_name = "PROGRAM")]
    linter: String,

    /// Extensions the analyzer understands (used with --analyze)
    #[arg(long = "linter-ext", value_name = "EXT", default_value = "py")]
    linter_extensions: Vec<String>,

    /// Section order in the document
    #[arg(long, value_enum, default_value = "discovery")]
    order: CliOrder,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliKind {
    /// Structured debug report
    Debug,
    /// Documentation and commentary
    Documentation,
}

impl From<CliKind> for ReportKind {
    fn from(k: CliKind) -> Self {
        match k {
            CliKind::Debug => Self::Debug,
            CliKind::Documentation => Self::Documentation,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    Text,
    Markdown,
}

impl From<CliFormat> for OutputFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Text => Self::Text,
            CliFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOrder {
    /// Sorted by path
    Discovery,
    /// As workers finish
    Completion,
}

impl From<CliOrder> for SectionOrder {
    fn from(o: CliOrder) -> Self {
        match o {
            CliOrder::Discovery => Self::Discovery,
            CliOrder::Completion => Self::Completion,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = Config::builder()
        .root_dir(cli.dir)
        .kind(cli.kind.into())
        .format(cli.format.into())
        .extensions(cli.extensions)
        .workers(cli.workers)
        .endpoint(cli.endpoint)
        .timeout(Duration::from_secs(cli.timeout))
        .max_retries(cli.retries)
        .section_order(cli.order.into())
        .show_progress(!cli.quiet);

    if let Some(output) = cli.output {
        builder = builder.output_path(output);
    }

    if let Some(model) = cli.model {
        builder = builder.model(model);
    }

    if let Some(temperature) = cli.temperature {
        builder = builder.temperature(temperature);
    }

    if let Some(max_tokens) = cli.max_tokens {
        builder = builder.max_tokens(max_tokens);
    }

    if cli.analyze {
        builder = builder.linter(LinterConfig {
            program: cli.linter,
            extensions: cli
                .linter_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
        });
    }

    let config = builder.build().context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Pipeline execution failed")?;

    if !cli.quiet {
        stats.print_summary();
    }
    println!("Report generated: {}", stats.output_path.display());

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("llm_docgen=info"),
        1 => EnvFilter::new("llm_docgen=debug"),
        _ => EnvFilter::new("llm_docgen=trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
