use crate::error::{Error, Result};
use crate::preset::{ReportKind, CODE_PLACEHOLDER};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_WORKERS: usize = 10;
const DEFAULT_EXTENSION: &str = "py";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);
const DEFAULT_LINTER: &str = "pylint";
const MAX_TEMPERATURE: f32 = 2.0;

/// Output format for the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, one page per section separated by form feeds
    Text,
    /// Markdown with one heading per section
    Markdown,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
        }
    }

    /// Returns the template name for this format.
    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

/// Order of sections in the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOrder {
    /// Same order the files were discovered in (sorted by path)
    Discovery,
    /// Order in which workers finished the files
    Completion,
}

/// Settings for the inference endpoint.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InferenceConfig {
    /// Generation endpoint URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output size requested from the model
    pub max_tokens: u32,

    /// Prompt template containing `{code}`
    pub prompt_template: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further retry
    pub retry_backoff: Duration,
}

impl InferenceConfig {
    /// Creates inference settings from the defaults of a report kind.
    #[must_use]
    pub fn for_kind(kind: ReportKind) -> Self {
        let preset = kind.preset();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: preset.model,
            temperature: preset.temperature,
            max_tokens: preset.max_tokens,
            prompt_template: preset.prompt_template,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::for_kind(ReportKind::Debug)
    }
}

/// Settings for the external static analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterConfig {
    /// Program to run with the file path as its only argument
    pub program: String,

    /// Extensions the program understands (without leading dot)
    pub extensions: Vec<String>,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_LINTER.to_string(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
        }
    }
}

/// Configuration for the llm-docgen pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to scan for files
    pub root_dir: PathBuf,

    /// Path of the generated document
    pub output_path: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Kind of report to generate
    pub kind: ReportKind,

    /// File extensions to process (without leading dot)
    pub extensions: Vec<String>,

    /// Number of concurrent workers
    pub workers: usize,

    /// Inference endpoint settings
    pub inference: InferenceConfig,

    /// Static analyzer, `None` when analysis is disabled
    pub linter: Option<LinterConfig>,

    /// Order of sections in the document
    pub section_order: SectionOrder,

    /// Whether to draw a progress bar
    pub show_progress: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use llm_docgen::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir("./src")
    ///     .workers(4)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or can't be read
    /// - Output location is not writable
    /// - Worker count, extensions or generation parameters are invalid
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        fs::read_dir(&self.root_dir).map_err(|e| {
            Error::config(format!(
                "Root directory is not readable: {}: {e}",
                self.root_dir.display()
            ))
        })?;

        validate_output_path(&self.output_path)?;

        if self.workers == 0 {
            return Err(Error::config("workers must be greater than 0"));
        }

        if self.extensions.is_empty() {
            return Err(Error::config("at least one file extension is required"));
        }

        if !(0.0..=MAX_TEMPERATURE).contains(&self.inference.temperature) {
            return Err(Error::config(format!(
                "temperature ({}) must be between 0.0 and {MAX_TEMPERATURE}",
                self.inference.temperature
            )));
        }

        if self.inference.max_tokens == 0 {
            return Err(Error::config("max_tokens must be greater than 0"));
        }

        if !self.inference.prompt_template.contains(CODE_PLACEHOLDER) {
            return Err(Error::config(format!(
                "prompt template must contain the {CODE_PLACEHOLDER} placeholder"
            )));
        }

        if self.inference.endpoint.is_empty() {
            return Err(Error::config("endpoint must not be empty"));
        }

        if let Some(ref linter) = self.linter {
            if linter.program.trim().is_empty() {
                return Err(Error::config("linter program must not be empty"));
            }
        }

        Ok(())
    }

    /// Returns true if the file name matches the extension allow-list.
    #[must_use]
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

fn validate_output_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(Error::config(format!(
            "Output path is a directory: {}",
            path.display()
        )));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let metadata = fs::metadata(parent).map_err(|e| {
        Error::config(format!(
            "Output directory does not exist: {}: {e}",
            parent.display()
        ))
    })?;

    if !metadata.is_dir() {
        return Err(Error::config(format!(
            "Output parent is not a directory: {}",
            parent.display()
        )));
    }

    if metadata.permissions().readonly() {
        return Err(Error::config(format!(
            "Output directory is not writable: {}",
            parent.display()
        )));
    }

    Ok(())
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    format: Option<OutputFormat>,
    kind: Option<ReportKind>,
    extensions: Option<Vec<String>>,
    workers: Option<usize>,
    endpoint: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    prompt_template: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff: Option<Duration>,
    linter: Option<LinterConfig>,
    section_order: Option<SectionOrder>,
    show_progress: Option<bool>,
}

impl ConfigBuilder {
    /// Sets the root directory to scan.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the path of the generated document.
    ///
    /// Defaults to `<root>/<report stem>.<format extension>`.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the report kind, which provides model defaults and the prompt.
    #[must_use]
    pub fn kind(mut self, kind: ReportKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the extension allow-list. A leading dot is accepted.
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        );
        self
    }

    /// Sets the number of concurrent workers.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the generation endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Overrides the model of the report kind.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the temperature of the report kind.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Overrides the maximum output size of the report kind.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Overrides the prompt template. Must contain `{code}`.
    #[must_use]
    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times a failed request is retried.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the initial retry delay.
    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    /// Enables static analysis with the given linter.
    #[must_use]
    pub fn linter(mut self, linter: LinterConfig) -> Self {
        self.linter = Some(linter);
        self
    }

    /// Sets the section order.
    #[must_use]
    pub fn section_order(mut self, order: SectionOrder) -> Self {
        self.section_order = Some(order);
        self
    }

    /// Enables or disables the progress bar.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = Some(enabled);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let kind = self.kind.unwrap_or(ReportKind::Debug);
        let format = self.format.unwrap_or(OutputFormat::Text);
        let root_dir = self.root_dir.unwrap_or_else(|| PathBuf::from("."));

        let output_path = self.output_path.unwrap_or_else(|| {
            root_dir.join(format!("{}.{}", kind.preset().output_stem, format.extension()))
        });

        let mut inference = InferenceConfig::for_kind(kind);
        if let Some(endpoint) = self.endpoint {
            inference.endpoint = endpoint;
        }
        if let Some(model) = self.model {
            inference.model = model;
        }
        if let Some(temperature) = self.temperature {
            inference.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            inference.max_tokens = max_tokens;
        }
        if let Some(template) = self.prompt_template {
            inference.prompt_template = template;
        }
        inference.timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        inference.max_retries = self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        inference.retry_backoff = self.retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF);

        let config = Config {
            root_dir,
            output_path,
            format,
            kind,
            extensions: self
                .extensions
                .unwrap_or_else(|| vec![DEFAULT_EXTENSION.to_string()]),
            workers: self.workers.unwrap_or(DEFAULT_WORKERS),
            inference,
            linter: self.linter,
            section_order: self.section_order.unwrap_or(SectionOrder::Discovery),
            show_progress: self.show_progress.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder().root_dir(temp.path()).build().unwrap();

        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.kind, ReportKind::Debug);
        assert_eq!(config.extensions, vec!["py".to_string()]);
        assert_eq!(config.inference.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.section_order, SectionOrder::Discovery);
        assert!(config.linter.is_none());
        assert_eq!(config.output_path, temp.path().join("debug_report.txt"));
    }

    #[test]
    fn test_kind_sets_model_defaults() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .kind(ReportKind::Documentation)
            .format(OutputFormat::Markdown)
            .build()
            .unwrap();

        assert_eq!(config.inference.model, "llama3:8b");
        assert_eq!(config.inference.max_tokens, 1500);
        assert_eq!(
            config.output_path,
            temp.path().join("repository_documentation.md")
        );
    }

    #[test]
    fn test_overrides_win_over_kind() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .model("codellama")
            .temperature(0.0)
            .max_tokens(42)
            .build()
            .unwrap();

        assert_eq!(config.inference.model, "codellama");
        assert_eq!(config.inference.max_tokens, 42);
    }

    #[test]
    fn test_invalid_root_dir() {
        let result = Config::builder()
            .root_dir("/nonexistent/path/that/should/not/exist")
            .build();

        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_root_is_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("a.py");
        file.write_str("x = 1").unwrap();

        let result = Config::builder().root_dir(file.path()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_output_parent_missing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .output_path(temp.path().join("missing/dir/report.txt"))
            .build();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Output directory does not exist"));
    }

    #[test]
    fn test_output_is_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .output_path(temp.path())
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder().root_dir(temp.path()).workers(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .temperature(3.5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_prompt_template_requires_placeholder() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .prompt_template("Explain this code")
            .build();
        assert!(result.unwrap_err().to_string().contains("{code}"));
    }

    #[test]
    fn test_extensions_normalized() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .extensions([".py", "rs", " "])
            .build()
            .unwrap();

        assert_eq!(config.extensions, vec!["py".to_string(), "rs".to_string()]);
        assert!(config.matches_extension(Path::new("src/main.rs")));
        assert!(config.matches_extension(Path::new("a/b.py")));
        assert!(!config.matches_extension(Path::new("a/b.pyc")));
        assert!(!config.matches_extension(Path::new("Makefile")));
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .extensions(Vec::<String>::new())
            .build();
        assert!(result.is_err());
    }
}
