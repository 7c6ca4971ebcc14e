use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the llm-docgen library.
///
/// Per-file failures (decoding, transport, analyzer launch) are recovered
/// inside the pipeline and never surface from [`crate::run`]; only
/// configuration and serialization errors are fatal.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Invalid UTF-8 encountered in file.
    #[error("Invalid UTF-8 encoding in file '{path}'")]
    InvalidUtf8 {
        /// Path to file with encoding issues
        path: PathBuf,
    },

    /// Network failure talking to the inference endpoint.
    #[error("Request to '{url}' failed: {message}")]
    Transport {
        /// Endpoint URL
        url: String,
        /// Error message
        message: String,
        /// Whether another attempt may succeed
        retryable: bool,
    },

    /// External analyzer could not be launched.
    #[error("Failed to launch analyzer '{program}': {message}")]
    AnalyzerLaunch {
        /// Program that failed to start
        program: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: tera::Error) -> Self {
        Self::Template {
            template: template.into(),
            message: source.to_string(),
        }
    }

    /// Creates an invalid UTF-8 error.
    #[must_use]
    pub fn invalid_utf8(path: impl Into<PathBuf>) -> Self {
        Self::InvalidUtf8 { path: path.into() }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Creates an analyzer launch error.
    #[must_use]
    pub fn analyzer(program: impl Into<String>, source: &std::io::Error) -> Self {
        Self::AnalyzerLaunch {
            program: program.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if a failed request is worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { retryable: true, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(ToString::to_string).unwrap_or_default();
        let retryable = e.is_connect()
            || e.is_timeout()
            || e.is_body()
            || e.status().is_some_and(|s| s.is_server_error());
        Self::Transport {
            url,
            message: e.to_string(),
            retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_transport_retryable() {
        let err = Error::transport("http://localhost:11434", "connection refused", true);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("localhost:11434"));

        let err = Error::transport("http://localhost:11434", "HTTP 404", false);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_analyzer_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let err = Error::analyzer("pylint", &io_err);
        assert!(err.to_string().contains("pylint"));
        assert!(err.to_string().contains("No such file"));
    }
}
