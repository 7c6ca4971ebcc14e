//! Streaming client for the local generation endpoint.
//!
//! The endpoint answers with newline-delimited JSON: every line is an
//! independent object whose `response` field carries the next fragment of
//! model output. Fragments are concatenated in arrival order.

use crate::config::InferenceConfig;
use crate::error::{Error, Result};
use crate::file::INFERENCE_FAILURE;
use crate::preset::CODE_PLACEHOLDER;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Produces natural-language output for a file's contents.
///
/// Implementations must never fail: transport problems are reported through
/// the returned text so a single file cannot abort the run.
pub trait Generator: Send + Sync {
    /// Generates text for the given source code.
    fn generate(&self, source: &str) -> String;
}

/// Body of a generation request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InferenceRequest {
    /// Model identifier
    pub model: String,
    /// Prompt with the file contents embedded
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output size
    pub max_tokens: u32,
    /// Always true, the response is read as a stream
    pub stream: bool,
}

impl InferenceRequest {
    /// Builds a request for one file from the inference settings.
    #[must_use]
    pub fn new(config: &InferenceConfig, source: &str) -> Self {
        Self {
            model: config.model.clone(),
            prompt: config.prompt_template.replace(CODE_PLACEHOLDER, source),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: true,
        }
    }
}

/// Blocking HTTP client for the generation endpoint.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: Client,
    config: InferenceConfig,
}

impl InferenceClient {
    /// Creates a client with the configured per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Sends one request and accumulates the streamed response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on connection failures, timeouts,
    /// non-success statuses and body read errors.
    pub fn send(&self, request: &InferenceRequest) -> Result<String> {
        let url = &self.config.endpoint;

        let response = self.http.post(url).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(
                url,
                format!("HTTP {status}"),
                status.is_server_error(),
            ));
        }

        accumulate_stream(BufReader::new(response))
            .map_err(|e| Error::transport(url, format!("Failed to read response: {e}"), true))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Generator for InferenceClient {
    fn generate(&self, source: &str) -> String {
        let request = InferenceRequest::new(&self.config, source);
        let mut attempt = 0;

        loop {
            match self.send(&request) {
                Ok(text) => {
                    debug!("Received {} bytes from model", text.len());
                    return text;
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        "Request failed ({}), retry {}/{} in {:?}",
                        e, attempt, self.config.max_retries, delay
                    );
                    thread::sleep(delay);
                }
                Err(e) => {
                    warn!("Error making request to {}: {}", self.config.endpoint, e);
                    return INFERENCE_FAILURE.to_string();
                }
            }
        }
    }
}

/// Reads newline-delimited JSON and concatenates every `response` fragment.
///
/// Blank lines are ignored and lines that are not valid JSON are skipped.
/// The result is trimmed.
///
/// # Errors
///
/// Returns an error only if the underlying reader fails.
pub fn accumulate_stream<R: BufRead>(reader: R) -> std::io::Result<String> {
    let mut full_response = String::new();

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => {
                if let Some(fragment) = value.get("response").and_then(Value::as_str) {
                    full_response.push_str(fragment);
                } else if let Some(error) = value.get("error").and_then(Value::as_str) {
                    warn!("Model reported an error: {}", error);
                } else {
                    trace!("Ignoring stream object without response: {}", line);
                }
            }
            Err(_) => warn!("Skipping invalid JSON line: {}", line),
        }
    }

    Ok(full_response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_accumulates_in_order() {
        let body = "{\"response\":\"Hello\"}\n{\"response\":\", world\"}\n";
        let text = accumulate_stream(Cursor::new(body)).unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[test]
    fn test_skips_malformed_lines() {
        let body = "{\"response\": \"broken\n{\"response\":\"ok\"}\n";
        let text = accumulate_stream(Cursor::new(body)).unwrap();
        assert_eq!(text, "ok");
    }

    #[test]
    fn test_trims_and_ignores_blank_lines() {
        let body = "\n{\"response\":\"  padded\"}\n\n{\"response\":\" text \\n\"}\n{\"done\":true}";
        let text = accumulate_stream(Cursor::new(body)).unwrap();
        assert_eq!(text, "padded text");
    }

    #[test]
    fn test_ignores_non_string_response() {
        let body = "{\"response\":42}\n[1,2]\n{\"response\":\"a\"}\n";
        let text = accumulate_stream(Cursor::new(body)).unwrap();
        assert_eq!(text, "a");
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut body = b"{\"response\":\"x\"}\n".to_vec();
        body.extend_from_slice(&[0xFF, 0xFE, b'\n']);
        body.extend_from_slice(b"{\"response\":\"y\"}\n");

        let text = accumulate_stream(Cursor::new(body)).unwrap();
        assert_eq!(text, "xy");
    }

    #[test]
    fn test_empty_stream() {
        let text = accumulate_stream(Cursor::new("")).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_request_serialization() {
        let config = InferenceConfig::default();
        let request = InferenceRequest::new(&config, "x = 1");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "mistral:7b-instruct-v0.3-fp16");
        assert_eq!(json["max_tokens"], 8000);
        assert_eq!(json["stream"], true);
        assert!(json["prompt"].as_str().unwrap().contains("x = 1"));
    }

    #[test]
    fn test_backoff_doubles() {
        let mut config = InferenceConfig::default();
        config.retry_backoff = Duration::from_millis(100);
        let client = InferenceClient::new(config).unwrap();

        assert_eq!(client.backoff(0), Duration::from_millis(100));
        assert_eq!(client.backoff(1), Duration::from_millis(200));
        assert_eq!(client.backoff(2), Duration::from_millis(400));
    }
}
