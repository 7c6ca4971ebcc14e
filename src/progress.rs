//! Console progress bar driven by the worker pool's completion counter.

use crate::pool::Progress;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Progress bar showing completed files out of the total.
pub(crate) struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Creates a bar for `total` files, or a hidden one when disabled.
    pub(crate) fn new(total: usize, enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} Processing files [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);

        Self { bar }
    }

    /// Records one completed file.
    pub(crate) fn update(&self, progress: Progress, path: &Path) {
        self.bar.set_position(progress.completed as u64);
        if let Some(name) = path.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finishes the bar with a final message.
    pub(crate) fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
