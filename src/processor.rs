use crate::{
    analyzer::{AnalysisOutcome, Analyzer},
    client::Generator,
    file::{FileReport, SourceText},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{trace, warn};

/// Turns one source file into a [`FileReport`].
///
/// Holds only shared read-only collaborators, so one instance can be used
/// from every worker at once.
#[derive(Clone)]
pub struct FileProcessor {
    generator: Arc<dyn Generator>,
    analyzer: Option<Arc<Analyzer>>,
}

impl FileProcessor {
    /// Creates a processor. Pass `None` to disable static analysis.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, analyzer: Option<Arc<Analyzer>>) -> Self {
        Self {
            generator,
            analyzer,
        }
    }

    /// Reads, analyzes and describes one file.
    ///
    /// Never fails. Unreadable files produce a placeholder report and are
    /// not sent to the model.
    #[must_use]
    pub fn process(&self, path: PathBuf, index: usize) -> FileReport {
        trace!("Processing {}", path.display());

        let text = match SourceText::read(&path) {
            SourceText::Text(text) => text,
            SourceText::Unreadable { marker } | SourceText::Aborted { marker } => {
                warn!("Error reading file {}: {}", path.display(), marker);
                return FileReport::unreadable(path, index, &marker);
            }
        };

        let analysis = self
            .analyzer
            .as_ref()
            .map_or(AnalysisOutcome::Skipped, |analyzer| analyzer.analyze(&path));

        let inference = self.generator.generate(&text);

        FileReport {
            path,
            index,
            inference,
            analysis,
            source: SourceText::Text(text),
        }
    }
}

impl std::fmt::Debug for FileProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileProcessor")
            .field("analyzer", &self.analyzer)
            .finish_non_exhaustive()
    }
}
