use crate::config::Config;
use crate::writer::Writer;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone)]
struct ScanStats {
    /// Files matching the extension filter
    matched_files: usize,

    /// Files rejected by the extension filter
    skipped_files: usize,

    /// Entries that could not be read
    errors: usize,

    /// Previous output artifacts found under the root
    excluded: usize,
}

/// Discovers source files under the root directory.
pub(crate) struct Scanner {
    config: Config,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Walks the root directory and returns every file matching the
    /// extension allow-list, sorted by path.
    ///
    /// Unreadable directories and entries are logged and skipped. Symlinked
    /// files are reported but symlinked directories are not descended into.
    /// The output document and its temporary sibling are never returned.
    pub(crate) fn scan(&self) -> Vec<PathBuf> {
        let root = &self.config.root_dir;
        let artifacts = output_artifacts(&self.config.output_path);
        let mut stats = ScanStats::default();
        let mut files = Vec::new();

        debug!("Starting scan of {}", root.display());

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };

            let path = entry.path();
            let is_file =
                entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());
            if !is_file {
                continue;
            }

            if is_artifact(path, &artifacts) {
                debug!("Skipping output artifact {}", path.display());
                stats.excluded += 1;
                continue;
            }

            if self.config.matches_extension(path) {
                trace!("Discovered {}", path.display());
                stats.matched_files += 1;
                files.push(entry.into_path());
            } else {
                stats.skipped_files += 1;
            }
        }

        files.sort();

        debug!(
            "Scan complete: {} matched, {} skipped, {} excluded, {} errors",
            stats.matched_files, stats.skipped_files, stats.excluded, stats.errors
        );

        if files.is_empty() {
            warn!(
                "No files with extensions {:?} found in {}",
                self.config.extensions,
                root.display()
            );
        }

        files
    }
}

/// The output document and its temporary sibling, with canonical parents
/// so they match however the root was spelled.
fn output_artifacts(output: &Path) -> Vec<PathBuf> {
    let mut paths = vec![output.to_path_buf()];
    if let Ok(temp) = Writer::temp_path(output) {
        paths.push(temp);
    }

    paths
        .into_iter()
        .map(|p| canonical_location(&p).unwrap_or(p))
        .collect()
}

fn is_artifact(path: &Path, artifacts: &[PathBuf]) -> bool {
    let named_like_artifact = artifacts
        .iter()
        .any(|a| a.file_name().is_some() && a.file_name() == path.file_name());
    if !named_like_artifact {
        return false;
    }

    let location = canonical_location(path).unwrap_or_else(|| path.to_path_buf());
    artifacts.contains(&location)
}

fn canonical_location(path: &Path) -> Option<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(parent.canonicalize().ok()?.join(path.file_name()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::path::Path;

    fn create_test_config(root: &Path) -> Config {
        Config::builder().root_dir(root).build().unwrap()
    }

    #[test]
    fn test_scanner_finds_matching_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("print('a')").unwrap();
        temp.child("b.py").write_str("print('b')").unwrap();
        temp.child("c.rs").write_str("fn main() {}").unwrap();

        let config = create_test_config(temp.path());
        let files = Scanner::new(&config).scan();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "py"));
    }

    #[test]
    fn test_scanner_nested_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("pkg/__init__.py").write_str("").unwrap();
        temp.child("pkg/sub/mod.py").write_str("x = 1").unwrap();
        temp.child("tests/test_mod.py").write_str("def test(): pass").unwrap();

        let config = create_test_config(temp.path());
        let files = Scanner::new(&config).scan();

        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_scanner_sorted_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("z.py").write_str("").unwrap();
        temp.child("a.py").write_str("").unwrap();
        temp.child("m/b.py").write_str("").unwrap();

        let config = create_test_config(temp.path());
        let files = Scanner::new(&config).scan();

        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_scanner_multiple_extensions() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("").unwrap();
        temp.child("b.rs").write_str("").unwrap();
        temp.child("c.txt").write_str("").unwrap();

        let config = Config::builder()
            .root_dir(temp.path())
            .extensions(["py", "rs"])
            .build()
            .unwrap();
        let files = Scanner::new(&config).scan();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_scanner_empty_directory() {
        let temp = assert_fs::TempDir::new().unwrap();

        let config = create_test_config(temp.path());
        let files = Scanner::new(&config).scan();

        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scanner_follows_symlinked_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        let outside = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("x = 1").unwrap();
        outside.child("target.py").write_str("y = 2").unwrap();
        std::os::unix::fs::symlink(outside.child("target.py").path(), temp.child("linked.py").path())
            .unwrap();

        let config = create_test_config(temp.path());
        let files = Scanner::new(&config).scan();

        assert_eq!(files.len(), 2);
        assert!(files.contains(&temp.child("linked.py").path().to_path_buf()));
    }

    #[cfg(unix)]
    #[test]
    fn test_scanner_skips_symlinked_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        let outside = assert_fs::TempDir::new().unwrap();
        outside.child("pkg/mod.py").write_str("z = 3").unwrap();
        std::os::unix::fs::symlink(outside.child("pkg").path(), temp.child("pkg").path()).unwrap();

        let config = create_test_config(temp.path());
        let files = Scanner::new(&config).scan();

        assert!(files.is_empty());
    }

    #[test]
    fn test_scanner_excludes_output_artifacts() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("notes.txt").write_str("input").unwrap();
        temp.child("report.txt").write_str("previous run").unwrap();
        temp.child(".report.txt.tmp").write_str("interrupted run").unwrap();

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(temp.path().join("report.txt"))
            .extensions(["txt", "tmp"])
            .build()
            .unwrap();
        let files = Scanner::new(&config).scan();

        assert_eq!(files, vec![temp.child("notes.txt").path().to_path_buf()]);
    }
}
