//! Fixed-size worker pool.
//!
//! Every discovered path is queued up front on a job channel. Workers pull
//! jobs, run the [`FileProcessor`] and push reports onto a result channel
//! that the calling thread drains, so reports arrive in completion order.

use crate::{file::FileReport, processor::FileProcessor};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread;
use tracing::{debug, error};

/// Marker used when processing a file panicked.
pub(crate) const WORKER_PANIC_MARKER: &str = "Error processing file: worker panicked";

/// Completed units out of the total submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Reports received so far
    pub completed: usize,
    /// Units submitted
    pub total: usize,
}

struct Job {
    index: usize,
    path: PathBuf,
}

/// Runs file processing on a fixed number of threads.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool with the given concurrency ceiling (at least 1).
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Returns the concurrency ceiling.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Processes every path and hands each report to `on_result` on the
    /// calling thread as soon as it completes.
    ///
    /// Every path yields exactly one report, including when processing
    /// panics. Returns once all workers have exited, with the number of
    /// reports delivered.
    pub fn run<F>(&self, paths: Vec<PathBuf>, processor: &FileProcessor, mut on_result: F) -> usize
    where
        F: FnMut(FileReport, Progress),
    {
        let total = paths.len();
        if total == 0 {
            return 0;
        }

        let (job_tx, job_rx) = unbounded::<Job>();
        let (result_tx, result_rx) = unbounded::<FileReport>();

        for (index, path) in paths.into_iter().enumerate() {
            // The receiver is still held here, so the send cannot fail.
            let _ = job_tx.send(Job { index, path });
        }
        drop(job_tx);

        let workers = self.workers.min(total);
        debug!("Starting {} workers for {} files", workers, total);

        thread::scope(|scope| {
            for id in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move || worker_loop(id, &jobs, &results, processor));
            }
            drop(result_tx);

            let mut completed = 0;
            for report in &result_rx {
                completed += 1;
                on_result(report, Progress { completed, total });
            }
            completed
        })
    }
}

fn worker_loop(
    id: usize,
    jobs: &Receiver<Job>,
    results: &Sender<FileReport>,
    processor: &FileProcessor,
) {
    for Job { index, path } in jobs {
        let fallback_path = path.clone();
        let report = panic::catch_unwind(AssertUnwindSafe(|| processor.process(path, index)))
            .unwrap_or_else(|_| {
                error!(
                    "Worker {} panicked while processing {}",
                    id,
                    fallback_path.display()
                );
                FileReport::aborted(fallback_path, index, WORKER_PANIC_MARKER)
            });

        if results.send(report).is_err() {
            break;
        }
    }
    debug!("Worker {} finished", id);
}
