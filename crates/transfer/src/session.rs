//! Batch staging and execution.

use futures_util::future::join_all;
use qsfm_protocol::RemotePath;
use tracing::{debug, info};

use crate::policy::{RejectReason, Rejection, UploadPolicy};
use crate::source::LocalFile;
use crate::types::UploadTask;
use crate::uploader::ChunkUploader;

/// Result of staging a set of candidate files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    /// Destination paths of the newly staged tasks.
    pub admitted: Vec<RemotePath>,
    pub rejected: Vec<Rejection>,
}

/// A task that did not finish during a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub path: RemotePath,
    /// Resume point: first byte the server has not acknowledged.
    pub offset: u64,
    pub total_size: u64,
    pub error: String,
}

/// Per-task outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: Vec<RemotePath>,
    pub failed: Vec<FailedUpload>,
}

impl BatchReport {
    /// Directories that received at least one chunk attempt, deduplicated.
    pub fn directories(&self) -> Vec<RemotePath> {
        let mut dirs: Vec<RemotePath> = Vec::new();
        let paths = self
            .completed
            .iter()
            .chain(self.failed.iter().map(|f| &f.path));
        for dir in paths.filter_map(RemotePath::parent) {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Folds in the report of a later resume run. Completions accumulate;
    /// only the later run's failures are still outstanding.
    pub fn absorb(&mut self, later: BatchReport) {
        for path in later.completed {
            if !self.completed.contains(&path) {
                self.completed.push(path);
            }
        }
        self.failed = later.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// There was nothing staged (or nothing failed, for a resume).
    NothingToUpload,
    Finished(BatchReport),
}

/// Pending upload batch plus the failed tasks kept for resume.
#[derive(Debug, Default)]
pub struct UploadSession {
    policy: UploadPolicy,
    staged: Vec<UploadTask>,
    failed: Vec<UploadTask>,
}

impl UploadSession {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            staged: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn staged(&self) -> &[UploadTask] {
        &self.staged
    }

    pub fn failed(&self) -> &[UploadTask] {
        &self.failed
    }

    /// Stages `files` as uploads into `destination_dir`.
    ///
    /// Candidates are checked in order: type filter, then duplicate
    /// `(name, size)`, then the batch limit. Once the batch is full every
    /// remaining candidate is rejected with [`RejectReason::LimitReached`].
    pub fn stage(
        &mut self,
        files: impl IntoIterator<Item = LocalFile>,
        destination_dir: &RemotePath,
    ) -> SelectionReport {
        let mut report = SelectionReport::default();
        let mut full = false;

        for file in files {
            let reason = if full {
                Some(RejectReason::LimitReached)
            } else if !self.policy.accepts_type(&file) {
                Some(RejectReason::TypeRejected)
            } else if self.contains(file.name(), file.size()) {
                Some(RejectReason::DuplicateRejected)
            } else if self.staged.len() >= self.policy.max_files {
                full = true;
                Some(RejectReason::LimitReached)
            } else {
                None
            };

            if let Some(reason) = reason {
                debug!(name = file.name(), %reason, "file not staged");
                report.rejected.push(Rejection {
                    name: file.name().to_string(),
                    size: file.size(),
                    reason,
                });
                continue;
            }

            let destination = destination_dir.join(file.name());
            report.admitted.push(destination.clone());
            self.staged
                .push(UploadTask::new(file, destination, self.policy.chunk_size));
        }

        report
    }

    /// Unstages the pending task for `(name, size)`. Returns whether one
    /// was removed.
    pub fn remove(&mut self, name: &str, size: u64) -> bool {
        let before = self.staged.len();
        self.staged.retain(|t| !t.matches(name, size));
        self.staged.len() != before
    }

    /// Drops every staged task.
    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Gives up on the failed task for `(name, size)`, so the same file
    /// can be staged again from scratch.
    pub fn remove_failed(&mut self, name: &str, size: u64) -> bool {
        let before = self.failed.len();
        self.failed.retain(|t| !t.matches(name, size));
        self.failed.len() != before
    }

    /// Gives up on every failed task. Returns how many were dropped.
    pub fn discard_failed(&mut self) -> usize {
        let dropped = self.failed.len();
        self.failed.clear();
        if dropped > 0 {
            debug!(dropped, "failed uploads discarded");
        }
        dropped
    }

    /// Runs every staged task concurrently.
    ///
    /// Completed tasks are dropped; failed ones move to
    /// [`failed`](Self::failed) for [`resume_failed`](Self::resume_failed).
    pub async fn start(&mut self, uploader: &ChunkUploader<'_>) -> BatchOutcome {
        if self.staged.is_empty() {
            return BatchOutcome::NothingToUpload;
        }
        let tasks = std::mem::take(&mut self.staged);
        self.run(tasks, uploader).await
    }

    /// Re-runs the failed tasks from their preserved offsets.
    pub async fn resume_failed(&mut self, uploader: &ChunkUploader<'_>) -> BatchOutcome {
        if self.failed.is_empty() {
            return BatchOutcome::NothingToUpload;
        }
        let tasks = std::mem::take(&mut self.failed);
        self.run(tasks, uploader).await
    }

    async fn run(&mut self, mut tasks: Vec<UploadTask>, uploader: &ChunkUploader<'_>) -> BatchOutcome {
        info!(tasks = tasks.len(), "starting upload batch");
        let results = join_all(tasks.iter_mut().map(|task| uploader.start(task))).await;

        let mut report = BatchReport::default();
        for (task, result) in tasks.into_iter().zip(results) {
            match result {
                Ok(()) => report.completed.push(task.destination().clone()),
                Err(e) => {
                    report.failed.push(FailedUpload {
                        path: task.destination().clone(),
                        offset: task.next_offset(),
                        total_size: task.total_size(),
                        error: e.to_string(),
                    });
                    self.failed.push(task);
                }
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "upload batch finished"
        );
        BatchOutcome::Finished(report)
    }

    fn contains(&self, name: &str, size: u64) -> bool {
        self.staged
            .iter()
            .chain(self.failed.iter())
            .any(|t| t.matches(name, size))
    }
}
