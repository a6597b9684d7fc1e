use qsfm_protocol::RemotePath;

use crate::DEFAULT_CHUNK_SIZE;
use crate::source::LocalFile;

/// Lifecycle of an upload task.
///
/// `Pending → InProgress → {Completed | Failed}`; a `Failed` task may be
/// started again and resumes from its preserved offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Progress notification emitted while uploading.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A chunk was acknowledged; `offset` is the new resume point.
    ChunkSent {
        path: RemotePath,
        offset: u64,
        total: u64,
    },
    Completed {
        path: RemotePath,
    },
    Failed {
        path: RemotePath,
        offset: u64,
        error: String,
    },
}

/// One file being streamed to a remote destination.
#[derive(Debug, Clone)]
pub struct UploadTask {
    file: LocalFile,
    destination: RemotePath,
    total_size: u64,
    chunk_size: usize,
    next_offset: u64,
    state: TaskState,
    last_error: Option<String>,
}

impl UploadTask {
    /// Creates a pending task. A `chunk_size` of 0 selects
    /// [`DEFAULT_CHUNK_SIZE`].
    pub fn new(file: LocalFile, destination: RemotePath, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self {
            total_size: file.size(),
            file,
            destination,
            chunk_size,
            next_offset: 0,
            state: TaskState::Pending,
            last_error: None,
        }
    }

    pub fn file(&self) -> &LocalFile {
        &self.file
    }

    pub fn destination(&self) -> &RemotePath {
        &self.destination
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// First byte not yet acknowledged by the server.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TaskState::Completed | TaskState::Failed)
    }

    pub fn remaining(&self) -> u64 {
        self.total_size - self.next_offset
    }

    /// Fraction acknowledged so far, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        if self.total_size == 0 {
            return if self.state == TaskState::Completed { 1.0 } else { 0.0 };
        }
        self.next_offset as f64 / self.total_size as f64
    }

    /// Length of the chunk starting at `next_offset`.
    pub(crate) fn next_chunk_len(&self) -> usize {
        self.remaining().min(self.chunk_size as u64) as usize
    }

    pub(crate) fn begin(&mut self) {
        self.state = TaskState::InProgress;
        self.last_error = None;
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        debug_assert!(bytes > 0, "offset must strictly increase");
        self.next_offset = (self.next_offset + bytes).min(self.total_size);
    }

    pub(crate) fn complete(&mut self) {
        self.state = TaskState::Completed;
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.state = TaskState::Failed;
        self.last_error = Some(error);
    }

    /// Whether this task uploads the same file as `(name, size)`.
    pub(crate) fn matches(&self, name: &str, size: u64) -> bool {
        self.file.name() == name && self.total_size == size
    }
}
