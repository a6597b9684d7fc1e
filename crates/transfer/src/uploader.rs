//! Sequential chunk streaming for a single [`UploadTask`].

use qsfm_remote::RemoteFs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::types::{TaskState, UploadEvent, UploadTask};

/// Streams upload tasks to the remote append endpoint.
///
/// Chunks of one task go out strictly in order: the chunk at offset `k`
/// is only sent after the chunk ending at `k` was acknowledged. On
/// failure the task keeps the offset of the first unacknowledged byte,
/// so calling [`start`](Self::start) again resumes there.
pub struct ChunkUploader<'a> {
    remote: &'a dyn RemoteFs,
    events: Option<mpsc::Sender<UploadEvent>>,
}

impl<'a> ChunkUploader<'a> {
    pub fn new(remote: &'a dyn RemoteFs) -> Self {
        Self {
            remote,
            events: None,
        }
    }

    /// Emits [`UploadEvent`]s on `tx` while uploading.
    pub fn with_events(mut self, tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Uploads the remainder of `task`, from its current offset to the end.
    ///
    /// A completed task is left untouched. A zero-byte file completes
    /// without any request.
    pub async fn start(&self, task: &mut UploadTask) -> Result<(), UploadError> {
        if task.state() == TaskState::Completed {
            return Ok(());
        }
        task.begin();

        let path = task.destination().clone();
        let total = task.total_size();
        debug!(path = %path, offset = task.next_offset(), total, "upload started");

        while task.remaining() > 0 {
            let offset = task.next_offset();
            let len = task.next_chunk_len();

            let data = match task.file().read_range(offset, len).await {
                Ok(data) => data,
                Err(e) => return Err(self.fail(task, e).await),
            };
            if data.len() != len {
                let err = UploadError::ShortRead {
                    path: path.clone(),
                    expected: len,
                    got: data.len(),
                };
                return Err(self.fail(task, err).await);
            }

            if let Err(source) = self.remote.upload_chunk(path.as_str(), &data, offset).await {
                let err = UploadError::ChunkUploadFailed {
                    path: path.clone(),
                    offset,
                    source,
                };
                return Err(self.fail(task, err).await);
            }

            task.advance(len as u64);
            self.emit(UploadEvent::ChunkSent {
                path: path.clone(),
                offset: task.next_offset(),
                total,
            })
            .await;
        }

        task.complete();
        info!(path = %path, bytes = total, "upload complete");
        self.emit(UploadEvent::Completed { path }).await;
        Ok(())
    }

    async fn fail(&self, task: &mut UploadTask, err: UploadError) -> UploadError {
        let path = task.destination().clone();
        let offset = task.next_offset();
        warn!(path = %path, offset, error = %err, "upload failed");

        task.fail(err.to_string());
        self.emit(UploadEvent::Failed {
            path,
            offset,
            error: err.to_string(),
        })
        .await;
        err
    }

    async fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}
