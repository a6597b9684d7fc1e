//! Chunked uploads with resume support.
//!
//! A [`ChunkUploader`] streams one [`UploadTask`] to the remote append
//! endpoint, chunk after chunk. An [`UploadSession`] admits candidate
//! files into a batch under the configured [`UploadPolicy`] and runs the
//! batch's tasks concurrently. [`DropZone`] tracks drag-and-drop hover
//! state for front ends that accept dropped files.

mod dropzone;
mod error;
mod policy;
mod session;
mod source;
mod types;
mod uploader;

#[cfg(test)]
mod testing;

pub use dropzone::{DragEvent, DragState, DropZone};
pub use error::UploadError;
pub use policy::{RejectReason, Rejection, UploadPolicy};
pub use session::{BatchOutcome, BatchReport, FailedUpload, SelectionReport, UploadSession};
pub use source::{Blob, LocalFile, detect_mime_type, extension_of};
pub use types::{TaskState, UploadEvent, UploadTask};
pub use uploader::ChunkUploader;

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Default maximum number of files admitted into one batch.
pub const DEFAULT_MAX_FILES: usize = 5;
