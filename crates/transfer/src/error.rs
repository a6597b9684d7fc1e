use qsfm_protocol::RemotePath;
use qsfm_remote::RemoteError;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk was not acknowledged. `offset` is the first byte that has
    /// not been stored remotely; resuming starts there.
    #[error("chunk upload failed for {path} at offset {offset}: {source}")]
    ChunkUploadFailed {
        path: RemotePath,
        offset: u64,
        #[source]
        source: RemoteError,
    },

    #[error("source for {path} returned {got} bytes, expected {expected}")]
    ShortRead {
        path: RemotePath,
        expected: usize,
        got: usize,
    },
}
