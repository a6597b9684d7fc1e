use qsfm_remote::{ErrorKind, RemoteError};
use qsfm_transfer::UploadError;

/// Errors from the last-directory state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by [`TransferController`](crate::TransferController).
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("state file: {0}")]
    State(#[from] StateError),
}

impl ExplorerError {
    /// Classification of the underlying remote failure, if there is one.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Remote(e) => Some(e.kind()),
            Self::Upload(UploadError::ChunkUploadFailed { source, .. }) => Some(source.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsfm_protocol::RemotePath;

    #[test]
    fn remote_kind_reaches_through_upload_errors() {
        let err = ExplorerError::from(UploadError::ChunkUploadFailed {
            path: RemotePath::new("/a"),
            offset: 0,
            source: RemoteError::Unauthorized,
        });
        assert_eq!(err.remote_kind(), Some(ErrorKind::Unauthorized));

        let err = ExplorerError::from(RemoteError::NotFound("/gone".into()));
        assert_eq!(err.remote_kind(), Some(ErrorKind::NotFound));
        assert_eq!(err.to_string(), "not found: /gone");

        let err = ExplorerError::from(StateError::Io(std::io::Error::other("disk full")));
        assert_eq!(err.remote_kind(), None);
    }
}
