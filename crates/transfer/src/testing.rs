//! In-memory [`RemoteFs`] used by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use qsfm_protocol::{FileMetadata, ListDirResponse, MsgResponse};
use qsfm_remote::{RemoteError, RemoteFs, RemoteFuture};

/// Records every chunk and appends it to a per-path buffer.
pub(crate) struct MockRemote {
    chunks: Mutex<Vec<(String, u64, usize)>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    /// One-shot failures: `(path or any, offset)`.
    failures: Mutex<Vec<(Option<String>, u64)>>,
}

impl MockRemote {
    pub(crate) fn new() -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
            files: Mutex::new(HashMap::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// The next chunk sent at `offset`, to any path, fails once.
    pub(crate) fn fail_chunk_at(&self, offset: u64) {
        self.failures.lock().unwrap().push((None, offset));
    }

    /// The next chunk sent to `path` at `offset` fails once.
    pub(crate) fn fail_chunk_for(&self, path: &str, offset: u64) {
        self.failures
            .lock()
            .unwrap()
            .push((Some(path.to_string()), offset));
    }

    pub(crate) fn chunks(&self) -> Vec<(String, u64, usize)> {
        self.chunks.lock().unwrap().clone()
    }

    pub(crate) fn uploaded_bytes(&self, path: &str) -> Vec<u8> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    fn take_failure(&self, path: &str, offset: u64) -> bool {
        let mut failures = self.failures.lock().unwrap();
        let hit = failures
            .iter()
            .position(|(p, o)| *o == offset && p.as_deref().is_none_or(|p| p == path));
        match hit {
            Some(i) => {
                failures.remove(i);
                true
            }
            None => false,
        }
    }
}

impl RemoteFs for MockRemote {
    fn list_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, ListDirResponse> {
        Box::pin(async move { Err(RemoteError::NotFound(path.to_string())) })
    }

    fn file_metadata<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, FileMetadata> {
        Box::pin(async move { Err(RemoteError::NotFound(path.to_string())) })
    }

    fn create_dir<'a>(&'a self, _path: &'a str) -> RemoteFuture<'a, MsgResponse> {
        Box::pin(async move { Ok(MsgResponse { msg: "OK".into() }) })
    }

    fn upload_chunk<'a>(
        &'a self,
        path: &'a str,
        content: &'a [u8],
        offset: u64,
    ) -> RemoteFuture<'a, MsgResponse> {
        self.chunks
            .lock()
            .unwrap()
            .push((path.to_string(), offset, content.len()));

        Box::pin(async move {
            if self.take_failure(path, offset) {
                return Err(RemoteError::Server {
                    status: 500,
                    body: "injected failure".into(),
                });
            }
            let mut files = self.files.lock().unwrap();
            let buf = files.entry(path.to_string()).or_default();
            buf.truncate(offset as usize);
            buf.extend_from_slice(content);
            Ok(MsgResponse { msg: "OK".into() })
        })
    }

    fn download_url(&self, path: &str) -> String {
        format!("mock://{path}")
    }
}
