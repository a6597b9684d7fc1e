//! In-memory [`RemoteFs`] shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use qsfm_protocol::{FileMetadata, ListDirResponse, MsgResponse, RemotePath};
use qsfm_remote::{RemoteError, RemoteFs, RemoteFuture};
use tokio::sync::Notify;

/// Mock file tree. Listings are snapshotted when a request is issued, so
/// a gated request answers with the state it saw when it was sent.
pub(crate) struct MockRemote {
    dirs: Mutex<HashMap<String, Vec<FileMetadata>>>,
    list_calls: Mutex<Vec<String>>,
    created: Mutex<Vec<String>>,
    chunks: Mutex<Vec<(String, u64, usize)>>,
    list_failures: Mutex<HashMap<String, u16>>,
    chunk_failures: Mutex<Vec<(String, u64)>>,
    gates: Mutex<Vec<(String, Arc<Notify>)>>,
}

fn meta(name: &str, size: u64, is_dir: bool) -> FileMetadata {
    FileMetadata {
        name: name.to_string(),
        size,
        mod_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        is_dir,
        sha1: String::new(),
    }
}

impl MockRemote {
    pub(crate) fn new() -> Self {
        Self {
            dirs: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            chunks: Mutex::new(Vec::new()),
            list_failures: Mutex::new(HashMap::new()),
            chunk_failures: Mutex::new(Vec::new()),
            gates: Mutex::new(Vec::new()),
        }
    }

    /// Creates `dir` (and registers it in its parent listing).
    pub(crate) fn add_dir(&self, dir: &str) {
        let path = RemotePath::new(dir);
        let mut dirs = self.dirs.lock().unwrap();
        dirs.entry(path.as_str().to_string()).or_default();
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let entries = dirs.entry(parent.as_str().to_string()).or_default();
            if !entries.iter().any(|e| e.name == name) {
                entries.push(meta(name, 0, true));
            }
        }
    }

    pub(crate) fn add_file(&self, dir: &str, name: &str, size: u64) {
        let dir = RemotePath::new(dir);
        self.dirs
            .lock()
            .unwrap()
            .entry(dir.as_str().to_string())
            .or_default()
            .push(meta(name, size, false));
    }

    /// Listing `dir` answers with `status` from now on.
    pub(crate) fn fail_list(&self, dir: &str, status: u16) {
        self.list_failures
            .lock()
            .unwrap()
            .insert(dir.to_string(), status);
    }

    /// The next chunk to `path` at `offset` fails once.
    pub(crate) fn fail_chunk(&self, path: &str, offset: u64) {
        self.chunk_failures
            .lock()
            .unwrap()
            .push((path.to_string(), offset));
    }

    /// The next listing request for `dir` waits until the returned
    /// notifier fires.
    pub(crate) fn gate_next_list(&self, dir: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .push((dir.to_string(), notify.clone()));
        notify
    }

    pub(crate) fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }

    pub(crate) fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn chunks(&self) -> Vec<(String, u64, usize)> {
        self.chunks.lock().unwrap().clone()
    }

    fn take_gate(&self, dir: &str) -> Option<Arc<Notify>> {
        let mut gates = self.gates.lock().unwrap();
        let pos = gates.iter().position(|(d, _)| d == dir)?;
        Some(gates.remove(pos).1)
    }

    fn snapshot(&self, dir: &str) -> Result<ListDirResponse, RemoteError> {
        if let Some(status) = self.list_failures.lock().unwrap().get(dir) {
            return Err(RemoteError::from_status(*status, String::new(), dir));
        }
        match self.dirs.lock().unwrap().get(dir) {
            Some(entries) => Ok(ListDirResponse {
                cwd: dir.to_string(),
                metadatas: entries.clone(),
            }),
            None => Err(RemoteError::NotFound(dir.to_string())),
        }
    }
}

impl RemoteFs for MockRemote {
    fn list_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, ListDirResponse> {
        self.list_calls.lock().unwrap().push(path.to_string());
        let gate = self.take_gate(path);
        let result = self.snapshot(path);

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            result
        })
    }

    fn file_metadata<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, FileMetadata> {
        Box::pin(async move {
            let target = RemotePath::new(path);
            let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
                return Err(RemoteError::NotFound(path.to_string()));
            };
            self.dirs
                .lock()
                .unwrap()
                .get(parent.as_str())
                .and_then(|entries| entries.iter().find(|e| e.name == name).cloned())
                .ok_or_else(|| RemoteError::NotFound(path.to_string()))
        })
    }

    fn create_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, MsgResponse> {
        Box::pin(async move {
            self.created.lock().unwrap().push(path.to_string());
            self.add_dir(path);
            Ok(MsgResponse { msg: "OK".into() })
        })
    }

    fn upload_chunk<'a>(
        &'a self,
        path: &'a str,
        content: &'a [u8],
        offset: u64,
    ) -> RemoteFuture<'a, MsgResponse> {
        Box::pin(async move {
            self.chunks
                .lock()
                .unwrap()
                .push((path.to_string(), offset, content.len()));

            let failed = {
                let mut failures = self.chunk_failures.lock().unwrap();
                match failures.iter().position(|(p, o)| p == path && *o == offset) {
                    Some(i) => {
                        failures.remove(i);
                        true
                    }
                    None => false,
                }
            };
            if failed {
                return Err(RemoteError::Server {
                    status: 500,
                    body: "injected failure".into(),
                });
            }

            let target = RemotePath::new(path);
            if let (Some(parent), Some(name)) = (target.parent(), target.file_name()) {
                let mut dirs = self.dirs.lock().unwrap();
                let entries = dirs.entry(parent.as_str().to_string()).or_default();
                match entries.iter_mut().find(|e| e.name == name) {
                    Some(entry) => entry.size = offset + content.len() as u64,
                    None => entries.push(meta(name, offset + content.len() as u64, false)),
                }
            }
            Ok(MsgResponse { msg: "OK".into() })
        })
    }

    fn download_url(&self, path: &str) -> String {
        format!("http://mock/v1/fs/files?fp={path}")
    }
}
