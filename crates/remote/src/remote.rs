//! The `RemoteFs` seam between the transfer core and the HTTP transport.

use std::future::Future;
use std::pin::Pin;

use qsfm_protocol::{FileMetadata, ListDirResponse, MsgResponse};

use crate::error::RemoteError;

/// Boxed future returned by [`RemoteFs`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Abstract remote filesystem.
///
/// [`HttpRemote`](crate::HttpRemote) implements this on top of `reqwest`.
pub trait RemoteFs: Send + Sync {
    /// Lists the directory at `path`.
    fn list_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, ListDirResponse>;

    /// Fetches metadata for the file at `path`.
    fn file_metadata<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, FileMetadata>;

    /// Creates a directory at `path`.
    fn create_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, MsgResponse>;

    /// Appends `content` to the file at `path`, starting at byte `offset`.
    fn upload_chunk<'a>(
        &'a self,
        path: &'a str,
        content: &'a [u8],
        offset: u64,
    ) -> RemoteFuture<'a, MsgResponse>;

    /// Absolute URL that serves the file at `path` for download.
    fn download_url(&self, path: &str) -> String;
}
