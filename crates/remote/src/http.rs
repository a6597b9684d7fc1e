//! `reqwest`-backed implementation of [`RemoteFs`].
//!
//! The session lives in the client's cookie store: call
//! [`HttpRemote::login`] once and every later request carries the cookie.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use qsfm_protocol::{
    CreateDirRequest, Endpoint, FILE_QUERY, FileMetadata, HttpMethod, LIST_DIR_QUERY,
    ListDirResponse, LoginRequest, LoginResponse, MsgResponse, UploadChunkRequest, User,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::RemoteError;
use crate::remote::{RemoteFs, RemoteFuture};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters left unescaped in query values (path separators stay readable).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP client for the file-manager backend.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Creates a client for `base_url` (e.g. `https://files.example.com`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        self.request_to(endpoint, self.url(endpoint))
    }

    /// Builds a request with `endpoint`'s method against a full `url`.
    fn request_to(&self, endpoint: Endpoint, url: String) -> RequestBuilder {
        let method = match endpoint.method() {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
        };
        self.http.request(method, url)
    }

    /// Sends a request and turns non-success statuses into errors.
    async fn send(&self, req: RequestBuilder, target: &str) -> Result<Response, RemoteError> {
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status.as_u16(), body, target));
        }

        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        target: &str,
    ) -> Result<T, RemoteError> {
        let resp = self.send(req, target).await?;
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`send_json`](Self::send_json) for `{msg}` acknowledgements,
    /// tolerating an empty body.
    async fn send_ack(&self, req: RequestBuilder, target: &str) -> Result<MsgResponse, RemoteError> {
        let resp = self.send(req, target).await?;
        let body = resp.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(MsgResponse { msg: String::new() });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Signs in; the session cookie is kept by the client.
    pub async fn login(&self, user: &str, pwd: &str) -> Result<LoginResponse, RemoteError> {
        let body = LoginRequest {
            user: user.to_string(),
            pwd: pwd.to_string(),
        };
        let req = self.request(Endpoint::Login).json(&body);
        let resp = self.send(req, Endpoint::Login.path()).await?;
        let bytes = resp.bytes().await?;
        let login = if bytes.is_empty() {
            LoginResponse::default()
        } else {
            serde_json::from_slice(&bytes)?
        };
        info!(user, "signed in");
        Ok(login)
    }

    pub async fn logout(&self) -> Result<MsgResponse, RemoteError> {
        let req = self.request(Endpoint::Logout);
        self.send_ack(req, Endpoint::Logout.path()).await
    }

    /// Returns the signed-in user.
    pub async fn me(&self) -> Result<User, RemoteError> {
        let req = self.request(Endpoint::CurrentUser);
        self.send_json(req, Endpoint::CurrentUser.path()).await
    }

    /// Streams the file at `path` into `dest`, returning the byte count.
    ///
    /// The body lands in a `.part` sibling first; `dest` only appears once
    /// the whole body was received.
    pub async fn download_to(&self, path: &str, dest: &Path) -> Result<u64, RemoteError> {
        let req = self.request_to(Endpoint::Download, self.download_url(path));
        let resp = self.send(req, path).await?;

        let partial = partial_path(dest);
        let written = match write_body(resp, &partial).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, dest).await?;

        debug!(path, dest = %dest.display(), bytes = written, "download complete");
        Ok(written)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn write_body(mut resp: Response, dest: &Path) -> Result<u64, RemoteError> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

impl RemoteFs for HttpRemote {
    fn list_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, ListDirResponse> {
        Box::pin(async move {
            let req = self.request(Endpoint::ListDir).query(&[(LIST_DIR_QUERY, path)]);
            self.send_json(req, path).await
        })
    }

    fn file_metadata<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, FileMetadata> {
        Box::pin(async move {
            let req = self.request(Endpoint::FileMetadata).query(&[(FILE_QUERY, path)]);
            self.send_json(req, path).await
        })
    }

    fn create_dir<'a>(&'a self, path: &'a str) -> RemoteFuture<'a, MsgResponse> {
        Box::pin(async move {
            let body = CreateDirRequest {
                path: path.to_string(),
            };
            let req = self.request(Endpoint::CreateDir).json(&body);
            self.send_ack(req, path).await
        })
    }

    fn upload_chunk<'a>(
        &'a self,
        path: &'a str,
        content: &'a [u8],
        offset: u64,
    ) -> RemoteFuture<'a, MsgResponse> {
        Box::pin(async move {
            let body = UploadChunkRequest {
                path: path.to_string(),
                content: content.to_vec(),
                offset,
            };
            let req = self.request(Endpoint::UploadChunk).json(&body);
            self.send_ack(req, path).await
        })
    }

    fn download_url(&self, path: &str) -> String {
        format!(
            "{}?{}={}",
            self.url(Endpoint::Download),
            FILE_QUERY,
            utf8_percent_encode(path, QUERY_VALUE)
        )
    }
}
