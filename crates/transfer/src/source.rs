use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::UploadError;

/// MIME type reported when the extension is unknown.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Where the bytes of a [`LocalFile`] live.
#[derive(Debug, Clone)]
pub enum Blob {
    /// Bytes already in memory (e.g. a dropped payload).
    Memory(Arc<[u8]>),
    /// A file on the local disk, read lazily chunk by chunk.
    Disk(PathBuf),
}

/// A candidate file for upload: name, declared type, size and source.
#[derive(Debug, Clone)]
pub struct LocalFile {
    name: String,
    mime: String,
    size: u64,
    blob: Blob,
}

impl LocalFile {
    /// Wraps in-memory bytes. An empty `mime` is derived from the name.
    pub fn from_bytes(name: impl Into<String>, mime: &str, data: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let data: Vec<u8> = data.into();
        let mime = if mime.is_empty() {
            detect_mime_type(&name).to_string()
        } else {
            mime.to_string()
        };
        Self {
            size: data.len() as u64,
            blob: Blob::Memory(data.into()),
            name,
            mime,
        }
    }

    /// Describes a file on disk. Only metadata is read here.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(UploadError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            mime: detect_mime_type(&name).to_string(),
            size: metadata.len(),
            blob: Blob::Disk(path.to_path_buf()),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    /// Reads up to `len` bytes starting at `offset`.
    ///
    /// Fewer bytes come back only if the source is shorter than its
    /// recorded size.
    pub async fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>, UploadError> {
        match &self.blob {
            Blob::Memory(data) => {
                let start = (offset as usize).min(data.len());
                let end = start.saturating_add(len).min(data.len());
                Ok(data[start..end].to_vec())
            }
            Blob::Disk(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || read_file_range(&path, offset, len))
                    .await
                    .map_err(|e| {
                        UploadError::Io(std::io::Error::other(format!("task join error: {e}")))
                    })?
            }
        }
    }
}

fn read_file_range(path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, UploadError> {
    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Lower-cased extension with its leading dot (`".pdf"`), if the name has one.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Guesses a MIME type from the file extension.
pub fn detect_mime_type(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some(".txt") => "text/plain",
        Some(".md") => "text/markdown",
        Some(".html" | ".htm") => "text/html",
        Some(".css") => "text/css",
        Some(".csv") => "text/csv",
        Some(".json") => "application/json",
        Some(".pdf") => "application/pdf",
        Some(".zip") => "application/zip",
        Some(".gz") => "application/gzip",
        Some(".png") => "image/png",
        Some(".jpg" | ".jpeg") => "image/jpeg",
        Some(".gif") => "image/gif",
        Some(".webp") => "image/webp",
        Some(".svg") => "image/svg+xml",
        Some(".mp3") => "audio/mpeg",
        Some(".mp4") => "video/mp4",
        _ => FALLBACK_MIME,
    }
}
