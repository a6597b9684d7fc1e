use crate::source::{LocalFile, extension_of};
use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FILES};

/// Admission rules for an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Maximum number of staged tasks.
    pub max_files: usize,
    /// Accepted MIME types and/or `.ext` extensions. Empty accepts all.
    pub allowed_types: Vec<String>,
    /// Chunk size given to new tasks. 0 selects the default.
    pub chunk_size: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            allowed_types: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl UploadPolicy {
    /// Whether `file` passes the type filter.
    ///
    /// An entry matches when it equals the file's MIME type or its
    /// dotted extension, ignoring case.
    pub fn accepts_type(&self, file: &LocalFile) -> bool {
        if self.allowed_types.is_empty() {
            return true;
        }
        let ext = extension_of(file.name());
        self.allowed_types.iter().map(|t| t.trim()).any(|allowed| {
            allowed.eq_ignore_ascii_case(file.mime())
                || ext
                    .as_deref()
                    .is_some_and(|ext| allowed.eq_ignore_ascii_case(ext))
        })
    }
}

/// Why a candidate file was not staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TypeRejected,
    DuplicateRejected,
    LimitReached,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::TypeRejected => "file type not allowed",
            Self::DuplicateRejected => "already staged",
            Self::LimitReached => "upload limit reached",
        };
        f.write_str(text)
    }
}

/// A candidate file that was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub size: u64,
    pub reason: RejectReason,
}
