use qsfm_protocol::{FileMetadata, ListDirResponse, RemotePath};
use qsfm_transfer::BatchOutcome;

use crate::error::ExplorerError;

/// Contents of one remote directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryListing {
    pub cwd: RemotePath,
    pub entries: Vec<FileMetadata>,
}

impl DirectoryListing {
    /// Builds a listing for `requested`. The server's `cwd` echo wins when
    /// present.
    pub fn from_response(requested: &RemotePath, resp: ListDirResponse) -> Self {
        let cwd = if resp.cwd.is_empty() {
            requested.clone()
        } else {
            RemotePath::new(&resp.cwd)
        };
        Self {
            cwd,
            entries: resp.metadatas,
        }
    }

    pub fn find(&self, name: &str) -> Option<&FileMetadata> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn directories(&self) -> impl Iterator<Item = &FileMetadata> {
        self.entries.iter().filter(|e| e.is_dir)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileMetadata> {
        self.entries.iter().filter(|e| !e.is_dir)
    }
}

/// Result of a navigation or refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// The listing for the directory that is still current.
    Loaded(DirectoryListing),
    /// The user moved elsewhere before the fetch resolved; nothing was
    /// applied to the view.
    Discarded { requested: RemotePath },
}

impl Navigation {
    pub fn listing(&self) -> Option<&DirectoryListing> {
        match self {
            Self::Loaded(listing) => Some(listing),
            Self::Discarded { .. } => None,
        }
    }
}

/// What opening a directory entry led to.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryAction {
    /// A directory was entered.
    Entered(Navigation),
    /// A file was opened; the front end shows its details.
    ShowDetails(RemotePath),
}

/// A file the current selection allows downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub path: RemotePath,
    pub url: String,
}

/// Outcome of an upload run, plus the listing refresh that followed it.
#[derive(Debug)]
pub struct UploadSummary {
    pub outcome: BatchOutcome,
    /// `None` when nothing was uploaded and no refresh took place.
    pub refresh: Option<Result<Navigation, ExplorerError>>,
}
