//! The controller that composes path, listings, selection and uploads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qsfm_protocol::{FileMetadata, RemotePath};
use qsfm_remote::RemoteFs;
use qsfm_transfer::{
    BatchOutcome, ChunkUploader, LocalFile, SelectionReport, UploadEvent, UploadPolicy,
    UploadSession,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::DEFAULT_ROOT;
use crate::cache::DirectoryCache;
use crate::error::ExplorerError;
use crate::last_dir::LastDirStore;
use crate::path::PathState;
use crate::selection::{SelectedEntry, SelectionSet};
use crate::types::{DirectoryListing, DownloadTarget, EntryAction, Navigation, UploadSummary};

/// Construction parameters for [`TransferController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Directory used when no last-visited directory is stored.
    pub root: RemotePath,
    pub policy: UploadPolicy,
    /// Where the current directory is persisted. `None` disables it.
    pub last_dir: Option<LastDirStore>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            root: RemotePath::new(DEFAULT_ROOT),
            policy: UploadPolicy::default(),
            last_dir: None,
        }
    }
}

/// Front-end facing file manager.
///
/// Every path change goes through here so the dependent work happens
/// exactly once: the selection is cleared, the new directory is
/// persisted and its listing fetched. A listing that resolves after the
/// user navigated elsewhere comes back as [`Navigation::Discarded`].
pub struct TransferController {
    remote: Arc<dyn RemoteFs>,
    path: PathState,
    cache: DirectoryCache,
    selection: Mutex<SelectionSet>,
    uploads: tokio::sync::Mutex<UploadSession>,
    last_dir: Option<LastDirStore>,
    events: Option<mpsc::Sender<UploadEvent>>,
}

impl TransferController {
    pub fn new(remote: Arc<dyn RemoteFs>, options: ControllerOptions) -> Self {
        let initial = match options.last_dir.as_ref().map(LastDirStore::load) {
            Some(Ok(Some(path))) => path,
            Some(Err(e)) => {
                warn!(error = %e, "ignoring unreadable last-directory file");
                options.root
            }
            _ => options.root,
        };
        debug!(cwd = %initial, "controller created");

        Self {
            cache: DirectoryCache::new(remote.clone()),
            remote,
            path: PathState::new(initial),
            selection: Mutex::new(SelectionSet::new()),
            uploads: tokio::sync::Mutex::new(UploadSession::new(options.policy)),
            last_dir: options.last_dir,
            events: None,
        }
    }

    /// Reports upload progress on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn cwd(&self) -> RemotePath {
        self.path.get()
    }

    pub fn breadcrumbs(&self) -> Vec<String> {
        self.path.breadcrumbs()
    }

    /// Last listing known for the current directory, without a request.
    pub fn current_listing(&self) -> Option<DirectoryListing> {
        self.cache.cached(&self.path.get())
    }

    /// Loads the current directory (served from cache when fresh).
    pub async fn load_current(&self) -> Result<Navigation, ExplorerError> {
        self.load(self.path.get()).await
    }

    /// Re-fetches the current directory from the server.
    pub async fn refresh(&self) -> Result<Navigation, ExplorerError> {
        let cwd = self.path.get();
        self.cache.invalidate(&cwd);
        self.load(cwd).await
    }

    pub async fn navigate_to(&self, path: impl Into<RemotePath>) -> Result<Navigation, ExplorerError> {
        let target = path.into();
        if self.path.set(target.clone()) {
            self.path_changed(&target);
        }
        self.load(target).await
    }

    /// Opens a directory entry of the current listing.
    ///
    /// Directories are entered; files are handed back for a detail view.
    pub async fn open_entry(&self, name: &str, is_dir: bool) -> Result<EntryAction, ExplorerError> {
        if !is_dir {
            return Ok(EntryAction::ShowDetails(self.path.get().join(name)));
        }
        let target = self.path.append_segment(name);
        self.path_changed(&target);
        Ok(EntryAction::Entered(self.load(target).await?))
    }

    /// Jumps to the breadcrumb at `index`. An index past the end keeps
    /// the current directory.
    pub async fn jump_to_ancestor(&self, index: usize) -> Result<Navigation, ExplorerError> {
        let before = self.path.get();
        let target = self
            .path
            .pop_to_ancestor(index)
            .unwrap_or_else(|| before.clone());
        if target != before {
            self.path_changed(&target);
        }
        self.load(target).await
    }

    pub async fn file_details(&self, path: &RemotePath) -> Result<FileMetadata, ExplorerError> {
        Ok(self.remote.file_metadata(path.as_str()).await?)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Creates `name` under the current directory and reloads it.
    pub async fn create_folder(&self, name: &str) -> Result<Navigation, ExplorerError> {
        let cwd = self.path.get();
        let target = cwd.join(name);
        let ack = self.remote.create_dir(target.as_str()).await?;
        info!(path = %target, msg = %ack.msg, "folder created");

        self.cache.invalidate(&cwd);
        self.load(cwd).await
    }

    /// Stages `files` for upload into the current directory.
    pub async fn stage_files(&self, files: Vec<LocalFile>) -> SelectionReport {
        let cwd = self.path.get();
        let report = self.uploads.lock().await.stage(files, &cwd);
        if !report.rejected.is_empty() {
            debug!(rejected = report.rejected.len(), "some files were not staged");
        }
        report
    }

    /// Destinations of the staged uploads.
    pub async fn staged_uploads(&self) -> Vec<RemotePath> {
        let uploads = self.uploads.lock().await;
        uploads.staged().iter().map(|t| t.destination().clone()).collect()
    }

    /// Destinations of uploads waiting for a resume.
    pub async fn failed_uploads(&self) -> Vec<RemotePath> {
        let uploads = self.uploads.lock().await;
        uploads.failed().iter().map(|t| t.destination().clone()).collect()
    }

    pub async fn remove_staged(&self, name: &str, size: u64) -> bool {
        self.uploads.lock().await.remove(name, size)
    }

    pub async fn clear_staged(&self) {
        self.uploads.lock().await.clear();
    }

    /// Abandons the failed upload for `(name, size)`.
    pub async fn remove_failed(&self, name: &str, size: u64) -> bool {
        self.uploads.lock().await.remove_failed(name, size)
    }

    /// Abandons every failed upload. Returns how many were dropped.
    pub async fn discard_failed(&self) -> usize {
        self.uploads.lock().await.discard_failed()
    }

    /// Runs the staged batch, then refreshes the current directory once.
    pub async fn upload_staged(&self) -> UploadSummary {
        let uploader = self.uploader();
        let outcome = self.uploads.lock().await.start(&uploader).await;
        self.finish_batch(outcome).await
    }

    /// Resumes failed uploads from their preserved offsets.
    pub async fn resume_failed(&self) -> UploadSummary {
        let uploader = self.uploader();
        let outcome = self.uploads.lock().await.resume_failed(&uploader).await;
        self.finish_batch(outcome).await
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn toggle_selection(&self, name: &str, is_dir: bool) -> bool {
        self.selection_set().toggle(name, is_dir)
    }

    pub fn selection(&self) -> Vec<SelectedEntry> {
        self.selection_set().items().to_vec()
    }

    pub fn clear_selection(&self) {
        self.selection_set().clear();
    }

    /// The download for the selection, if exactly one file is selected.
    pub fn download_target(&self) -> Option<DownloadTarget> {
        let name = self.selection_set().single_file()?.name.clone();
        let path = self.path.get().join(&name);
        let url = self.remote.download_url(path.as_str());
        Some(DownloadTarget { path, url })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn load(&self, requested: RemotePath) -> Result<Navigation, ExplorerError> {
        let result = self.cache.fetch(&requested).await;
        if self.path.get() != requested {
            debug!(requested = %requested, "discarding stale listing");
            return Ok(Navigation::Discarded { requested });
        }
        Ok(Navigation::Loaded(result?))
    }

    fn path_changed(&self, path: &RemotePath) {
        self.selection_set().clear();
        if let Some(store) = &self.last_dir {
            if let Err(e) = store.save(path) {
                warn!(error = %e, file = ?store.path(), "failed to persist last directory");
            }
        }
    }

    async fn finish_batch(&self, outcome: BatchOutcome) -> UploadSummary {
        let BatchOutcome::Finished(report) = &outcome else {
            return UploadSummary {
                outcome,
                refresh: None,
            };
        };

        let cwd = self.path.get();
        let mut dirs = report.directories();
        if !dirs.contains(&cwd) {
            dirs.push(cwd.clone());
        }
        for dir in &dirs {
            self.cache.invalidate(dir);
        }

        let refresh = self.load(cwd).await;
        UploadSummary {
            outcome,
            refresh: Some(refresh),
        }
    }

    fn uploader(&self) -> ChunkUploader<'_> {
        let uploader = ChunkUploader::new(self.remote.as_ref());
        match &self.events {
            Some(tx) => uploader.with_events(tx.clone()),
            None => uploader,
        }
    }

    fn selection_set(&self) -> MutexGuard<'_, SelectionSet> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
