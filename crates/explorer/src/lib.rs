//! File-manager core: where the user is, what the directory holds, what
//! is selected, and what is being uploaded.
//!
//! [`TransferController`] is the single entry point for front ends. It
//! composes the [`PathState`], [`DirectoryCache`], [`SelectionSet`] and
//! an upload session, and keeps them consistent: navigation clears the
//! selection and persists the new directory, mutations invalidate the
//! affected listings, and fetches that resolve after the user moved on
//! are discarded.

pub mod cache;
pub mod controller;
pub mod error;
pub mod last_dir;
pub mod path;
pub mod selection;
pub mod types;

#[cfg(test)]
mod testing;

pub use cache::DirectoryCache;
pub use controller::{ControllerOptions, TransferController};
pub use error::{ExplorerError, StateError};
pub use last_dir::{LastDirStore, config_dir, default_state_path};
pub use path::PathState;
pub use selection::{SelectedEntry, SelectionSet};
pub use types::{DirectoryListing, DownloadTarget, EntryAction, Navigation, UploadSummary};

/// Directory shown when no last-visited directory is known.
pub const DEFAULT_ROOT: &str = "/qs/files";
