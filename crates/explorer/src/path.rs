use std::sync::{PoisonError, RwLock};

use qsfm_protocol::RemotePath;

/// The active directory. The only place the current path is stored.
#[derive(Debug)]
pub struct PathState {
    current: RwLock<RemotePath>,
}

impl PathState {
    pub fn new(initial: RemotePath) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> RemotePath {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the path. Returns whether the value changed.
    pub fn set(&self, path: RemotePath) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if *current == path {
            return false;
        }
        *current = path;
        true
    }

    /// Descends into `name` and returns the new path.
    pub fn append_segment(&self, name: &str) -> RemotePath {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = current.join(name);
        current.clone()
    }

    /// Truncates to the first `index + 1` segments (breadcrumb jump).
    ///
    /// Returns the new path, or `None` if `index` is out of range and the
    /// path was left as it is.
    pub fn pop_to_ancestor(&self, index: usize) -> Option<RemotePath> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let truncated = current.truncate_to(index)?;
        *current = truncated.clone();
        Some(truncated)
    }

    /// Breadcrumb labels, one per segment.
    pub fn breadcrumbs(&self) -> Vec<String> {
        self.get().segments().map(str::to_string).collect()
    }
}
