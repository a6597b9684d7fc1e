//! Per-directory listing cache with issue-ordered updates.
//!
//! Every fetch and every invalidation draws a ticket from one counter.
//! A response is applied only if its ticket is newer than the ticket of
//! the listing already stored, and it marks the entry fresh only if it
//! was issued after the latest invalidation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qsfm_protocol::RemotePath;
use qsfm_remote::{RemoteError, RemoteFs};
use tracing::{debug, warn};

use crate::types::DirectoryListing;

#[derive(Debug, Default)]
struct Slot {
    listing: Option<DirectoryListing>,
    /// Ticket of the response stored in `listing`.
    applied: u64,
    /// Ticket of the latest invalidation.
    invalidated: u64,
    fresh: bool,
}

/// Caches the last listing fetched for each directory.
pub struct DirectoryCache {
    remote: Arc<dyn RemoteFs>,
    slots: Mutex<HashMap<RemotePath, Slot>>,
    next_ticket: AtomicU64,
}

impl DirectoryCache {
    pub fn new(remote: Arc<dyn RemoteFs>) -> Self {
        Self {
            remote,
            slots: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Returns the listing of `path`, from cache when it is fresh.
    ///
    /// On failure the previously stored listing is kept and stays
    /// available through [`cached`](Self::cached).
    pub async fn fetch(&self, path: &RemotePath) -> Result<DirectoryListing, RemoteError> {
        if let Some(listing) = self.fresh_listing(path) {
            debug!(path = %path, "listing served from cache");
            return Ok(listing);
        }

        let ticket = self.issue();
        debug!(path = %path, ticket, "fetching listing");
        let resp = match self.remote.list_dir(path.as_str()).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(path = %path, error = %e, "listing fetch failed");
                return Err(e);
            }
        };
        let listing = DirectoryListing::from_response(path, resp);

        let mut slots = self.lock();
        let slot = slots.entry(path.clone()).or_default();
        if ticket > slot.applied {
            slot.applied = ticket;
            slot.fresh = ticket > slot.invalidated;
            slot.listing = Some(listing.clone());
            Ok(listing)
        } else {
            debug!(path = %path, ticket, applied = slot.applied, "older response not applied");
            Ok(slot.listing.clone().unwrap_or(listing))
        }
    }

    /// Forces the next [`fetch`](Self::fetch) of `path` to hit the network.
    pub fn invalidate(&self, path: &RemotePath) {
        let ticket = self.issue();
        let mut slots = self.lock();
        let slot = slots.entry(path.clone()).or_default();
        slot.invalidated = ticket;
        slot.fresh = false;
        debug!(path = %path, ticket, "listing invalidated");
    }

    /// Last known good listing of `path`, fresh or not.
    pub fn cached(&self, path: &RemotePath) -> Option<DirectoryListing> {
        self.lock().get(path).and_then(|slot| slot.listing.clone())
    }

    pub fn is_fresh(&self, path: &RemotePath) -> bool {
        self.lock().get(path).is_some_and(|slot| slot.fresh)
    }

    fn fresh_listing(&self, path: &RemotePath) -> Option<DirectoryListing> {
        self.lock()
            .get(path)
            .filter(|slot| slot.fresh)
            .and_then(|slot| slot.listing.clone())
    }

    fn issue(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RemotePath, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemote;
    use qsfm_remote::ErrorKind;

    fn setup() -> (Arc<MockRemote>, DirectoryCache) {
        let remote = Arc::new(MockRemote::new());
        remote.add_file("/qs/files", "a.txt", 3);
        let cache = DirectoryCache::new(remote.clone());
        (remote, cache)
    }

    fn names(listing: &DirectoryListing) -> Vec<&str> {
        listing.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let (remote, cache) = setup();
        let path = RemotePath::new("/qs/files");

        cache.fetch(&path).await.unwrap();
        cache.fetch(&path).await.unwrap();
        assert_eq!(remote.list_calls(), vec!["/qs/files"]);
        assert!(cache.is_fresh(&path));
    }

    #[tokio::test]
    async fn invalidate_forces_network() {
        let (remote, cache) = setup();
        let path = RemotePath::new("/qs/files");

        cache.fetch(&path).await.unwrap();
        remote.add_file("/qs/files", "b.txt", 1);
        cache.invalidate(&path);
        assert!(!cache.is_fresh(&path));

        let listing = cache.fetch(&path).await.unwrap();
        assert_eq!(remote.list_calls().len(), 2);
        assert_eq!(names(&listing), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn failure_keeps_last_known_good() {
        let (remote, cache) = setup();
        let path = RemotePath::new("/qs/files");

        cache.fetch(&path).await.unwrap();
        cache.invalidate(&path);
        remote.fail_list("/qs/files", 500);

        let err = cache.fetch(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
        let kept = cache.cached(&path).unwrap();
        assert_eq!(names(&kept), vec!["a.txt"]);
        assert!(!cache.is_fresh(&path));
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let (_remote, cache) = setup();
        let err = cache.fetch(&RemotePath::new("/nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(cache.cached(&RemotePath::new("/nope")).is_none());
    }

    #[tokio::test]
    async fn older_response_does_not_overwrite_newer() {
        let (remote, cache) = setup();
        let path = RemotePath::new("/qs/files");
        let gate = remote.gate_next_list("/qs/files");

        let (slow, fast) = tokio::join!(cache.fetch(&path), async {
            // The slow request was issued first and now waits on the gate.
            remote.add_file("/qs/files", "b.txt", 1);
            cache.invalidate(&path);
            let fast = cache.fetch(&path).await;
            gate.notify_one();
            fast
        });

        let fast = fast.unwrap();
        assert_eq!(names(&fast), vec!["a.txt", "b.txt"]);
        // The late response resolves to the newest applied listing.
        assert_eq!(slow.unwrap(), fast);
        assert_eq!(cache.cached(&path).unwrap(), fast);
        assert!(cache.is_fresh(&path));
    }

    #[tokio::test]
    async fn response_issued_before_invalidation_stays_stale() {
        let (remote, cache) = setup();
        let path = RemotePath::new("/qs/files");
        let gate = remote.gate_next_list("/qs/files");

        let (first, ()) = tokio::join!(cache.fetch(&path), async {
            cache.invalidate(&path);
            gate.notify_one();
        });
        first.unwrap();

        // Applied (nothing newer existed) but not fresh.
        assert!(cache.cached(&path).is_some());
        assert!(!cache.is_fresh(&path));

        cache.fetch(&path).await.unwrap();
        assert_eq!(remote.list_calls().len(), 2);
        assert!(cache.is_fresh(&path));
    }
}
