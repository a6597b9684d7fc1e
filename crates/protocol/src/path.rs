use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized forward-slash path relative to the storage root.
///
/// Normalization collapses repeated slashes and strips a trailing slash;
/// the root itself is `/`. A leading slash is kept when present. Segment
/// contents are not validated (that is the server's job).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Normalizes `raw` into a path.
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// The storage root, `/`.
    pub fn root() -> Self {
        Self("/".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    /// Non-empty segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Appends `name` below this path.
    pub fn join(&self, name: &str) -> Self {
        Self::new(&format!("{}/{}", self.0, name))
    }

    /// Keeps the first `index + 1` segments.
    ///
    /// Returns `None` when `index` does not address an existing segment.
    pub fn truncate_to(&self, index: usize) -> Option<Self> {
        let segments: Vec<&str> = self.segments().collect();
        if index >= segments.len() {
            return None;
        }
        Some(self.rebuild(&segments[..=index]))
    }

    /// The containing directory, or `None` for the root (and for a
    /// single relative segment).
    pub fn parent(&self) -> Option<Self> {
        let segments: Vec<&str> = self.segments().collect();
        match segments.len() {
            0 => None,
            1 if !self.is_absolute() => None,
            n => Some(self.rebuild(&segments[..n - 1])),
        }
    }

    /// Last segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    fn rebuild(&self, segments: &[&str]) -> Self {
        let joined = segments.join("/");
        if self.is_absolute() {
            Self::new(&format!("/{joined}"))
        } else {
            Self::new(&joined)
        }
    }
}

fn normalize(raw: &str) -> String {
    let joined = raw
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        "/".into()
    } else if raw.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

impl Default for RemotePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RemotePath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RemotePath {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}
