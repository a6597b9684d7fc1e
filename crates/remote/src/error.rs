//! Remote API error types.

/// Coarse classification callers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport unreachable or timed out.
    Network,
    /// Session missing or expired.
    Unauthorized,
    NotFound,
    ServerError,
}

/// Errors produced while talking to the remote API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Maps a non-success HTTP status to an error.
    ///
    /// The backend answers 403 for an invalid session as often as 401.
    pub fn from_status(status: u16, body: String, target: &str) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound(target.to_string()),
            _ => Self::Server { status, body },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Io(_) | Self::InvalidUrl(_) => ErrorKind::Network,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Server { .. } | Self::Json(_) => ErrorKind::ServerError,
        }
    }

    /// Whether a user-initiated retry can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Network
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            let target = e.url().map(|u| u.path().to_string()).unwrap_or_default();
            return Self::from_status(status.as_u16(), e.to_string(), &target);
        }
        Self::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            RemoteError::from_status(401, String::new(), "/a").kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            RemoteError::from_status(403, "forbidden".into(), "/a").kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            RemoteError::from_status(404, String::new(), "/a").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RemoteError::from_status(500, "boom".into(), "/a").kind(),
            ErrorKind::ServerError
        );
        assert_eq!(
            RemoteError::from_status(409, String::new(), "/a").kind(),
            ErrorKind::ServerError
        );
    }

    #[test]
    fn not_found_keeps_target() {
        let err = RemoteError::from_status(404, String::new(), "/qs/files/gone");
        assert_eq!(err.to_string(), "not found: /qs/files/gone");
    }

    #[test]
    fn only_network_errors_are_transient() {
        assert!(RemoteError::Network("timed out".into()).is_transient());
        assert!(!RemoteError::Unauthorized.is_transient());
        assert!(
            !RemoteError::Server {
                status: 502,
                body: String::new()
            }
            .is_transient()
        );
    }
}
