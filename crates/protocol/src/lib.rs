//! Wire types for the quickshare file-manager HTTP API.
//!
//! Request and response payloads mirror the JSON the server emits
//! (camelCase keys, a few 64-bit counters sent as decimal strings).

pub mod endpoints;
pub mod messages;
pub mod path;
pub mod types;

// Re-export primary types for convenience.
pub use endpoints::{Endpoint, FILE_QUERY, HttpMethod, LIST_DIR_QUERY};
pub use messages::{
    CreateDirRequest, ListDirResponse, LoginRequest, LoginResponse, MsgResponse,
    UploadChunkRequest,
};
pub use path::RemotePath;
pub use types::{BgConfig, FileMetadata, Preferences, Quota, User};
