use serde::{Deserialize, Deserializer, Serialize};

use crate::types::FileMetadata;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of `POST /v2/my/fs/dirs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDirRequest {
    pub path: String,
}

/// Body of `PATCH /v2/my/fs/files/chunks`.
///
/// `content` carries the chunk bytes base64-encoded; `offset` is the byte
/// position of the first byte of the chunk within the destination file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadChunkRequest {
    pub path: String,
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
    pub offset: u64,
}

/// Body of `POST /v2/public/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub pwd: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response of `GET /v2/my/fs/dirs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDirResponse {
    pub cwd: String,
    /// The server encodes an empty list as `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadatas: Vec<FileMetadata>,
}

/// Generic acknowledgement, e.g. `{"msg":"OK"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgResponse {
    #[serde(default)]
    pub msg: String,
}

impl MsgResponse {
    pub fn is_ok(&self) -> bool {
        self.msg.eq_ignore_ascii_case("ok")
    }
}

/// Response of a successful login. The session itself travels in a cookie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
