use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one entry of a remote directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    pub mod_time: DateTime<Utc>,
    pub is_dir: bool,
    /// Opaque content hash computed by the server (empty for directories).
    #[serde(default)]
    pub sha1: String,
}

/// The signed-in user, as returned by `/v2/my/self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub quota: Option<Quota>,
    #[serde(default, with = "int_string")]
    pub used_space: i64,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// Per-user storage and bandwidth limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    #[serde(default, with = "int_string")]
    pub space_limit: i64,
    #[serde(default)]
    pub upload_speed_limit: i64,
    #[serde(default)]
    pub download_speed_limit: i64,
}

/// UI preferences stored server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub bg: Option<BgConfig>,
    #[serde(default, rename = "cssURL")]
    pub css_url: String,
    #[serde(default, rename = "lanPackURL")]
    pub lan_pack_url: String,
    #[serde(default)]
    pub lan: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub repeat: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub align: String,
    #[serde(default)]
    pub bg_color: String,
}

/// Integer fields the server sends as decimal strings.
mod int_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Str(s) if s.is_empty() => Ok(0),
            Raw::Str(s) => s.parse().map_err(de::Error::custom),
            Raw::Num(n) => Ok(n),
        }
    }
}
