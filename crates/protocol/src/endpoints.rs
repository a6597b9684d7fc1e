/// Query parameter carrying the directory path for listings.
pub const LIST_DIR_QUERY: &str = "dp";

/// Query parameter carrying a file path.
pub const FILE_QUERY: &str = "fp";

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

/// Remote operations consumed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListDir,
    FileMetadata,
    CreateDir,
    UploadChunk,
    /// Lives under `/v1` while everything else is `/v2`. Kept as the
    /// backend exposes it.
    Download,
    CurrentUser,
    Login,
    Logout,
}

impl Endpoint {
    /// Request method for this endpoint.
    pub fn method(self) -> HttpMethod {
        match self {
            Self::ListDir | Self::FileMetadata | Self::Download | Self::CurrentUser => {
                HttpMethod::Get
            }
            Self::CreateDir | Self::Login | Self::Logout => HttpMethod::Post,
            Self::UploadChunk => HttpMethod::Patch,
        }
    }

    /// Path relative to the server base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::ListDir | Self::CreateDir => "/v2/my/fs/dirs",
            Self::FileMetadata => "/v2/my/fs/file/metadata",
            Self::UploadChunk => "/v2/my/fs/files/chunks",
            Self::Download => "/v1/fs/files",
            Self::CurrentUser => "/v2/my/self",
            Self::Login => "/v2/public/login",
            Self::Logout => "/v2/my/logout",
        }
    }
}
