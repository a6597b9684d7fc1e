fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use qsfm_protocol::{
        CreateDirRequest, FileMetadata, ListDirResponse, LoginRequest, MsgResponse,
        UploadChunkRequest, User,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture, re-serializes it and compares the JSON values
    /// (key order does not matter).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  server: {fixture}\n  client: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_list_dir_response() {
        let resp: ListDirResponse = roundtrip_test("list_dir_response.json");
        assert_eq!(resp.cwd, "/qs/files/photos");
        assert_eq!(resp.metadatas.len(), 2);
        assert!(resp.metadatas[0].is_dir);
        assert_eq!(resp.metadatas[1].size, 2_483_021);
    }

    #[test]
    fn fixture_file_metadata() {
        let meta: FileMetadata = roundtrip_test("file_metadata.json");
        assert_eq!(meta.name, "report.pdf");
        assert_eq!(meta.mod_time.to_rfc3339(), "2023-12-24T18:45:00+00:00");
    }

    #[test]
    fn fixture_user() {
        let user: User = roundtrip_test("user.json");
        assert_eq!(user.used_space, 734_003);
        assert_eq!(user.quota.unwrap().space_limit, 1_073_741_824);
        assert_eq!(user.preferences.unwrap().lan, "en_US");
    }

    #[test]
    fn fixture_upload_chunk_request() {
        let req: UploadChunkRequest = roundtrip_test("upload_chunk_request.json");
        assert_eq!(req.content, b"buy milk\nfix bike\n");
        assert_eq!(req.offset, 1_048_576);
    }

    #[test]
    fn fixture_create_dir_request() {
        let req: CreateDirRequest = roundtrip_test("create_dir_request.json");
        assert_eq!(req.path, "/qs/files/new folder");
    }

    #[test]
    fn fixture_login_request() {
        let req: LoginRequest = roundtrip_test("login_request.json");
        assert_eq!(req.user, "admin");
    }

    #[test]
    fn fixture_msg_response() {
        let resp: MsgResponse = roundtrip_test("msg_response.json");
        assert!(resp.is_ok());
    }

    /// Every fixture in the directory must be covered by a test above.
    #[test]
    fn all_fixtures_are_known() {
        let known = [
            "create_dir_request.json",
            "file_metadata.json",
            "list_dir_response.json",
            "login_request.json",
            "msg_response.json",
            "upload_chunk_request.json",
            "user.json",
        ];
        let mut found: Vec<String> = fs::read_dir(fixtures_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect();
        found.sort();
        assert_eq!(found, known);
    }
}
