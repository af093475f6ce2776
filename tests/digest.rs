#[cfg(test)]
mod tests {
    use filehash::{DigestEngine, Entry, HashIndex, RegistryError, EMPTY_DIGEST};
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to build an index over a temporary storage directory
    fn create_test_index() -> (HashIndex, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = HashIndex::new(temp_dir.path());
        (index, temp_dir)
    }

    #[tokio::test]
    async fn test_hash_known_contents() {
        let (index, temp_dir) = create_test_index();
        fs::write(temp_dir.path().join("hello.txt"), b"Hello, world!").unwrap();

        let entry = index.hash(Entry::new("hello.txt")).await;

        assert_eq!(entry.file_hash, "MV9b23bQeMQ7isAGTkoBZGErH853yGk0W_yUx1iU7dM=");
        assert_eq!(entry.file_bytes, 13);
    }

    #[tokio::test]
    async fn test_hash_larger_than_buffer() {
        let (index, temp_dir) = create_test_index();
        let data: Vec<u8> = (0..=255u8).cycle().take(256 * 1024).collect();
        fs::write(temp_dir.path().join("big.bin"), &data).unwrap();

        let entry = index.hash(Entry::new("big.bin")).await;

        assert_eq!(entry.file_hash, "IxI5S9mVRdneExwk77eB52WsGuwkPy7ZNHWXp5OkFek=");
        assert_eq!(entry.file_bytes, data.len() as u64);
    }

    #[tokio::test]
    async fn test_hash_is_deterministic() {
        let (index, temp_dir) = create_test_index();
        fs::write(temp_dir.path().join("same.txt"), b"unchanged contents").unwrap();

        let first = index.hash(Entry::new("same.txt")).await;
        let second = index.hash(Entry::new("same.txt")).await;

        assert_eq!(first.file_hash, second.file_hash);
        assert_eq!(first.file_bytes, second.file_bytes);
    }

    #[tokio::test]
    async fn test_hash_carries_other_fields() {
        let (index, temp_dir) = create_test_index();
        fs::write(temp_dir.path().join("v.txt"), b"v").unwrap();

        let input = Entry::new("v.txt").with_version(7);
        let output = index.hash(input.clone()).await;

        assert_eq!(output.file_name, input.file_name);
        assert_eq!(output.file_version, 7);
        assert_eq!(output.file_uuid, input.file_uuid);
        assert_eq!(output.create_time, input.create_time);
        assert_eq!(output.entry_age, input.entry_age);
        assert_eq!(output.file_status, input.file_status);
    }

    #[tokio::test]
    async fn test_hash_does_not_touch_index() {
        let (index, temp_dir) = create_test_index();
        fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();

        index.hash(Entry::new("a.txt")).await;
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_hash_missing_file_degrades() {
        let (index, _temp_dir) = create_test_index();

        let entry = index.hash(Entry::new("missing.txt")).await;

        assert_eq!(entry.file_hash, EMPTY_DIGEST);
        assert_eq!(entry.file_bytes, 0);

        let lines = index.journal().lines().await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("hash():open"));
        assert!(lines[0].contains("file_name=missing.txt"));
    }

    #[tokio::test]
    async fn test_hash_rejects_escaping_names() {
        let (_, temp_dir) = create_test_index();
        let inner = temp_dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(temp_dir.path().join("secret.txt"), b"secret").unwrap();

        let index = HashIndex::new(&inner);
        let entry = index.hash(Entry::new("../secret.txt")).await;

        assert_eq!(entry.file_hash, EMPTY_DIGEST);
        assert_eq!(entry.file_bytes, 0);
    }

    #[tokio::test]
    async fn test_hash_directory_reports_read_failure() {
        let (index, temp_dir) = create_test_index();
        fs::create_dir(temp_dir.path().join("dir")).unwrap();

        let entry = index.hash(Entry::new("dir")).await;

        assert_eq!(entry.file_bytes, 0);
        assert_eq!(index.journal().len().await, 1);
    }

    #[tokio::test]
    async fn test_try_digest_reports_errors() {
        let (index, temp_dir) = create_test_index();
        fs::write(temp_dir.path().join("ok.txt"), b"hello world\n").unwrap();

        let (hash, bytes) = index.digest_engine().try_digest("ok.txt").await.unwrap();
        assert_eq!(hash, "qUiQTy8PR5uPgZdpSzAYSw0u0cHNKh7A-4XSmaGSpEc=");
        assert_eq!(bytes, 12);

        let err = index.digest_engine().try_digest("nope.txt").await.unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }

    #[tokio::test]
    async fn test_hash_then_add_round_trip() {
        let (index, temp_dir) = create_test_index();
        for x in 0..10 {
            fs::write(temp_dir.path().join(format!("testfile{}.txt", x)), format!("contents {}", x)).unwrap();
        }

        for x in 0..10 {
            let entry = index.hash(Entry::new(format!("testfile{}.txt", x))).await;
            index.add(entry).await;
        }

        for x in 0..10 {
            let expected = DigestEngine::digest_bytes(format!("contents {}", x).as_bytes());
            let entry = index.get(&expected).await.expect("hashed entry should be indexed");
            assert_eq!(entry.file_name, format!("testfile{}.txt", x));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn streamed_digest_matches_in_memory(data in proptest::collection::vec(any::<u8>(), 0..200_000)) {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("blob"), &data).unwrap();
            let index = HashIndex::new(temp_dir.path());

            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let entry = runtime.block_on(index.hash(Entry::new("blob")));

            prop_assert_eq!(entry.file_hash, DigestEngine::digest_bytes(&data));
            prop_assert_eq!(entry.file_bytes, data.len() as u64);
        }
    }
}
