//! Streaming content hashing for downloaded media.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Chunk size for streaming reads; bounds memory for arbitrarily large videos.
const HASH_CHUNK_BYTES: usize = 8192;

/// Compute the hex-encoded SHA-256 digest of a file.
///
/// Streams the file in fixed-size chunks. The same bytes always yield the
/// same digest; unreadable files surface an IO error.
pub async fn hash_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_BYTES];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_hash_is_deterministic() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"lecture bytes").unwrap();

        let first = hash_file(file.path()).await.unwrap();
        let second = hash_file(file.path()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn test_different_bytes_different_digest() {
        let mut a = tempfile::NamedTempFile::new().unwrap();
        a.write_all(b"one").unwrap();
        let mut b = tempfile::NamedTempFile::new().unwrap();
        b.write_all(b"two").unwrap();

        let ha = hash_file(a.path()).await.unwrap();
        let hb = hash_file(b.path()).await.unwrap();
        assert_ne!(ha, hb);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = hash_file(Path::new("/nonexistent/video.mp4")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_large_file_spans_chunks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data = vec![0xabu8; HASH_CHUNK_BYTES * 3 + 17];
        file.write_all(&data).unwrap();

        let streamed = hash_file(file.path()).await.unwrap();
        let whole = hex::encode(Sha256::digest(&data));
        assert_eq!(streamed, whole);
    }
}
