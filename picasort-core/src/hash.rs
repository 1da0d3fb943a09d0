//! Streaming content hashing.
//!
//! The SHA-256 digest of an image's bytes is its stable identity: two files
//! with the same digest are exact duplicates regardless of path or mtime.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;

const CHUNK_SIZE: usize = 8192;

/// Lowercase hex SHA-256 of the file at `path`, read in chunks so large
/// originals never land in memory whole.
pub fn file_digest<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::CoreError;

    #[test]
    fn digests_known_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        let digest = file_digest(file.path()).unwrap();
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn digests_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let digest = file_digest(file.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = file_digest(dir.path().join("nope.jpg"));
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
