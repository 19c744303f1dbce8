//! SHA-256 checksums for uploads

use std::io::Read;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of everything `reader` yields
pub fn compute_sha256<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hex-encoded SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct ErrorReader;

    impl Read for ErrorReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("forced reader error"))
        }
    }

    #[test]
    fn test_compute_sha256() {
        let data = b"Test data for hashing.";
        let expected = sha256_hex(data);

        assert_eq!(compute_sha256(&data[..]).unwrap(), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn test_compute_sha256_empty() {
        assert_eq!(
            compute_sha256(std::io::empty()).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_compute_sha256_reader_error() {
        assert!(compute_sha256(ErrorReader).is_err());
    }

    #[test]
    fn test_compute_sha256_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Hello, tester!").unwrap();

        let reopened = std::fs::File::open(file.path()).unwrap();
        assert_eq!(
            compute_sha256(reopened).unwrap(),
            sha256_hex(b"Hello, tester!")
        );
    }
}
