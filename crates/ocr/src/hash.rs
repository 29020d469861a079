use sha2::{Digest, Sha256};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Compute SHA-256 of a file via streaming reads (constant memory).
pub fn sha256_file(path: &Path) -> io::Result<[u8; 32]> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Encode a raw 32-byte hash as a lowercase hex string (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// File name a stored photo is known by: `<hash>.<ext>`, extension lowercased.
pub fn photo_file_name(hash_hex: &str, source: &Path) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg")
        .to_lowercase();
    format!("{hash_hex}.{ext}")
}

/// Layout: `<base>/<first_2_hex_chars>/<file_name>`
pub fn store_path(store_dir: &Path, file_name: &str) -> PathBuf {
    store_dir.join(&file_name[..2.min(file_name.len())]).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_file_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(
            to_hex(&sha256_file(&path).unwrap()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_file_missing_is_error() {
        assert!(sha256_file(Path::new("/no/such/photo.jpg")).is_err());
    }

    #[test]
    fn file_name_keeps_lowercased_extension() {
        assert_eq!(photo_file_name("abcd", Path::new("/tmp/IMG_001.JPG")), "abcd.jpg");
        assert_eq!(photo_file_name("abcd", Path::new("/tmp/capture")), "abcd.jpg");
    }

    #[test]
    fn store_path_layout() {
        let base = PathBuf::from("/data/photos");
        let path = store_path(&base, "abcdef12.png");
        assert_eq!(path, PathBuf::from("/data/photos/ab/abcdef12.png"));
    }
}
