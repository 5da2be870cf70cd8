use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of an image's bytes. Two scans of the same file share a digest,
/// which is how repeated drops into the intake folder are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDigest([u8; 32]);

impl ImageDigest {
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }
}

/// Lowercase hex, 64 characters.
impl fmt::Display for ImageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    ImageDigest::of(data).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_known_vector() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn one_byte_changes_the_digest() {
        assert_eq!(ImageDigest::of(b"receipt"), ImageDigest::of(b"receipt"));
        assert_ne!(ImageDigest::of(b"receipt"), ImageDigest::of(b"receipt "));
    }

    #[test]
    fn display_is_lowercase_hex_of_the_bytes() {
        let digest = ImageDigest::of(b"photo bytes");
        let hex = digest.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(hex, sha256_hex(b"photo bytes"));
    }
}
