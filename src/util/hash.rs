use sha2::{Digest, Sha256};

/// Primary key for an article: hex SHA-256 of its canonical URL.
pub fn identity_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
