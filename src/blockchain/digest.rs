use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `bytes` as a lowercase hex string
///
/// The output is always 64 characters. Both proof-of-work and block hashing
/// go through this function so the whole chain agrees on one digest.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
