//! Content hashing for upload provenance.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the uploaded bytes.
pub fn content_sha256(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
